use crate::loops::mutate::{LoopModification, OptionSwitch, ShuffleState};
use crate::media::MediaObserver;
use crate::nodes::Patch;

/// Per-node state that survives between ticks but is never persisted.
///
/// The variant is fixed when the node is created.
#[derive(Debug, Default)]
pub enum EphemeralObserver {
    #[default]
    None,
    Looping(LoopModification),
    Shuffle(ShuffleState),
    OptionSwitch(OptionSwitch),
    Media(MediaObserver),
}

impl EphemeralObserver {
    pub fn for_patch(patch: Patch) -> Self {
        match patch {
            Patch::LoopInsert | Patch::LoopRemove => {
                EphemeralObserver::Looping(LoopModification::new())
            }
            Patch::LoopShuffle => EphemeralObserver::Shuffle(ShuffleState::new()),
            Patch::LoopOptionSwitch => EphemeralObserver::OptionSwitch(OptionSwitch::default()),
            Patch::MediaImport => EphemeralObserver::Media(MediaObserver::default()),
            _ => EphemeralObserver::None,
        }
    }

    /// Forgets accumulated state, e.g. when the prototype restarts.
    pub fn reset(&mut self) {
        match self {
            EphemeralObserver::None => {}
            EphemeralObserver::Looping(state) => *state = LoopModification::new(),
            EphemeralObserver::Shuffle(state) => *state = ShuffleState::new(),
            EphemeralObserver::OptionSwitch(state) => *state = OptionSwitch::default(),
            EphemeralObserver::Media(state) => state.truncate(0),
        }
    }
}
