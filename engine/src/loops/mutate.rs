//! Loop operations that carry state between ticks.
//!
//! The state structs here live inside a node's ephemeral observer; the
//! functions take the already-reduced "did it pulse" flag so they stay
//! independent of graph time.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::insert_friendly_index;
use super::ops::non_empty;
use crate::clock::should_pulse;
use crate::model::value::{GraphTime, Loop, Value, ValueKind};

/// Source tracking shared by loopInsert and loopRemove.
///
/// Whenever the source loop differs from the one seen on the previous tick,
/// the output is reset to the new source and the pulse is ignored.
#[derive(Debug, Default, Clone)]
pub struct LoopModification {
    previous_source: Option<Loop>,
}

impl LoopModification {
    pub fn new() -> Self {
        Self::default()
    }

    fn source_changed(&mut self, source: &Loop) -> bool {
        let changed = self.previous_source.as_ref() != Some(source);
        if changed {
            self.previous_source = Some(source.clone());
        }
        changed
    }

    /// Inserts every value of `values` at the requested index of `current`.
    ///
    /// Values are inserted one after another at the same position, so a
    /// multi-value insert lands in reverse order. An index past the end
    /// appends.
    pub fn insert(
        &mut self,
        source: &Loop,
        current: &Loop,
        values: &Loop,
        index: &Loop,
        pulsed: bool,
    ) -> Loop {
        if self.source_changed(source) {
            return non_empty(source.clone(), || ValueKind::Number.default_value());
        }
        let mut modified = non_empty(current.clone(), || ValueKind::Number.default_value());
        if !pulsed {
            return modified;
        }

        let requested = index.first().map(Value::as_int).unwrap_or(0);
        let insert_at = insert_friendly_index(requested, modified.len());
        for value in values {
            if insert_at > modified.len() - 1 {
                modified.push(value.clone());
            } else {
                modified.insert(insert_at, value.clone());
            }
        }
        modified
    }

    /// Removes the element at the requested index of `current`.
    ///
    /// A negative index counts from the end once; one that is still negative
    /// is ignored, as is one past the end. Removing the last element leaves
    /// a single default value.
    pub fn remove(&mut self, source: &Loop, current: &Loop, index: &Loop, pulsed: bool) -> Loop {
        if self.source_changed(source) {
            return non_empty(source.clone(), || ValueKind::Number.default_value());
        }
        let mut modified = non_empty(current.clone(), || ValueKind::Number.default_value());
        if !pulsed {
            return modified;
        }

        let len = modified.len() as i64;
        let mut removal = index.first().map(Value::as_int).unwrap_or(0);
        if removal < 0 {
            removal += len;
        }
        if removal < 0 || removal >= len {
            log::debug!("loopRemove ignored index {} for a loop of {}", removal, len);
            return modified;
        }

        if modified.len() == 1 {
            return vec![modified[0].default_false()];
        }
        modified.remove(removal as usize);
        modified
    }
}

/// Keeps the last shuffle of an input so it survives ticks without a pulse.
#[derive(Debug)]
pub struct ShuffleState {
    rng: StdRng,
    shuffled_from: Option<Loop>,
    shuffled: Option<Loop>,
}

impl ShuffleState {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            shuffled_from: None,
            shuffled: None,
        }
    }

    /// Reshuffles on a pulse. Between pulses the last shuffle is held for as
    /// long as the input stays the same; a changed input passes through.
    pub fn shuffle(&mut self, input: &Loop, pulsed: bool) -> Loop {
        if pulsed {
            let mut shuffled = input.clone();
            shuffled.shuffle(&mut self.rng);
            self.shuffled_from = Some(input.clone());
            self.shuffled = Some(shuffled.clone());
            return non_empty(shuffled, || ValueKind::Number.default_value());
        }

        match (&self.shuffled_from, &self.shuffled) {
            (Some(from), Some(shuffled)) if from == input => shuffled.clone(),
            _ => {
                self.shuffled_from = None;
                self.shuffled = None;
                non_empty(input.clone(), || ValueKind::Number.default_value())
            }
        }
    }
}

impl Default for ShuffleState {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the most recently pulsed entry of a pulse loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OptionSwitch {
    selected: usize,
}

impl OptionSwitch {
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// When several entries pulse on the same tick, the highest index wins.
    pub fn update(&mut self, pulses: &Loop, time: GraphTime) -> usize {
        if let Some(index) = pulses
            .iter()
            .rposition(|p| p.as_pulse().is_some_and(|t| should_pulse(t, time)))
        {
            self.selected = index;
        }
        self.selected
    }
}

/// One index of sampleAndHold: reset wins over sample, otherwise hold.
pub fn sample_and_hold(
    value: &Value,
    sample: bool,
    reset: bool,
    previous: Option<&Value>,
) -> Value {
    if reset {
        value.default_false()
    } else if sample {
        value.clone()
    } else {
        previous.cloned().unwrap_or_else(|| value.default_false())
    }
}
