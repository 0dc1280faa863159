//! Asynchronous media evaluation.
//!
//! Nodes whose per-index work is asynchronous (decoding, transcoding) hand it
//! to the [`MediaCoordinator`]. The tick loop never waits: each index keeps
//! its previous output until a completion is committed into its
//! [`MediaSlot`], which happens between ticks.

pub mod cache;
pub mod coordinator;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::MediaError;
use crate::model::media::MediaRef;
use crate::model::node::NodeId;
use crate::model::value::Value;

pub use cache::MediaCache;
pub use coordinator::{MediaCoordinator, RequestHandle};

/// Work handed to a [`MediaProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRequest {
    pub request_id: Uuid,
    pub node_id: NodeId,
    pub loop_index: usize,
    pub media: MediaRef,
}

/// A loaded media object. `data` is opaque to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMedia {
    pub media: MediaRef,
    pub data: Arc<[u8]>,
}

/// The external collaborator doing the actual decode/load work.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    async fn load(&self, request: MediaRequest) -> Result<LoadedMedia, MediaError>;
}

/// Per-index result slot inside a node's ephemeral observer.
///
/// `input` is the input the current `output` was produced from.
/// `failed_input` is not retried until the input changes.
#[derive(Debug, Default)]
pub struct MediaSlot {
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub loaded: Option<LoadedMedia>,
    pub failed_input: Option<Value>,
    pub last_error: Option<MediaError>,
}

pub type SharedSlot = Arc<Mutex<MediaSlot>>;

pub(crate) fn lock_slot(slot: &Mutex<MediaSlot>) -> MutexGuard<'_, MediaSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Media state of one node: one slot per loop index.
#[derive(Debug, Default)]
pub struct MediaObserver {
    slots: Vec<SharedSlot>,
}

impl MediaObserver {
    pub fn slot(&mut self, loop_index: usize) -> SharedSlot {
        while self.slots.len() <= loop_index {
            self.slots.push(Arc::new(Mutex::new(MediaSlot::default())));
        }
        Arc::clone(&self.slots[loop_index])
    }

    /// Drops slots past `len`; completions addressed to them are discarded.
    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn output(&self, loop_index: usize) -> Option<Value> {
        self.slots
            .get(loop_index)
            .and_then(|slot| lock_slot(slot).output.clone())
    }
}
