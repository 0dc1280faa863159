use std::collections::HashMap;
use std::sync::{Arc, Weak};

use log::{debug, error, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::cache::MediaCache;
use super::{LoadedMedia, MediaProvider, MediaRequest, MediaSlot, SharedSlot, lock_slot};
use crate::error::MediaError;
use crate::model::node::NodeId;
use crate::model::value::Value;

type SlotKey = (NodeId, usize);

/// Identifies one started request; see [`MediaCoordinator::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle {
    pub node_id: NodeId,
    pub loop_index: usize,
    pub request_id: Uuid,
}

struct InFlight {
    request_id: Uuid,
    input: Value,
    task: JoinHandle<()>,
    slot: Weak<std::sync::Mutex<MediaSlot>>,
}

struct Completion {
    node_id: NodeId,
    loop_index: usize,
    request_id: Uuid,
    result: Result<LoadedMedia, MediaError>,
}

/// Tracks asynchronous media work, at most one request per
/// `(node, loop index)`.
///
/// Results travel back over a channel and are committed by
/// [`MediaCoordinator::commit_completed`], which the graph calls at the start
/// of every tick. A result commits only if its request is still the current
/// one for that slot and the slot is still alive.
pub struct MediaCoordinator {
    runtime: Option<Handle>,
    provider: Option<Arc<dyn MediaProvider>>,
    in_flight: HashMap<SlotKey, InFlight>,
    sender: UnboundedSender<Completion>,
    receiver: UnboundedReceiver<Completion>,
    cache: MediaCache,
}

impl MediaCoordinator {
    pub fn new(provider: Arc<dyn MediaProvider>, runtime: Handle, cache_capacity: usize) -> Self {
        Self::build(Some(provider), Some(runtime), cache_capacity)
    }

    /// Uses the runtime of the calling context, if there is one.
    pub fn from_current(provider: Arc<dyn MediaProvider>, cache_capacity: usize) -> Self {
        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            warn!("No tokio runtime available, media loading is disabled");
        }
        Self::build(Some(provider), runtime, cache_capacity)
    }

    /// A coordinator that never loads anything.
    pub fn disabled() -> Self {
        Self::build(None, None, 1)
    }

    fn build(
        provider: Option<Arc<dyn MediaProvider>>,
        runtime: Option<Handle>,
        cache_capacity: usize,
    ) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            runtime,
            provider,
            in_flight: HashMap::new(),
            sender,
            receiver,
            cache: MediaCache::new(cache_capacity),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.runtime.is_some() && self.provider.is_some()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_in_flight(&self, node_id: NodeId, loop_index: usize) -> bool {
        self.in_flight.contains_key(&(node_id, loop_index))
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Resolves the output of one media index for this tick.
    ///
    /// Returns what the slot currently shows. When the input differs from the
    /// one the slot was produced from, work is started (or coalesced with an
    /// identical in-flight request) and the stale output is returned.
    pub fn request(
        &mut self,
        node_id: NodeId,
        loop_index: usize,
        input: &Value,
        slot: &SharedSlot,
    ) -> Value {
        let Some(media) = input.as_media().copied() else {
            self.cancel_index(node_id, loop_index);
            let mut guard = lock_slot(slot);
            guard.input = Some(input.clone());
            guard.output = None;
            guard.loaded = None;
            return Value::Media(None);
        };

        let settled = {
            let guard = lock_slot(slot);
            if guard.input.as_ref() == Some(input) && guard.output.is_some() {
                guard.output.clone()
            } else if guard.failed_input.as_ref() == Some(input) {
                Some(guard.output.clone().unwrap_or(Value::Media(None)))
            } else {
                None
            }
        };
        if let Some(output) = settled {
            self.cancel_superseded(node_id, loop_index, input);
            return output;
        }

        if let Some(loaded) = self.cache.get(&media.source) {
            debug!("Media {} served from cache", media.source);
            self.cancel_index(node_id, loop_index);
            let mut guard = lock_slot(slot);
            commit_loaded(&mut guard, input.clone(), loaded);
            return guard.output.clone().unwrap_or(Value::Media(None));
        }

        let stale = current_output(slot);
        if self.begin_async(node_id, loop_index, input, slot).is_none() {
            warn!("Media request for node {} index {} dropped", node_id, loop_index);
        }
        stale
    }

    /// Starts loading `input` for `(node_id, loop_index)`.
    ///
    /// An identical in-flight request is reused; a different one is aborted
    /// and replaced. Returns `None` when the coordinator is disabled or the
    /// input is not media.
    pub fn begin_async(
        &mut self,
        node_id: NodeId,
        loop_index: usize,
        input: &Value,
        slot: &SharedSlot,
    ) -> Option<RequestHandle> {
        let media = input.as_media().copied()?;
        let key = (node_id, loop_index);

        if let Some(existing) = self.in_flight.get(&key) {
            if &existing.input == input {
                return Some(RequestHandle {
                    node_id,
                    loop_index,
                    request_id: existing.request_id,
                });
            }
        }

        let (Some(runtime), Some(provider)) = (&self.runtime, &self.provider) else {
            return None;
        };

        if let Some(previous) = self.in_flight.remove(&key) {
            debug!(
                "Superseding media request {} for node {} index {}",
                previous.request_id, node_id, loop_index
            );
            previous.task.abort();
        }

        let request = MediaRequest {
            request_id: Uuid::new_v4(),
            node_id,
            loop_index,
            media,
        };
        let request_id = request.request_id;
        let provider = Arc::clone(provider);
        let sender = self.sender.clone();
        let task = runtime.spawn(async move {
            let result = provider.load(request).await;
            // The receiver only goes away with the coordinator.
            let _ = sender.send(Completion {
                node_id,
                loop_index,
                request_id,
                result,
            });
        });

        self.in_flight.insert(
            key,
            InFlight {
                request_id,
                input: input.clone(),
                task,
                slot: Arc::downgrade(slot),
            },
        );
        Some(RequestHandle {
            node_id,
            loop_index,
            request_id,
        })
    }

    /// Cancels `handle` if it is still the current request for its slot.
    pub fn cancel(&mut self, handle: RequestHandle) -> bool {
        let key = (handle.node_id, handle.loop_index);
        match self.in_flight.get(&key) {
            Some(in_flight) if in_flight.request_id == handle.request_id => {
                self.cancel_index(handle.node_id, handle.loop_index);
                true
            }
            _ => false,
        }
    }

    /// Drops in-flight work for an input the slot has moved away from.
    fn cancel_superseded(&mut self, node_id: NodeId, loop_index: usize, input: &Value) {
        let stale = self
            .in_flight
            .get(&(node_id, loop_index))
            .is_some_and(|in_flight| &in_flight.input != input);
        if stale {
            debug!(
                "Input of node {} index {} reverted, cancelling pending load",
                node_id, loop_index
            );
            self.cancel_index(node_id, loop_index);
        }
    }

    fn cancel_index(&mut self, node_id: NodeId, loop_index: usize) {
        if let Some(in_flight) = self.in_flight.remove(&(node_id, loop_index)) {
            in_flight.task.abort();
        }
    }

    /// Cancels every index of `node_id`, at or past `from_index`.
    pub fn cancel_from(&mut self, node_id: NodeId, from_index: usize) {
        let keys: Vec<SlotKey> = self
            .in_flight
            .keys()
            .filter(|(id, index)| *id == node_id && *index >= from_index)
            .copied()
            .collect();
        for (id, index) in keys {
            self.cancel_index(id, index);
        }
    }

    /// Cancels all work addressed to `node_id`.
    pub fn cancel_node(&mut self, node_id: NodeId) {
        self.cancel_from(node_id, 0);
    }

    /// Cancels everything and releases cached media.
    pub fn shutdown(&mut self) {
        for (_, in_flight) in self.in_flight.drain() {
            in_flight.task.abort();
        }
        while self.receiver.try_recv().is_ok() {}
        self.cache.clear();
    }

    /// Commits every completion received so far without blocking. Returns
    /// the number of results committed.
    pub fn commit_completed(&mut self) -> usize {
        let mut committed = 0;
        while let Ok(completion) = self.receiver.try_recv() {
            if self.commit(completion) {
                committed += 1;
            }
        }
        committed
    }

    /// Waits for the next completion and commits it. Returns `false`
    /// immediately when nothing is in flight.
    pub async fn commit_next(&mut self) -> bool {
        if self.in_flight.is_empty() {
            return false;
        }
        match self.receiver.recv().await {
            Some(completion) => self.commit(completion),
            None => false,
        }
    }

    fn commit(&mut self, completion: Completion) -> bool {
        let key = (completion.node_id, completion.loop_index);
        let is_current = self
            .in_flight
            .get(&key)
            .is_some_and(|in_flight| in_flight.request_id == completion.request_id);
        if !is_current {
            debug!(
                "Discarding stale media result {} for node {}",
                completion.request_id, completion.node_id
            );
            return false;
        }
        let Some(in_flight) = self.in_flight.remove(&key) else {
            return false;
        };
        let Some(slot) = in_flight.slot.upgrade() else {
            debug!(
                "Media slot for node {} index {} is gone",
                completion.node_id, completion.loop_index
            );
            return false;
        };

        let mut guard = lock_slot(&slot);
        match completion.result {
            Ok(loaded) => {
                self.cache.put(loaded.media.source, loaded.clone());
                commit_loaded(&mut guard, in_flight.input, loaded);
                true
            }
            Err(err) => {
                error!(
                    "Media load for node {} index {} failed: {}",
                    completion.node_id, completion.loop_index, err
                );
                guard.failed_input = Some(in_flight.input);
                guard.last_error = Some(err);
                false
            }
        }
    }
}

impl Drop for MediaCoordinator {
    fn drop(&mut self) {
        for (_, in_flight) in self.in_flight.drain() {
            in_flight.task.abort();
        }
    }
}

fn commit_loaded(slot: &mut MediaSlot, input: Value, loaded: LoadedMedia) {
    slot.input = Some(input);
    slot.output = Some(Value::Media(Some(loaded.media)));
    slot.loaded = Some(loaded);
    slot.failed_input = None;
    slot.last_error = None;
}

fn current_output(slot: &SharedSlot) -> Value {
    lock_slot(slot).output.clone().unwrap_or(Value::Media(None))
}
