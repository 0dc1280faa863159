use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use patchflow::media::{MediaSlot, SharedSlot};
use patchflow::model::{MediaContentType, MediaRef};
use patchflow::{
    EngineConfig, LoadedMedia, MediaCoordinator, MediaError, MediaProvider, MediaRequest, NodeId,
    Patch, PatchGraph, Value,
};
use uuid::Uuid;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Loads anything after `delay`, except sources listed in `failing`.
#[derive(Default)]
struct MockProvider {
    delay: Duration,
    failing: HashSet<Uuid>,
    calls: Mutex<Vec<Uuid>>,
}

impl MockProvider {
    fn calls_for(&self, source: Uuid) -> usize {
        self.calls.lock().unwrap().iter().filter(|s| **s == source).count()
    }
}

#[async_trait]
impl MediaProvider for MockProvider {
    async fn load(&self, request: MediaRequest) -> Result<LoadedMedia, MediaError> {
        self.calls.lock().unwrap().push(request.media.source);
        tokio::time::sleep(self.delay).await;
        if self.failing.contains(&request.media.source) {
            return Err(MediaError::Load("corrupt file".to_string()));
        }
        Ok(LoadedMedia {
            media: request.media,
            data: Arc::from(vec![0u8, 1, 2]),
        })
    }
}

fn image() -> MediaRef {
    MediaRef::imported(Uuid::new_v4(), MediaContentType::Image)
}

fn media_graph(provider: Arc<MockProvider>) -> (PatchGraph, NodeId) {
    let config = EngineConfig::default();
    let media = MediaCoordinator::from_current(provider, config.media.cache_capacity);
    let mut graph = PatchGraph::new(&config, media);
    let node = graph.add_patch(Patch::MediaImport);
    (graph, node)
}

fn show(graph: &mut PatchGraph, node: NodeId, media: &[MediaRef]) {
    let values = media.iter().map(|m| Value::Media(Some(*m))).collect();
    graph.set_input(node, 0usize, values).unwrap();
}

#[tokio::test]
async fn test_load_commits_between_ticks() {
    init_logger();
    let provider = Arc::new(MockProvider::default());
    let (mut graph, node) = media_graph(Arc::clone(&provider));
    let a = image();
    show(&mut graph, node, &[a]);

    graph.tick().unwrap();
    assert_eq!(graph.output(node, 0), Some(&vec![Value::Media(None)]));
    assert!(graph.media().is_in_flight(node, 0));

    assert!(graph.media_mut().commit_next().await);
    graph.tick().unwrap();
    assert_eq!(graph.output(node, 0), Some(&vec![Value::Media(Some(a))]));
    assert_eq!(graph.media().in_flight_count(), 0);

    graph.tick().unwrap();
    assert_eq!(provider.calls_for(a.source), 1);
}

#[tokio::test]
async fn test_later_request_supersedes_earlier() {
    init_logger();
    let provider = Arc::new(MockProvider {
        delay: Duration::from_millis(5),
        ..Default::default()
    });
    let (mut graph, node) = media_graph(provider);
    let (a, b) = (image(), image());

    show(&mut graph, node, &[a]);
    graph.tick().unwrap();
    show(&mut graph, node, &[b]);
    graph.tick().unwrap();
    assert_eq!(graph.media().in_flight_count(), 1);

    assert!(graph.media_mut().commit_next().await);
    assert!(!graph.media_mut().commit_next().await);
    graph.tick().unwrap();
    assert_eq!(graph.output(node, 0), Some(&vec![Value::Media(Some(b))]));
}

#[tokio::test]
async fn test_reverting_input_discards_pending_load() {
    init_logger();
    let provider = Arc::new(MockProvider {
        delay: Duration::from_millis(5),
        ..Default::default()
    });
    let (mut graph, node) = media_graph(provider);
    let (a, b) = (image(), image());

    show(&mut graph, node, &[a]);
    graph.tick().unwrap();
    assert!(graph.media_mut().commit_next().await);
    graph.tick().unwrap();

    show(&mut graph, node, &[b]);
    graph.tick().unwrap();
    assert!(graph.media().is_in_flight(node, 0));

    show(&mut graph, node, &[a]);
    graph.tick().unwrap();
    assert!(!graph.media().is_in_flight(node, 0));
    assert!(!graph.media_mut().commit_next().await);

    tokio::time::sleep(Duration::from_millis(20)).await;
    graph.tick().unwrap();
    graph.tick().unwrap();
    assert_eq!(graph.output(node, 0), Some(&vec![Value::Media(Some(a))]));
}

#[tokio::test]
async fn test_cancel_by_handle() {
    init_logger();
    let provider = Arc::new(MockProvider {
        delay: Duration::from_millis(5),
        ..Default::default()
    });
    let mut media = MediaCoordinator::from_current(provider, 4);
    let node = Uuid::new_v4();
    let slot: SharedSlot = Arc::new(Mutex::new(MediaSlot::default()));
    let (a, b) = (Value::Media(Some(image())), Value::Media(Some(image())));

    let first = media.begin_async(node, 0, &a, &slot).unwrap();
    assert_eq!(media.begin_async(node, 0, &a, &slot), Some(first));
    let second = media.begin_async(node, 0, &b, &slot).unwrap();
    assert_ne!(first.request_id, second.request_id);
    assert_eq!(media.in_flight_count(), 1);

    // A superseded handle no longer addresses anything.
    assert!(!media.cancel(first));
    assert!(media.is_in_flight(node, 0));

    assert!(media.cancel(second));
    assert!(!media.cancel(second));
    assert_eq!(media.in_flight_count(), 0);

    assert!(!media.commit_next().await);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(media.commit_completed(), 0);
    assert!(slot.lock().unwrap().output.is_none());
    assert!(media.begin_async(node, 0, &Value::number(1.0), &slot).is_none());
}

#[tokio::test]
async fn test_failed_load_keeps_previous_output() {
    init_logger();
    let broken = image();
    let provider = Arc::new(MockProvider {
        failing: HashSet::from([broken.source]),
        ..Default::default()
    });
    let (mut graph, node) = media_graph(Arc::clone(&provider));
    let good = image();

    show(&mut graph, node, &[good]);
    graph.tick().unwrap();
    graph.media_mut().commit_next().await;
    graph.tick().unwrap();

    show(&mut graph, node, &[broken]);
    graph.tick().unwrap();
    assert!(!graph.media_mut().commit_next().await);
    for _ in 0..3 {
        graph.tick().unwrap();
        assert_eq!(graph.output(node, 0), Some(&vec![Value::Media(Some(good))]));
    }
    assert_eq!(provider.calls_for(broken.source), 1);
    assert_eq!(graph.media().in_flight_count(), 0);
}

#[tokio::test]
async fn test_cached_media_is_reused() {
    init_logger();
    let provider = Arc::new(MockProvider::default());
    let (mut graph, node) = media_graph(Arc::clone(&provider));
    let (a, b) = (image(), image());

    for media in [a, b] {
        show(&mut graph, node, &[media]);
        graph.tick().unwrap();
        graph.media_mut().commit_next().await;
    }
    assert_eq!(graph.media().cached_count(), 2);

    show(&mut graph, node, &[a]);
    graph.tick().unwrap();
    assert_eq!(graph.output(node, 0), Some(&vec![Value::Media(Some(a))]));
    assert!(!graph.media().is_in_flight(node, 0));
    assert_eq!(provider.calls_for(a.source), 1);
}

#[tokio::test]
async fn test_shrinking_loop_cancels_dropped_indices() {
    init_logger();
    let provider = Arc::new(MockProvider {
        delay: Duration::from_secs(60),
        ..Default::default()
    });
    let (mut graph, node) = media_graph(provider);
    let (a, b) = (image(), image());

    show(&mut graph, node, &[a, b]);
    graph.tick().unwrap();
    assert_eq!(graph.media().in_flight_count(), 2);

    show(&mut graph, node, &[a]);
    graph.tick().unwrap();
    assert!(graph.media().is_in_flight(node, 0));
    assert!(!graph.media().is_in_flight(node, 1));
}

#[tokio::test]
async fn test_removing_node_cancels_its_work() {
    init_logger();
    let provider = Arc::new(MockProvider {
        delay: Duration::from_secs(60),
        ..Default::default()
    });
    let (mut graph, node) = media_graph(provider);
    show(&mut graph, node, &[image()]);
    graph.tick().unwrap();
    assert_eq!(graph.media().in_flight_count(), 1);

    graph.remove_node(node).unwrap();
    assert_eq!(graph.media().in_flight_count(), 0);
    assert!(!graph.media_mut().commit_next().await);
}

#[test]
fn test_disabled_coordinator_never_loads() {
    init_logger();
    let mut graph = PatchGraph::default();
    let node = graph.add_patch(Patch::MediaImport);
    show(&mut graph, node, &[image()]);
    graph.tick().unwrap();
    assert_eq!(graph.output(node, 0), Some(&vec![Value::Media(None)]));
    assert_eq!(graph.media().in_flight_count(), 0);
}
