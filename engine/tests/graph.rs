use patchflow::model::{
    InputCoordinate, LayerInputPort, LayerKind, OutputCoordinate, PortAddress,
};
use patchflow::{
    EngineConfig, EngineError, Loop, MediaCoordinator, NodeId, Patch, PatchGraph, Value,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn numbers(values: &[f64]) -> Loop {
    values.iter().map(|v| Value::number(*v)).collect()
}

fn wire(
    graph: &mut PatchGraph,
    from: NodeId,
    from_port: usize,
    to: NodeId,
    to_port: impl Into<PortAddress>,
) -> Result<uuid::Uuid, EngineError> {
    graph.connect(
        OutputCoordinate {
            node_id: from,
            port: from_port,
        },
        InputCoordinate {
            node_id: to,
            port: to_port.into(),
        },
    )
}

#[test]
fn test_chain_settles_in_a_single_tick() {
    init_logger();
    let mut graph = PatchGraph::default();
    let sum = graph.add_patch(Patch::LoopSum);
    let total = graph.add_patch(Patch::RunningTotal);
    let reverse = graph.add_patch(Patch::LoopReverse);
    let indices = graph.add_patch(Patch::Loop);
    graph.set_input(indices, 0usize, numbers(&[4.0])).unwrap();

    wire(&mut graph, indices, 0, reverse, 0usize).unwrap();
    wire(&mut graph, reverse, 0, total, 0usize).unwrap();
    wire(&mut graph, total, 0, sum, 0usize).unwrap();

    let order = graph.evaluation_order().unwrap();
    let position = |id| order.iter().position(|n| *n == id).unwrap();
    assert!(position(indices) < position(reverse));
    assert!(position(total) < position(sum));

    graph.tick().unwrap();
    assert_eq!(graph.output(total, 0), Some(&numbers(&[0.0, 3.0, 5.0, 6.0])));
    assert_eq!(graph.output(sum, 0), Some(&numbers(&[14.0])));
}

#[test]
fn test_longer_cycle_is_rejected() {
    init_logger();
    let mut graph = PatchGraph::default();
    let a = graph.add_patch(Patch::Add);
    let b = graph.add_patch(Patch::Add);
    let c = graph.add_patch(Patch::Add);
    wire(&mut graph, a, 0, b, 0usize).unwrap();
    wire(&mut graph, b, 0, c, 0usize).unwrap();
    assert!(matches!(wire(&mut graph, c, 0, a, 1usize), Err(EngineError::Cycle(_))));
    assert!(graph.tick().is_ok());
}

#[test]
fn test_reconnecting_an_input_replaces_the_old_edge() {
    init_logger();
    let mut graph = PatchGraph::default();
    let first = graph.add_patch(Patch::Loop);
    let second = graph.add_patch(Patch::Loop);
    let count = graph.add_patch(Patch::LoopCount);
    graph.set_input(second, 0usize, numbers(&[7.0])).unwrap();

    wire(&mut graph, first, 0, count, 0usize).unwrap();
    wire(&mut graph, second, 0, count, 0usize).unwrap();
    assert_eq!(graph.connections().count(), 1);

    graph.tick().unwrap();
    assert_eq!(graph.output(count, 0), Some(&numbers(&[7.0])));
}

#[test]
fn test_add_broadcasts_shorter_loop() {
    init_logger();
    let mut graph = PatchGraph::default();
    let add = graph.add_patch(Patch::Add);
    graph.set_input(add, 0usize, numbers(&[1.0, 2.0, 3.0])).unwrap();
    graph.set_input(add, 1usize, numbers(&[10.0])).unwrap();
    graph.tick().unwrap();
    assert_eq!(graph.output(add, 0), Some(&numbers(&[11.0, 12.0, 13.0])));
}

#[test]
fn test_group_passes_values_through() {
    init_logger();
    let mut graph = PatchGraph::default();
    let group = graph.add_group(1);
    let count = graph.add_patch(Patch::LoopCount);
    graph
        .set_input(group, 0usize, vec![Value::string("a"), Value::string("b")])
        .unwrap();
    wire(&mut graph, group, 0, count, 0usize).unwrap();
    graph.tick().unwrap();

    assert_eq!(
        graph.output(group, 0),
        Some(&vec![Value::string("a"), Value::string("b")])
    );
    assert_eq!(graph.output(count, 0), Some(&numbers(&[2.0])));
}

#[test]
fn test_layer_instance_count_follows_longest_port() {
    init_logger();
    let mut graph = PatchGraph::default();
    let indices = graph.add_patch(Patch::Loop);
    graph.set_input(indices, 0usize, numbers(&[5.0])).unwrap();
    let text = graph.add_layer(LayerKind::Text);
    graph
        .set_input(text, LayerInputPort::Text, vec![Value::string("hi")])
        .unwrap();
    wire(&mut graph, indices, 0, text, LayerInputPort::FontSize).unwrap();
    graph.tick().unwrap();

    let layer = graph.node(text).and_then(|n| n.layer.as_ref()).unwrap();
    assert_eq!(layer.instance_count(), 5);
    assert!(matches!(
        graph.set_input(text, LayerInputPort::Image, numbers(&[1.0])),
        Err(EngineError::UnknownPort { .. })
    ));
}

#[test]
fn test_restart_clears_ephemeral_state() {
    init_logger();
    let mut graph = PatchGraph::default();
    let remove = graph.add_patch(Patch::LoopRemove);
    graph.set_input(remove, 0usize, numbers(&[1.0, 2.0, 3.0])).unwrap();
    graph.tick().unwrap();
    graph.pulse(remove, 2usize).unwrap();
    graph.tick().unwrap();
    assert_eq!(graph.output(remove, 0), Some(&numbers(&[1.0, 2.0])));

    graph.restart();
    graph.tick().unwrap();
    assert_eq!(graph.output(remove, 0), Some(&numbers(&[1.0, 2.0, 3.0])));
}

#[test]
fn test_configured_frame_rate_drives_graph_time() {
    init_logger();
    let config = EngineConfig::from_toml_str("frame_rate = 30").unwrap();
    let mut graph = PatchGraph::new(&config, MediaCoordinator::disabled());
    assert_eq!(graph.current_graph_time(), 0.0);
    let time = graph.tick().unwrap();
    assert_eq!(time, 1.0 / 30.0);
    assert_eq!(graph.clock().frame(), 1);
}
