//! Patch graph and its per-tick topological driver.

use std::collections::HashMap;

use log::{debug, warn};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use uuid::Uuid;

use crate::clock::GraphClock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::evaluation;
use crate::media::MediaCoordinator;
use crate::model::layer::LayerKind;
use crate::model::node::{Node, NodeId};
use crate::model::port::{Connection, InputCoordinate, OutputCoordinate, PortAddress};
use crate::model::value::{GraphTime, Loop, LoopList, Value};
use crate::nodes::Patch;
use crate::util::timing::ScopedTimer;

/// Nodes, connections, the graph clock and the media coordinator.
///
/// Each [`PatchGraph::tick`] commits finished media work, advances the
/// clock and evaluates every node once, upstream before downstream. A node
/// sees its upstream nodes' outputs from the same tick.
pub struct PatchGraph {
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
    connections: HashMap<InputCoordinate, Connection>,
    clock: GraphClock,
    media: MediaCoordinator,
}

impl PatchGraph {
    pub fn new(config: &EngineConfig, media: MediaCoordinator) -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            connections: HashMap::new(),
            clock: GraphClock::new(config.frame_rate),
            media,
        }
    }

    pub fn clock(&self) -> &GraphClock {
        &self.clock
    }

    pub fn current_graph_time(&self) -> GraphTime {
        self.clock.current_graph_time()
    }

    pub fn media(&self) -> &MediaCoordinator {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut MediaCoordinator {
        &mut self.media
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        if self.nodes.insert(id, node).is_none() {
            self.order.push(id);
        }
        id
    }

    pub fn add_patch(&mut self, patch: Patch) -> NodeId {
        self.add_node(Node::patch(patch))
    }

    pub fn add_layer(&mut self, kind: LayerKind) -> NodeId {
        self.add_node(Node::layer(kind))
    }

    pub fn add_group(&mut self, ports: usize) -> NodeId {
        self.add_node(Node::group(ports))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Deletes a node, cancelling its media work and dropping every
    /// connection touching it. Downstream inputs fall back to their literals.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, EngineError> {
        let node = self.nodes.remove(&id).ok_or(EngineError::UnknownNode(id))?;
        self.order.retain(|n| *n != id);
        self.media.cancel_node(id);

        let touching: Vec<InputCoordinate> = self
            .connections
            .values()
            .filter(|c| c.from.node_id == id || c.to.node_id == id)
            .map(|c| c.to)
            .collect();
        for to in touching {
            self.connections.remove(&to);
            if let Some(port) = self
                .nodes
                .get_mut(&to.node_id)
                .and_then(|n| n.input_mut(to.port))
            {
                port.disconnect();
            }
        }
        debug!("Removed node {} ({})", node.title, id);
        Ok(node)
    }

    /// Connects an output to an input, replacing whatever was connected to
    /// that input before.
    pub fn connect(
        &mut self,
        from: OutputCoordinate,
        to: InputCoordinate,
    ) -> Result<Uuid, EngineError> {
        if from.node_id == to.node_id {
            return Err(EngineError::SelfConnection(from.node_id));
        }
        let source = self
            .nodes
            .get(&from.node_id)
            .ok_or(EngineError::UnknownNode(from.node_id))?;
        if from.port >= source.outputs.len() {
            return Err(EngineError::UnknownPort {
                node_id: from.node_id,
                port: PortAddress::Index(from.port),
            });
        }
        let target = self
            .nodes
            .get(&to.node_id)
            .ok_or(EngineError::UnknownNode(to.node_id))?;
        if target.input(to.port).is_none() {
            return Err(EngineError::UnknownPort {
                node_id: to.node_id,
                port: to.port,
            });
        }
        self.dependency_order(Some((from.node_id, to.node_id)))?;

        let connection = Connection::new(from, to);
        if let Some(replaced) = self.connections.insert(to, connection) {
            debug!("Connection {} replaced on {}", replaced.id, to.port);
        }
        if let Some(port) = self
            .nodes
            .get_mut(&to.node_id)
            .and_then(|n| n.input_mut(to.port))
        {
            port.connect(from);
        }
        Ok(connection.id)
    }

    /// Removes the connection into `to`, restoring the port's literal values.
    pub fn disconnect(&mut self, to: InputCoordinate) -> Result<Option<Connection>, EngineError> {
        let port = self
            .nodes
            .get_mut(&to.node_id)
            .ok_or(EngineError::UnknownNode(to.node_id))?
            .input_mut(to.port)
            .ok_or(EngineError::UnknownPort {
                node_id: to.node_id,
                port: to.port,
            })?;
        port.disconnect();
        Ok(self.connections.remove(&to))
    }

    /// Sets the literal values of an input port.
    pub fn set_input(
        &mut self,
        node_id: NodeId,
        port: impl Into<PortAddress>,
        values: Loop,
    ) -> Result<(), EngineError> {
        let port = port.into();
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(EngineError::UnknownNode(node_id))?;
        if node.set_input(port, values) {
            Ok(())
        } else {
            Err(EngineError::UnknownPort { node_id, port })
        }
    }

    /// Schedules a pulse on an input port for the next tick.
    pub fn pulse(&mut self, node_id: NodeId, port: impl Into<PortAddress>) -> Result<(), EngineError> {
        let time = self.clock.next_tick_time();
        self.set_input(node_id, port, vec![Value::pulse(time)])
    }

    pub fn outputs(&self, node_id: NodeId) -> Option<&LoopList> {
        self.nodes.get(&node_id).map(|n| &n.outputs)
    }

    pub fn output(&self, node_id: NodeId, port: usize) -> Option<&Loop> {
        self.nodes.get(&node_id).and_then(|n| n.output(port))
    }

    /// Node ids with every upstream node before its dependents.
    pub fn evaluation_order(&self) -> Result<Vec<NodeId>, EngineError> {
        self.dependency_order(None)
    }

    fn dependency_order(&self, extra: Option<(NodeId, NodeId)>) -> Result<Vec<NodeId>, EngineError> {
        let mut dependency_graph: DiGraph<NodeId, ()> = DiGraph::new();
        let mut indices = HashMap::new();
        for id in &self.order {
            indices.insert(*id, dependency_graph.add_node(*id));
        }

        let edges = self
            .connections
            .values()
            .map(|c| (c.from.node_id, c.to.node_id))
            .chain(extra);
        for (from, to) in edges {
            let (Some(&from_idx), Some(&to_idx)) = (indices.get(&from), indices.get(&to)) else {
                warn!("Connection {} -> {} references a missing node", from, to);
                continue;
            };
            dependency_graph.add_edge(from_idx, to_idx, ());
        }

        let sorted = toposort(&dependency_graph, None)
            .map_err(|cycle| EngineError::Cycle(dependency_graph[cycle.node_id()]))?;
        Ok(sorted.into_iter().map(|idx| dependency_graph[idx]).collect())
    }

    /// Runs one tick and returns its graph time.
    pub fn tick(&mut self) -> Result<GraphTime, EngineError> {
        let order = self.evaluation_order()?;
        let time = self.clock.advance();
        let _timer = ScopedTimer::debug_lazy(|| {
            format!("Tick {} ({} nodes)", self.clock.frame(), order.len())
        });

        let committed = self.media.commit_completed();
        if committed > 0 {
            debug!("Committed {} media results", committed);
        }

        for id in order {
            self.evaluate_node(id, time);
        }
        Ok(time)
    }

    fn evaluate_node(&mut self, id: NodeId, time: GraphTime) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };

        let upstream: Vec<(PortAddress, Loop)> = node
            .input_addresses()
            .into_iter()
            .filter_map(|address| {
                let from = node.input(address)?.upstream?;
                let values = self.nodes.get(&from.node_id)?.output(from.port)?.clone();
                Some((address, values))
            })
            .collect();

        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        for (address, values) in &upstream {
            if let Some(port) = node.input_mut(*address) {
                port.receive(values);
            }
        }

        let inputs = node.input_loops();
        let outputs = evaluation::evaluate(node, time, &inputs, &mut self.media);
        node.outputs = outputs;
    }

    /// Clears every node's ephemeral state and cancels media work, as when
    /// the prototype restarts. Port values and connections are kept.
    pub fn restart(&mut self) {
        for node in self.nodes.values_mut() {
            self.media.cancel_node(node.id);
            node.observer.reset();
        }
    }
}

impl Default for PatchGraph {
    fn default() -> Self {
        Self::new(&EngineConfig::default(), MediaCoordinator::disabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::layer::LayerInputPort;

    fn numbers(values: &[f64]) -> Loop {
        values.iter().map(|v| Value::number(*v)).collect()
    }

    fn out(node_id: NodeId, port: usize) -> OutputCoordinate {
        OutputCoordinate { node_id, port }
    }

    fn inp(node_id: NodeId, port: impl Into<PortAddress>) -> InputCoordinate {
        InputCoordinate {
            node_id,
            port: port.into(),
        }
    }

    #[test]
    fn test_connection_validation() {
        let mut graph = PatchGraph::default();
        let a = graph.add_patch(Patch::Loop);
        let b = graph.add_patch(Patch::LoopSum);

        assert!(matches!(
            graph.connect(out(a, 0), inp(a, 0usize)),
            Err(EngineError::SelfConnection(_))
        ));
        assert!(matches!(
            graph.connect(out(a, 3), inp(b, 0usize)),
            Err(EngineError::UnknownPort { .. })
        ));
        assert!(matches!(
            graph.connect(out(a, 0), inp(b, 4usize)),
            Err(EngineError::UnknownPort { .. })
        ));
        assert!(matches!(
            graph.connect(out(Uuid::new_v4(), 0), inp(b, 0usize)),
            Err(EngineError::UnknownNode(_))
        ));
        assert!(graph.connect(out(a, 0), inp(b, 0usize)).is_ok());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut graph = PatchGraph::default();
        let a = graph.add_patch(Patch::LoopReverse);
        let b = graph.add_patch(Patch::LoopReverse);
        graph.connect(out(a, 0), inp(b, 0usize)).unwrap();
        assert!(matches!(
            graph.connect(out(b, 0), inp(a, 0usize)),
            Err(EngineError::Cycle(_))
        ));
        assert_eq!(graph.connections().count(), 1);
    }

    #[test]
    fn test_tick_propagates_in_dependency_order() {
        let mut graph = PatchGraph::default();
        // Added downstream-first so insertion order alone would be wrong.
        let total = graph.add_patch(Patch::RunningTotal);
        let indices = graph.add_patch(Patch::Loop);
        graph.set_input(indices, 0usize, numbers(&[4.0])).unwrap();
        graph.connect(out(indices, 0), inp(total, 0usize)).unwrap();

        graph.tick().unwrap();
        assert_eq!(graph.output(total, 0), Some(&numbers(&[0.0, 0.0, 1.0, 3.0])));
    }

    #[test]
    fn test_disconnect_restores_literal() {
        let mut graph = PatchGraph::default();
        let source = graph.add_patch(Patch::Loop);
        let sum = graph.add_patch(Patch::LoopSum);
        graph.set_input(sum, 0usize, numbers(&[10.0])).unwrap();
        graph.connect(out(source, 0), inp(sum, 0usize)).unwrap();
        graph.tick().unwrap();
        assert_eq!(graph.output(sum, 0), Some(&numbers(&[3.0])));

        graph.disconnect(inp(sum, 0usize)).unwrap();
        graph.tick().unwrap();
        assert_eq!(graph.output(sum, 0), Some(&numbers(&[10.0])));
    }

    #[test]
    fn test_remove_node_disconnects_downstream() {
        let mut graph = PatchGraph::default();
        let source = graph.add_patch(Patch::Loop);
        let count = graph.add_patch(Patch::LoopCount);
        graph.connect(out(source, 0), inp(count, 0usize)).unwrap();
        graph.tick().unwrap();
        assert_eq!(graph.output(count, 0), Some(&numbers(&[3.0])));

        graph.remove_node(source).unwrap();
        assert_eq!(graph.connections().count(), 0);
        graph.tick().unwrap();
        assert_eq!(graph.output(count, 0), Some(&numbers(&[4.0])));
        assert!(matches!(
            graph.remove_node(source),
            Err(EngineError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_layer_inputs_resolve_from_upstream() {
        let mut graph = PatchGraph::default();
        let values = graph.add_patch(Patch::RunningTotal);
        graph.set_input(values, 0usize, numbers(&[0.5, 0.25])).unwrap();
        let layer = graph.add_layer(LayerKind::Rectangle);
        graph
            .connect(out(values, 0), inp(layer, LayerInputPort::Opacity))
            .unwrap();
        assert!(graph
            .connect(out(values, 0), inp(layer, LayerInputPort::Text))
            .is_err());

        graph.tick().unwrap();
        let node = graph.node(layer).unwrap();
        assert_eq!(
            node.input(LayerInputPort::Opacity.into()).map(|p| p.values.clone()),
            Some(numbers(&[0.0, 0.5]))
        );
        assert!(node.outputs.is_empty());
    }
}
