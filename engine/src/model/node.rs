//! Node instances.

use uuid::Uuid;

use super::layer::{Layer, LayerKind};
use super::port::{InputPort, InputPortDefinition, PortAddress};
use super::value::{Loop, LoopList, ValueKind};
use crate::evaluation::EphemeralObserver;
use crate::nodes::Patch;

pub type NodeId = Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Patch(Patch),
    Layer(LayerKind),
    Group,
}

/// A node in the patch graph.
///
/// `outputs` holds the last committed output loops. `observer` is the
/// ephemeral per-node state; it is created with the node and dropped with
/// it, and never persisted.
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub title: String,
    pub inputs: Vec<InputPort>,
    pub layer: Option<Layer>,
    pub outputs: LoopList,
    pub output_kinds: Vec<ValueKind>,
    pub observer: EphemeralObserver,
}

impl Node {
    pub fn patch(patch: Patch) -> Self {
        let definition = patch.definition();
        let inputs: Vec<InputPort> = definition
            .inputs
            .iter()
            .map(InputPortDefinition::instantiate)
            .collect();
        let output_kinds: Vec<ValueKind> = definition.outputs.iter().map(|o| o.kind).collect();
        let outputs = output_kinds.iter().map(|k| vec![k.default_value()]).collect();
        Self {
            id: Uuid::new_v4(),
            kind: NodeKind::Patch(patch),
            title: definition.display_name.clone(),
            inputs,
            layer: None,
            outputs,
            output_kinds,
            observer: EphemeralObserver::for_patch(patch),
        }
    }

    pub fn layer(kind: LayerKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: NodeKind::Layer(kind),
            title: kind.display_name().to_string(),
            inputs: Vec::new(),
            layer: Some(Layer::new(kind)),
            outputs: Vec::new(),
            output_kinds: Vec::new(),
            observer: EphemeralObserver::None,
        }
    }

    /// A group node with `ports` pass-through ports.
    pub fn group(ports: usize) -> Self {
        let inputs = (0..ports)
            .map(|i| {
                InputPort::new(
                    format!("Input {}", i),
                    ValueKind::Number,
                    vec![ValueKind::Number.default_value()],
                )
                .polymorphic()
            })
            .collect();
        Self {
            id: Uuid::new_v4(),
            kind: NodeKind::Group,
            title: "Group".to_string(),
            inputs,
            layer: None,
            outputs: vec![vec![ValueKind::Number.default_value()]; ports],
            output_kinds: vec![ValueKind::Number; ports],
            observer: EphemeralObserver::None,
        }
    }

    pub fn input(&self, port: PortAddress) -> Option<&InputPort> {
        match (port, &self.layer) {
            (PortAddress::Index(i), None) => self.inputs.get(i),
            (PortAddress::Layer(p), Some(layer)) if layer.kind.has_port(p) => {
                Some(layer.inputs.get(p))
            }
            _ => None,
        }
    }

    pub fn input_mut(&mut self, port: PortAddress) -> Option<&mut InputPort> {
        match (port, &mut self.layer) {
            (PortAddress::Index(i), None) => self.inputs.get_mut(i),
            (PortAddress::Layer(p), Some(layer)) if layer.kind.has_port(p) => {
                Some(layer.inputs.get_mut(p))
            }
            _ => None,
        }
    }

    /// Addresses of every input port, in evaluation order.
    pub fn input_addresses(&self) -> Vec<PortAddress> {
        match &self.layer {
            Some(layer) => layer.kind.ports().into_iter().map(PortAddress::Layer).collect(),
            None => (0..self.inputs.len()).map(PortAddress::Index).collect(),
        }
    }

    /// This tick's input loops, in [`Node::input_addresses`] order.
    pub fn input_loops(&self) -> LoopList {
        self.input_addresses()
            .into_iter()
            .filter_map(|address| self.input(address).map(|port| port.values.clone()))
            .collect()
    }

    /// Sets the literal values of an input port. Returns false when the port
    /// does not exist on this node.
    pub fn set_input(&mut self, port: PortAddress, values: Loop) -> bool {
        match self.input_mut(port) {
            Some(input) => {
                input.set_literal(values);
                true
            }
            None => false,
        }
    }

    pub fn output(&self, port: usize) -> Option<&Loop> {
        self.outputs.get(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::layer::LayerInputPort;
    use crate::model::value::Value;

    #[test]
    fn test_patch_node_has_definition_ports() {
        let node = Node::patch(Patch::LoopFilter);
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.outputs.len(), 2);
        assert!(node.outputs.iter().all(|o| o.len() == 1));
    }

    #[test]
    fn test_layer_ports_are_keyed() {
        let mut node = Node::layer(LayerKind::Text);
        assert!(node.input(PortAddress::Index(0)).is_none());
        assert!(node.set_input(
            LayerInputPort::Text.into(),
            vec![Value::string("hello")]
        ));
        assert!(!node.set_input(LayerInputPort::Image.into(), vec![Value::Media(None)]));
        assert_eq!(
            node.input(LayerInputPort::Text.into()).map(|p| p.values.clone()),
            Some(vec![Value::string("hello")])
        );
    }
}
