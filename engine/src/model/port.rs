//! Port addressing and the input-port state machine (literal vs. connected).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::layer::LayerInputPort;
use super::value::{Loop, Value, ValueKind};

/// Address of a port on a node: patch ports by position, layer inputs by key.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PortAddress {
    Index(usize),
    Layer(LayerInputPort),
}

impl std::fmt::Display for PortAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortAddress::Index(i) => write!(f, "#{}", i),
            PortAddress::Layer(port) => write!(f, "{}", port),
        }
    }
}

impl From<usize> for PortAddress {
    fn from(value: usize) -> Self {
        PortAddress::Index(value)
    }
}

impl From<LayerInputPort> for PortAddress {
    fn from(value: LayerInputPort) -> Self {
        PortAddress::Layer(value)
    }
}

/// Upstream end of a connection. Outputs are always positional.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutputCoordinate {
    pub node_id: Uuid,
    pub port: usize,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputCoordinate {
    pub node_id: Uuid,
    pub port: PortAddress,
}

/// An edge in the patch graph, from an output port into an input port.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    pub id: Uuid,
    pub from: OutputCoordinate,
    pub to: InputCoordinate,
}

impl Connection {
    pub fn new(from: OutputCoordinate, to: InputCoordinate) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
        }
    }
}

/// State of one input port.
///
/// `literal` is the manually set loop and is kept while connected so that a
/// disconnect restores it. `upstream` is the source of truth when present.
/// `values` is what evaluation reads this tick. A polymorphic port takes on
/// the kind of whatever it receives instead of coercing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InputPort {
    pub label: String,
    pub kind: ValueKind,
    #[serde(default)]
    pub polymorphic: bool,
    pub literal: Loop,
    #[serde(skip)]
    pub upstream: Option<OutputCoordinate>,
    #[serde(skip)]
    pub values: Loop,
}

impl InputPort {
    pub fn new(label: impl Into<String>, kind: ValueKind, literal: Loop) -> Self {
        Self {
            label: label.into(),
            kind,
            polymorphic: false,
            values: literal.clone(),
            literal,
            upstream: None,
        }
    }

    pub fn polymorphic(mut self) -> Self {
        self.polymorphic = true;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.upstream.is_some()
    }

    /// Sets the literal values, coercing each into the port kind. A connected
    /// port keeps reading its upstream until disconnected.
    pub fn set_literal(&mut self, values: Loop) {
        self.literal = self.conform(values.iter());
        if !self.is_connected() {
            self.values = self.literal.clone();
        }
    }

    pub fn connect(&mut self, from: OutputCoordinate) {
        self.upstream = Some(from);
    }

    /// Drops the upstream and restores the literal values.
    pub fn disconnect(&mut self) -> Option<OutputCoordinate> {
        let previous = self.upstream.take();
        self.values = self.literal.clone();
        previous
    }

    /// Stores an upstream loop as this tick's values.
    pub fn receive(&mut self, upstream: &Loop) {
        self.values = self.conform(upstream.iter());
    }

    fn conform<'a>(&mut self, values: impl Iterator<Item = &'a Value>) -> Loop {
        if self.polymorphic {
            let values: Loop = values.cloned().collect();
            if let Some(first) = values.first() {
                self.kind = first.kind();
            }
            return values;
        }
        let kind = self.kind;
        values.map(|v| v.coerce(kind)).collect()
    }
}

/// Declaration of an output port.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputPortDefinition {
    pub label: String,
    pub kind: ValueKind,
}

impl OutputPortDefinition {
    pub fn new(label: &str, kind: ValueKind) -> Self {
        Self {
            label: label.to_string(),
            kind,
        }
    }
}

/// Declaration of a patch input port together with its initial literal loop.
#[derive(Clone, Debug, PartialEq)]
pub struct InputPortDefinition {
    pub label: String,
    pub kind: ValueKind,
    pub default: Loop,
    pub polymorphic: bool,
}

impl InputPortDefinition {
    pub fn new(label: &str, kind: ValueKind) -> Self {
        Self {
            label: label.to_string(),
            kind,
            default: vec![kind.default_value()],
            polymorphic: false,
        }
    }

    pub fn with_default(mut self, default: Loop) -> Self {
        self.default = default;
        self
    }

    /// Accepts values of any kind.
    pub fn polymorphic(mut self) -> Self {
        self.polymorphic = true;
        self
    }

    pub fn instantiate(&self) -> InputPort {
        let port = InputPort::new(self.label.clone(), self.kind, self.default.clone());
        if self.polymorphic {
            port.polymorphic()
        } else {
            port
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_literal_coerces() {
        let mut port = InputPort::new("Count", ValueKind::Number, vec![Value::number(1.0)]);
        port.set_literal(vec![Value::string("4"), Value::Bool(true)]);
        assert_eq!(port.literal, vec![Value::number(4.0), Value::number(1.0)]);
        assert_eq!(port.values, port.literal);
    }

    #[test]
    fn test_disconnect_restores_literal() {
        let mut port = InputPort::new("Value", ValueKind::Number, vec![Value::number(7.0)]);
        port.connect(OutputCoordinate {
            node_id: Uuid::new_v4(),
            port: 0,
        });
        port.receive(&vec![Value::number(1.0), Value::number(2.0)]);
        port.set_literal(vec![Value::number(9.0)]);
        assert_eq!(port.values.len(), 2);

        assert!(port.disconnect().is_some());
        assert_eq!(port.values, vec![Value::number(9.0)]);
        assert!(!port.is_connected());
    }

    #[test]
    fn test_polymorphic_port_adopts_kind() {
        let mut port = InputPort::new("Input", ValueKind::Number, vec![Value::number(0.0)]).polymorphic();
        port.receive(&vec![Value::string("a"), Value::string("b")]);
        assert_eq!(port.kind, ValueKind::String);
        assert_eq!(port.values, vec![Value::string("a"), Value::string("b")]);
    }

    #[test]
    fn test_port_address_display() {
        assert_eq!(PortAddress::Index(2).to_string(), "#2");
        assert_eq!(
            PortAddress::Layer(LayerInputPort::Opacity).to_string(),
            "opacity"
        );
    }
}
