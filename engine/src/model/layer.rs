//! Layer nodes and their keyed input ports.
//!
//! Layer inputs are addressed by [`LayerInputPort`] rather than by position.
//! Every layer carries the full [`LayerInputs`] record; [`LayerKind::ports`]
//! lists which of them a given kind exposes.

use serde::{Deserialize, Serialize};

use super::appearance::{Anchoring, BlendMode, FitStyle, LayerDirection, TextAlignment};
use super::geometry::{Color, Vec2};
use super::port::InputPort;
use super::value::{Loop, Value, ValueKind};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    Rectangle,
    Text,
    Image,
    Group,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum LayerInputPort {
    Position,
    Size,
    Opacity,
    Scale,
    Rotation,
    Anchoring,
    ZIndex,
    Color,
    CornerRadius,
    BlendMode,
    Text,
    FontSize,
    TextAlignment,
    Image,
    FitStyle,
    Orientation,
    Spacing,
}

impl LayerInputPort {
    pub fn key(&self) -> &'static str {
        match self {
            LayerInputPort::Position => "position",
            LayerInputPort::Size => "size",
            LayerInputPort::Opacity => "opacity",
            LayerInputPort::Scale => "scale",
            LayerInputPort::Rotation => "rotation",
            LayerInputPort::Anchoring => "anchoring",
            LayerInputPort::ZIndex => "zIndex",
            LayerInputPort::Color => "color",
            LayerInputPort::CornerRadius => "cornerRadius",
            LayerInputPort::BlendMode => "blendMode",
            LayerInputPort::Text => "text",
            LayerInputPort::FontSize => "fontSize",
            LayerInputPort::TextAlignment => "textAlignment",
            LayerInputPort::Image => "image",
            LayerInputPort::FitStyle => "fitStyle",
            LayerInputPort::Orientation => "orientation",
            LayerInputPort::Spacing => "spacing",
        }
    }

    /// Kind and initial literal of a freshly created port.
    fn default_port(&self) -> InputPort {
        let (kind, value) = match self {
            LayerInputPort::Position => (ValueKind::Position, Value::Position(Vec2::default())),
            LayerInputPort::Size => (ValueKind::Size, Value::Size(Vec2::new(100.0, 100.0))),
            LayerInputPort::Opacity => (ValueKind::Number, Value::number(1.0)),
            LayerInputPort::Scale => (ValueKind::Number, Value::number(1.0)),
            LayerInputPort::Rotation => (ValueKind::Number, Value::number(0.0)),
            LayerInputPort::Anchoring => {
                (ValueKind::Anchoring, Value::Anchoring(Anchoring::default()))
            }
            LayerInputPort::ZIndex => (ValueKind::Number, Value::number(0.0)),
            LayerInputPort::Color => (ValueKind::Color, Value::Color(Color::BLUE)),
            LayerInputPort::CornerRadius => (ValueKind::Number, Value::number(0.0)),
            LayerInputPort::BlendMode => {
                (ValueKind::BlendMode, Value::BlendMode(BlendMode::default()))
            }
            LayerInputPort::Text => (ValueKind::String, Value::string("Text")),
            LayerInputPort::FontSize => (ValueKind::Number, Value::number(36.0)),
            LayerInputPort::TextAlignment => (
                ValueKind::TextAlignment,
                Value::TextAlignment(TextAlignment::default()),
            ),
            LayerInputPort::Image => (ValueKind::Media, Value::Media(None)),
            LayerInputPort::FitStyle => (ValueKind::FitStyle, Value::FitStyle(FitStyle::default())),
            LayerInputPort::Orientation => (
                ValueKind::LayerDirection,
                Value::LayerDirection(LayerDirection::default()),
            ),
            LayerInputPort::Spacing => (ValueKind::Number, Value::number(0.0)),
        };
        InputPort::new(self.key(), kind, vec![value])
    }
}

impl std::fmt::Display for LayerInputPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

const COMMON_PORTS: &[LayerInputPort] = &[
    LayerInputPort::Position,
    LayerInputPort::Size,
    LayerInputPort::Opacity,
    LayerInputPort::Scale,
    LayerInputPort::Rotation,
    LayerInputPort::Anchoring,
    LayerInputPort::ZIndex,
    LayerInputPort::BlendMode,
];

impl LayerKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            LayerKind::Rectangle => "Rectangle",
            LayerKind::Text => "Text",
            LayerKind::Image => "Image",
            LayerKind::Group => "Group",
        }
    }

    /// Input ports exposed by this kind, common ports first.
    pub fn ports(&self) -> Vec<LayerInputPort> {
        let specific: &[LayerInputPort] = match self {
            LayerKind::Rectangle => &[LayerInputPort::Color, LayerInputPort::CornerRadius],
            LayerKind::Text => &[
                LayerInputPort::Color,
                LayerInputPort::Text,
                LayerInputPort::FontSize,
                LayerInputPort::TextAlignment,
            ],
            LayerKind::Image => &[LayerInputPort::Image, LayerInputPort::FitStyle],
            LayerKind::Group => &[
                LayerInputPort::Color,
                LayerInputPort::CornerRadius,
                LayerInputPort::Orientation,
                LayerInputPort::Spacing,
            ],
        };
        COMMON_PORTS.iter().chain(specific).copied().collect()
    }

    pub fn has_port(&self, port: LayerInputPort) -> bool {
        self.ports().contains(&port)
    }
}

/// One field per [`LayerInputPort`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LayerInputs {
    pub position: InputPort,
    pub size: InputPort,
    pub opacity: InputPort,
    pub scale: InputPort,
    pub rotation: InputPort,
    pub anchoring: InputPort,
    pub z_index: InputPort,
    pub color: InputPort,
    pub corner_radius: InputPort,
    pub blend_mode: InputPort,
    pub text: InputPort,
    pub font_size: InputPort,
    pub text_alignment: InputPort,
    pub image: InputPort,
    pub fit_style: InputPort,
    pub orientation: InputPort,
    pub spacing: InputPort,
}

impl Default for LayerInputs {
    fn default() -> Self {
        Self {
            position: LayerInputPort::Position.default_port(),
            size: LayerInputPort::Size.default_port(),
            opacity: LayerInputPort::Opacity.default_port(),
            scale: LayerInputPort::Scale.default_port(),
            rotation: LayerInputPort::Rotation.default_port(),
            anchoring: LayerInputPort::Anchoring.default_port(),
            z_index: LayerInputPort::ZIndex.default_port(),
            color: LayerInputPort::Color.default_port(),
            corner_radius: LayerInputPort::CornerRadius.default_port(),
            blend_mode: LayerInputPort::BlendMode.default_port(),
            text: LayerInputPort::Text.default_port(),
            font_size: LayerInputPort::FontSize.default_port(),
            text_alignment: LayerInputPort::TextAlignment.default_port(),
            image: LayerInputPort::Image.default_port(),
            fit_style: LayerInputPort::FitStyle.default_port(),
            orientation: LayerInputPort::Orientation.default_port(),
            spacing: LayerInputPort::Spacing.default_port(),
        }
    }
}

impl LayerInputs {
    pub fn get(&self, port: LayerInputPort) -> &InputPort {
        match port {
            LayerInputPort::Position => &self.position,
            LayerInputPort::Size => &self.size,
            LayerInputPort::Opacity => &self.opacity,
            LayerInputPort::Scale => &self.scale,
            LayerInputPort::Rotation => &self.rotation,
            LayerInputPort::Anchoring => &self.anchoring,
            LayerInputPort::ZIndex => &self.z_index,
            LayerInputPort::Color => &self.color,
            LayerInputPort::CornerRadius => &self.corner_radius,
            LayerInputPort::BlendMode => &self.blend_mode,
            LayerInputPort::Text => &self.text,
            LayerInputPort::FontSize => &self.font_size,
            LayerInputPort::TextAlignment => &self.text_alignment,
            LayerInputPort::Image => &self.image,
            LayerInputPort::FitStyle => &self.fit_style,
            LayerInputPort::Orientation => &self.orientation,
            LayerInputPort::Spacing => &self.spacing,
        }
    }

    pub fn get_mut(&mut self, port: LayerInputPort) -> &mut InputPort {
        match port {
            LayerInputPort::Position => &mut self.position,
            LayerInputPort::Size => &mut self.size,
            LayerInputPort::Opacity => &mut self.opacity,
            LayerInputPort::Scale => &mut self.scale,
            LayerInputPort::Rotation => &mut self.rotation,
            LayerInputPort::Anchoring => &mut self.anchoring,
            LayerInputPort::ZIndex => &mut self.z_index,
            LayerInputPort::Color => &mut self.color,
            LayerInputPort::CornerRadius => &mut self.corner_radius,
            LayerInputPort::BlendMode => &mut self.blend_mode,
            LayerInputPort::Text => &mut self.text,
            LayerInputPort::FontSize => &mut self.font_size,
            LayerInputPort::TextAlignment => &mut self.text_alignment,
            LayerInputPort::Image => &mut self.image,
            LayerInputPort::FitStyle => &mut self.fit_style,
            LayerInputPort::Orientation => &mut self.orientation,
            LayerInputPort::Spacing => &mut self.spacing,
        }
    }

    /// Sets the literal loop of `port`, coerced into the port's kind.
    pub fn set(&mut self, port: LayerInputPort, values: Loop) {
        self.get_mut(port).set_literal(values);
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub inputs: LayerInputs,
}

impl Layer {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            inputs: LayerInputs::default(),
        }
    }

    /// The longest loop across this layer's ports, i.e. how many instances
    /// of the layer a renderer should draw.
    pub fn instance_count(&self) -> usize {
        self.kind
            .ports()
            .iter()
            .map(|port| self.inputs.get(*port).values.len())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_coerces_into_port_kind() {
        let mut layer = Layer::new(LayerKind::Rectangle);
        layer
            .inputs
            .set(LayerInputPort::Color, vec![Value::string("#FF0000")]);
        assert_eq!(
            layer.inputs.get(LayerInputPort::Color).values,
            vec![Value::Color(Color::rgba(255, 0, 0, 255))]
        );
    }

    #[test]
    fn test_ports_by_kind() {
        assert!(LayerKind::Text.has_port(LayerInputPort::Text));
        assert!(!LayerKind::Rectangle.has_port(LayerInputPort::Image));
        assert!(LayerKind::Image.has_port(LayerInputPort::Opacity));
    }

    #[test]
    fn test_instance_count_follows_longest_port() {
        let mut layer = Layer::new(LayerKind::Rectangle);
        assert_eq!(layer.instance_count(), 1);
        layer.inputs.set(
            LayerInputPort::Opacity,
            vec![Value::number(0.1), Value::number(0.5), Value::number(1.0)],
        );
        assert_eq!(layer.instance_count(), 3);
    }
}
