//! Typed payloads flowing through ports.
//!
//! A port never holds a single `Value`; it holds a [`Loop`] of them. Every
//! conversion between kinds goes through [`Value::coerce`], which is total:
//! anything it cannot convert becomes the target kind's default.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::appearance::{Anchoring, BlendMode, FitStyle, LayerDirection, TextAlignment};
use super::geometry::{Color, Vec2, Vec3, Vec4};
use super::media::MediaRef;

/// Ordered sequence of values flowing through a single port.
pub type Loop = Vec<Value>;

/// One loop per port, in port order.
pub type LoopList = Vec<Loop>;

/// Graph time in seconds.
pub type GraphTime = f64;

/// Discriminant of [`Value`].
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    Number,
    Bool,
    String,
    Color,
    Size,
    Position,
    Point3D,
    Point4D,
    Anchoring,
    BlendMode,
    TextAlignment,
    LayerDirection,
    FitStyle,
    Pulse,
    Media,
    Json,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Value {
    Number(OrderedFloat<f64>),
    Bool(bool),
    String(String),
    Color(Color),
    Size(Vec2),
    Position(Vec2),
    Point3D(Vec3),
    Point4D(Vec4),
    Anchoring(Anchoring),
    BlendMode(BlendMode),
    TextAlignment(TextAlignment),
    LayerDirection(LayerDirection),
    FitStyle(FitStyle),
    /// Graph time at which the pulse is scheduled to fire.
    Pulse(OrderedFloat<f64>),
    /// Handle to async-loaded media; `None` until something is loaded.
    Media(Option<MediaRef>),
    Json(serde_json::Value),
}

impl ValueKind {
    pub const ALL: &'static [ValueKind] = &[
        ValueKind::Number,
        ValueKind::Bool,
        ValueKind::String,
        ValueKind::Color,
        ValueKind::Size,
        ValueKind::Position,
        ValueKind::Point3D,
        ValueKind::Point4D,
        ValueKind::Anchoring,
        ValueKind::BlendMode,
        ValueKind::TextAlignment,
        ValueKind::LayerDirection,
        ValueKind::FitStyle,
        ValueKind::Pulse,
        ValueKind::Media,
        ValueKind::Json,
    ];

    /// The kind's falsy default. Total and pure.
    pub fn default_value(&self) -> Value {
        match self {
            ValueKind::Number => Value::Number(OrderedFloat(0.0)),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::String => Value::String(String::new()),
            ValueKind::Color => Value::Color(Color::CLEAR),
            ValueKind::Size => Value::Size(Vec2::default()),
            ValueKind::Position => Value::Position(Vec2::default()),
            ValueKind::Point3D => Value::Point3D(Vec3::default()),
            ValueKind::Point4D => Value::Point4D(Vec4::default()),
            ValueKind::Anchoring => Value::Anchoring(Anchoring::default()),
            ValueKind::BlendMode => Value::BlendMode(BlendMode::default()),
            ValueKind::TextAlignment => Value::TextAlignment(TextAlignment::default()),
            ValueKind::LayerDirection => Value::LayerDirection(LayerDirection::default()),
            ValueKind::FitStyle => Value::FitStyle(FitStyle::default()),
            ValueKind::Pulse => Value::Pulse(OrderedFloat(0.0)),
            ValueKind::Media => Value::Media(None),
            ValueKind::Json => Value::Json(serde_json::Value::Object(Default::default())),
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueKind::Number => "Number",
            ValueKind::Bool => "Bool",
            ValueKind::String => "String",
            ValueKind::Color => "Color",
            ValueKind::Size => "Size",
            ValueKind::Position => "Position",
            ValueKind::Point3D => "3D Point",
            ValueKind::Point4D => "4D Point",
            ValueKind::Anchoring => "Anchoring",
            ValueKind::BlendMode => "Blend Mode",
            ValueKind::TextAlignment => "Text Alignment",
            ValueKind::LayerDirection => "Layer Direction",
            ValueKind::FitStyle => "Fit Style",
            ValueKind::Pulse => "Pulse",
            ValueKind::Media => "Media",
            ValueKind::Json => "JSON",
        };
        write!(f, "{}", s)
    }
}

impl Value {
    pub fn number(n: f64) -> Self {
        Value::Number(OrderedFloat(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn pulse(time: GraphTime) -> Self {
        Value::Pulse(OrderedFloat(time))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Bool(_) => ValueKind::Bool,
            Value::String(_) => ValueKind::String,
            Value::Color(_) => ValueKind::Color,
            Value::Size(_) => ValueKind::Size,
            Value::Position(_) => ValueKind::Position,
            Value::Point3D(_) => ValueKind::Point3D,
            Value::Point4D(_) => ValueKind::Point4D,
            Value::Anchoring(_) => ValueKind::Anchoring,
            Value::BlendMode(_) => ValueKind::BlendMode,
            Value::TextAlignment(_) => ValueKind::TextAlignment,
            Value::LayerDirection(_) => ValueKind::LayerDirection,
            Value::FitStyle(_) => ValueKind::FitStyle,
            Value::Pulse(_) => ValueKind::Pulse,
            Value::Media(_) => ValueKind::Media,
            Value::Json(_) => ValueKind::Json,
        }
    }

    /// Falsy value of the same kind as `self`.
    pub fn default_false(&self) -> Value {
        self.kind().default_value()
    }

    /// Numeric reading of the value; anything without a numeric meaning reads as 0.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => n.into_inner(),
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Value::Size(v) | Value::Position(v) => v.x.into_inner(),
            Value::Point3D(v) => v.x.into_inner(),
            Value::Point4D(v) => v.x.into_inner(),
            Value::Json(j) => j.as_f64().unwrap_or(0.0),
            Value::Anchoring(a) => enum_index(Anchoring::ALL, a) as f64,
            Value::BlendMode(b) => enum_index(BlendMode::ALL, b) as f64,
            Value::TextAlignment(t) => enum_index(TextAlignment::ALL, t) as f64,
            Value::LayerDirection(d) => enum_index(LayerDirection::ALL, d) as f64,
            Value::FitStyle(s) => enum_index(FitStyle::ALL, s) as f64,
            Value::Color(_) | Value::Pulse(_) | Value::Media(_) => 0.0,
        }
    }

    /// Integer reading, truncated toward zero. NaN reads as 0.
    pub fn as_int(&self) -> i64 {
        self.as_number() as i64
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => n.into_inner() != 0.0,
            Value::String(s) => !s.is_empty() && !s.eq_ignore_ascii_case("false"),
            Value::Json(j) => match j {
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::Null => false,
                other => other.as_f64().map(|n| n != 0.0).unwrap_or(true),
            },
            Value::Media(m) => m.is_some(),
            _ => false,
        }
    }

    /// The pulse time, if this is a pulse.
    pub fn as_pulse(&self) -> Option<GraphTime> {
        match self {
            Value::Pulse(t) => Some(t.into_inner()),
            _ => None,
        }
    }

    pub fn as_media(&self) -> Option<&MediaRef> {
        match self {
            Value::Media(Some(media)) => Some(media),
            _ => None,
        }
    }

    /// Converts `self` to `target`. Total: unsupported conversions yield the
    /// target kind's default.
    pub fn coerce(&self, target: ValueKind) -> Value {
        if self.kind() == target {
            return self.clone();
        }

        let converted = match target {
            ValueKind::Number => Some(Value::number(self.as_number())),
            ValueKind::Bool => Some(Value::Bool(self.as_bool())),
            ValueKind::String => self.display_string().map(Value::String),
            ValueKind::Color => match self {
                Value::String(s) => Color::from_hex(s).map(Value::Color),
                Value::Json(serde_json::Value::String(s)) => Color::from_hex(s).map(Value::Color),
                _ => None,
            },
            ValueKind::Size => self.as_vec2().map(Value::Size),
            ValueKind::Position => self.as_vec2().map(Value::Position),
            ValueKind::Point3D => match self {
                Value::Number(n) => Some(Value::Point3D(Vec3::new(n.0, n.0, n.0))),
                Value::Size(v) | Value::Position(v) => Some(Value::Point3D(Vec3 {
                    x: v.x,
                    y: v.y,
                    z: OrderedFloat(0.0),
                })),
                Value::Point4D(v) => Some(Value::Point3D(Vec3 {
                    x: v.x,
                    y: v.y,
                    z: v.z,
                })),
                _ => None,
            },
            ValueKind::Point4D => match self {
                Value::Number(n) => Some(Value::Point4D(Vec4::new(n.0, n.0, n.0, n.0))),
                Value::Size(v) | Value::Position(v) => {
                    Some(Value::Point4D(Vec4::new(v.x.0, v.y.0, 0.0, 0.0)))
                }
                Value::Point3D(v) => Some(Value::Point4D(Vec4 {
                    x: v.x,
                    y: v.y,
                    z: v.z,
                    w: OrderedFloat(0.0),
                })),
                _ => None,
            },
            ValueKind::Anchoring => self
                .enum_source(Anchoring::from_label, Anchoring::from_index)
                .map(Value::Anchoring),
            ValueKind::BlendMode => self
                .enum_source(BlendMode::from_label, BlendMode::from_index)
                .map(Value::BlendMode),
            ValueKind::TextAlignment => self
                .enum_source(TextAlignment::from_label, TextAlignment::from_index)
                .map(Value::TextAlignment),
            ValueKind::LayerDirection => self
                .enum_source(LayerDirection::from_label, LayerDirection::from_index)
                .map(Value::LayerDirection),
            ValueKind::FitStyle => self
                .enum_source(FitStyle::from_label, FitStyle::from_index)
                .map(Value::FitStyle),
            ValueKind::Pulse => None,
            ValueKind::Media => None,
            ValueKind::Json => Some(Value::Json(self.to_json())),
        };

        converted.unwrap_or_else(|| target.default_value())
    }

    /// Natural JSON form: numbers, strings and bools map directly; JSON
    /// passes through; everything else uses its tagged serde form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Number(n) => serde_json::Number::from_f64(n.into_inner())
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Json(j) => j.clone(),
            other => serde_json::to_value(other).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Inverse of [`Value::to_json`] for untyped JSON data.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Number(n) => Value::number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::String(s) => Value::String(s.clone()),
            other => Value::Json(other.clone()),
        }
    }

    fn display_string(&self) -> Option<String> {
        let s = match self {
            Value::Number(n) => n.into_inner().to_string(),
            Value::Bool(b) => b.to_string(),
            Value::String(s) => s.clone(),
            Value::Color(c) => c.to_hex(),
            Value::Size(v) | Value::Position(v) => format!("{}, {}", v.x, v.y),
            Value::Point3D(v) => format!("{}, {}, {}", v.x, v.y, v.z),
            Value::Point4D(v) => format!("{}, {}, {}, {}", v.x, v.y, v.z, v.w),
            Value::Anchoring(a) => a.to_string(),
            Value::BlendMode(b) => b.to_string(),
            Value::TextAlignment(t) => t.to_string(),
            Value::LayerDirection(d) => d.to_string(),
            Value::FitStyle(s) => s.to_string(),
            Value::Json(j) => j.to_string(),
            Value::Pulse(_) | Value::Media(_) => return None,
        };
        Some(s)
    }

    fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Value::Number(n) => Some(Vec2::splat(n.into_inner())),
            Value::Size(v) | Value::Position(v) => Some(*v),
            Value::Point3D(v) => Some(Vec2 { x: v.x, y: v.y }),
            Value::Point4D(v) => Some(Vec2 { x: v.x, y: v.y }),
            _ => None,
        }
    }

    fn enum_source<T>(
        &self,
        from_label: fn(&str) -> Option<T>,
        from_index: fn(i64) -> T,
    ) -> Option<T> {
        match self {
            Value::String(s) => from_label(s),
            Value::Number(n) => Some(from_index(n.into_inner() as i64)),
            _ => None,
        }
    }
}

fn enum_index<T: PartialEq>(all: &[T], value: &T) -> usize {
    all.iter().position(|v| v == value).unwrap_or(0)
}

impl Default for Value {
    fn default() -> Self {
        ValueKind::Number.default_value()
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

/// `[0, 1, .., len - 1]` as numbers; the parallel index output of most loop nodes.
pub fn indices_loop(len: usize) -> Loop {
    (0..len).map(|i| Value::number(i as f64)).collect()
}
