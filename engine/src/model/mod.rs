pub mod appearance;
pub mod geometry;
pub mod layer;
pub mod media;
pub mod node;
pub mod port;
pub mod value;

pub use appearance::{Anchoring, BlendMode, FitStyle, LayerDirection, TextAlignment};
pub use geometry::{Color, Vec2, Vec3, Vec4};
pub use layer::{Layer, LayerInputPort, LayerInputs, LayerKind};
pub use media::{MediaContentType, MediaRef};
pub use node::{Node, NodeId, NodeKind};
pub use port::{Connection, InputCoordinate, InputPort, OutputCoordinate, PortAddress};
pub use value::{GraphTime, Loop, LoopList, Value, ValueKind, indices_loop};
