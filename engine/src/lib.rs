//! Dataflow evaluation engine for a loop-based visual node graph.
//!
//! Every port carries a loop of values. Patches are evaluated once per tick
//! in dependency order by a [`PatchGraph`]; layers consume loops and
//! render one instance per index. Media loading happens off the tick loop
//! through a [`MediaCoordinator`], and [`momentum`] provides the inertial
//! scrolling used by canvas and list consumers.

pub mod clock;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod graph;
pub mod loops;
pub mod media;
pub mod model;
pub mod momentum;
pub mod nodes;
pub mod util;

pub use clock::{GraphClock, should_pulse};
pub use config::EngineConfig;
pub use error::{EngineError, MediaError};
pub use graph::PatchGraph;
pub use media::{LoadedMedia, MediaCoordinator, MediaProvider, MediaRequest};
pub use model::{GraphTime, Loop, LoopList, Node, NodeId, Value, ValueKind};
pub use momentum::{Axes, MomentumConfig, MomentumState};
pub use nodes::Patch;
