//! Built-in patch catalog.

pub mod definition;

pub use definition::{Patch, PatchCategory, PatchDefinition};
