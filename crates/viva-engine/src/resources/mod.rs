//! Ownership of engine resources and leak accounting.
//!
//! The `Registry` hands out typed slot handles and releases everything in a
//! fixed order at shutdown. Its `LeakTracker` records every handle so that
//! whatever was never released can be reported.

mod ids;
mod registry;
mod slots;
mod tracker;

pub use ids::{
    AnimationId, DynamicId, FontId, LineId, MeshId, RoutineId, SpriteBlock, SpriteId, TextId,
    TextureSlot,
};
pub use registry::Registry;
pub use tracker::{Allocation, LeakTracker, ResourceKind};
