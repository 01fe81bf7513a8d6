//! Velocity/acceleration integration for sprites.

mod dynamic;

pub use dynamic::{look_at, move_to, Dynamic, Motion};
