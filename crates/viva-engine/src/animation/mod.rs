//! Sprite flip-book animation.

mod animation;
mod error;

pub use animation::Animation;
pub use error::AnimationError;
