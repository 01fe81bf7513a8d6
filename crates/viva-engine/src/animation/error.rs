use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationError {
    /// An animation needs at least one frame.
    NoFrames,
}

impl fmt::Display for AnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationError::NoFrames => write!(f, "animation has no frames"),
        }
    }
}

impl std::error::Error for AnimationError {}
