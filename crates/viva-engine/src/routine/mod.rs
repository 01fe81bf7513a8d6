//! Timed callbacks: timeouts, intervals and bounded repetitions.
//!
//! Routines are owned by the `Registry` and run once per frame before animations.

mod queue;

pub use queue::{Routine, RoutineControl, RoutineFn, RoutineQueue};
