//! Game clock.
//!
//! One `Timer` per engine. `update()` is called exactly once per frame; animations,
//! dynamics and routines only read it.

mod timer;

pub use timer::Timer;
