use std::time::Instant;

/// Monotonic game clock.
///
/// Two queries are exposed, both in seconds:
/// - `game_time()`: elapsed since the timer was created
/// - `tick_time()`: elapsed between the last two `update()` calls
///
/// Readers (animations, dynamics, routines) never advance the clock themselves.
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
    last: Instant,
    game_time: f32,
    tick_time: f32,
    frame_index: u64,
}

impl Timer {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a timer whose zero point is `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            game_time: 0.0,
            tick_time: 0.0,
            frame_index: 0,
        }
    }

    /// Samples the wall clock. Call once per frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Advances the clock to `now`.
    ///
    /// Timestamps earlier than the previous update saturate to a zero tick.
    pub fn update_at(&mut self, now: Instant) {
        self.tick_time = now.saturating_duration_since(self.last).as_secs_f32();
        self.game_time = now.saturating_duration_since(self.start).as_secs_f32();
        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);
    }

    #[inline]
    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    #[inline]
    pub fn tick_time(&self) -> f32 {
        self.tick_time
    }

    /// Number of `update` calls so far.
    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[inline]
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Moves the clock to `seconds` after the start (deterministic stepping).
    pub fn advance_to(&mut self, seconds: f32) {
        let now = self.start + std::time::Duration::from_secs_f32(seconds.max(0.0));
        self.update_at(now);
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let t = Timer::new();
        assert_eq!(t.game_time(), 0.0);
        assert_eq!(t.tick_time(), 0.0);
        assert_eq!(t.frame_index(), 0);
    }

    #[test]
    fn tick_is_delta_between_updates() {
        let mut t = Timer::new();
        t.advance_to(0.5);
        t.advance_to(0.75);
        assert!((t.game_time() - 0.75).abs() < 1e-5);
        assert!((t.tick_time() - 0.25).abs() < 1e-5);
        assert_eq!(t.frame_index(), 2);
    }

    #[test]
    fn going_backwards_saturates() {
        let mut t = Timer::new();
        t.advance_to(1.0);
        let earlier = t.start();
        t.update_at(earlier);
        assert_eq!(t.tick_time(), 0.0);
        assert_eq!(t.game_time(), 0.0);
    }
}
