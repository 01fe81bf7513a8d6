use crate::coords::UvRect;
use crate::resources::SpriteId;
use crate::sprite::Sprite;
use crate::time::Timer;

use super::AnimationError;

/// Flip-book animation: cycles a sprite's UV rect through a list of frames.
///
/// States are Stopped and Playing. While playing, each `update` that finds more
/// than `speed` seconds accumulated advances one frame and subtracts one period,
/// so a long stall is caught up one frame per update rather than all at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    sprite: SpriteId,
    frames: Vec<UvRect>,
    /// Seconds per frame.
    pub speed: f32,
    /// Stop once this many frame changes have happened; 0 loops forever.
    pub stop_after: u32,

    current: usize,
    playing: bool,
    changes: u32,
    elapsed: f32,
    last: f32,
    frame_changed: bool,
}

impl Animation {
    pub fn new(sprite: SpriteId, frames: Vec<UvRect>, speed: f32) -> Result<Self, AnimationError> {
        if frames.is_empty() {
            return Err(AnimationError::NoFrames);
        }
        Ok(Self {
            sprite,
            frames,
            speed,
            stop_after: 0,
            current: 0,
            playing: false,
            changes: 0,
            elapsed: 0.0,
            last: 0.0,
            frame_changed: false,
        })
    }

    /// Shows the first frame on `sprite`.
    pub fn init(&self, sprite: &mut Sprite) {
        sprite.set_uv(self.frames[0]);
    }

    pub fn play(&mut self, sprite: &mut Sprite, timer: &Timer) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.last = timer.game_time();
        sprite.set_uv(self.frames[self.current]);
    }

    /// Stops advancing. The current frame is kept.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Back to frame 0, stopped. The sprite keeps whatever UV it shows.
    pub fn reset(&mut self) {
        self.playing = false;
        self.current = 0;
        self.changes = 0;
        self.elapsed = 0.0;
        self.frame_changed = false;
    }

    /// Hands playback over to `target`: resets `self` and starts `target`.
    ///
    /// Only happens when `self` is playing and `target` is not. Returns whether the
    /// switch took place.
    pub fn change(
        &mut self,
        target: &mut Animation,
        target_sprite: &mut Sprite,
        timer: &Timer,
    ) -> bool {
        if !self.playing || target.playing {
            return false;
        }
        self.reset();
        target.play(target_sprite, timer);
        true
    }

    pub fn update(&mut self, sprite: &mut Sprite, timer: &Timer) {
        if !self.playing {
            return;
        }

        self.frame_changed = false;
        let now = timer.game_time();
        self.elapsed += now - self.last;
        self.last = now;

        if self.elapsed > self.speed {
            self.elapsed -= self.speed;
            self.current = (self.current + 1) % self.frames.len();
            sprite.set_uv(self.frames[self.current]);
            self.changes += 1;
            self.frame_changed = true;
        }

        if self.stop_after > 0 && self.changes > self.stop_after {
            self.playing = false;
        }
    }

    /// Mirrors every frame left to right. Applying it twice restores the frames.
    pub fn flip_horizontally(&mut self) {
        self.frames.iter_mut().for_each(UvRect::flip_horizontal);
    }

    pub fn flip_vertically(&mut self) {
        self.frames.iter_mut().for_each(UvRect::flip_vertical);
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn sprite(&self) -> SpriteId {
        self.sprite
    }

    #[inline]
    pub fn frames(&self) -> &[UvRect] {
        &self.frames
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current
    }

    /// Whether the last `update` advanced a frame.
    #[inline]
    pub fn frame_changed(&self) -> bool {
        self.frame_changed
    }

    #[inline]
    pub fn changes(&self) -> u32 {
        self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> Vec<UvRect> {
        (0..4)
            .map(|i| {
                let l = i as f32 * 0.25;
                UvRect::new(l, 0.0, l + 0.25, 1.0)
            })
            .collect()
    }

    fn anim(speed: f32) -> Animation {
        Animation::new(SpriteId(0), frames(), speed).unwrap()
    }

    #[test]
    fn empty_frames_are_rejected() {
        assert_eq!(
            Animation::new(SpriteId(0), Vec::new(), 0.1),
            Err(AnimationError::NoFrames)
        );
    }

    #[test]
    fn init_and_play_push_the_current_frame() {
        let a = anim(0.1);
        let mut s = Sprite::default();
        a.init(&mut s);
        assert_eq!(s.uv(), frames()[0]);

        let mut a = a;
        let timer = Timer::new();
        a.current = 2;
        a.play(&mut s, &timer);
        assert!(a.is_playing());
        assert_eq!(s.uv(), frames()[2]);
    }

    #[test]
    fn advances_after_one_period() {
        let mut a = anim(0.1);
        let mut s = Sprite::default();
        let mut timer = Timer::new();
        a.play(&mut s, &timer);

        timer.advance_to(0.05);
        a.update(&mut s, &timer);
        assert_eq!(a.current_frame(), 0);
        assert!(!a.frame_changed());

        timer.advance_to(0.15);
        a.update(&mut s, &timer);
        assert_eq!(a.current_frame(), 1);
        assert!(a.frame_changed());
        assert_eq!(s.uv(), frames()[1]);

        timer.advance_to(0.16);
        a.update(&mut s, &timer);
        assert!(!a.frame_changed());
    }

    #[test]
    fn stall_is_caught_up_one_frame_per_update() {
        let mut a = anim(0.1);
        let mut s = Sprite::default();
        let mut timer = Timer::new();
        a.play(&mut s, &timer);

        timer.advance_to(0.35);
        a.update(&mut s, &timer);
        assert_eq!(a.current_frame(), 1);

        // No time passes, but the remaining backlog still advances.
        a.update(&mut s, &timer);
        assert_eq!(a.current_frame(), 2);
        a.update(&mut s, &timer);
        assert_eq!(a.current_frame(), 3);
        a.update(&mut s, &timer);
        assert_eq!(a.current_frame(), 3);
    }

    #[test]
    fn wraps_and_stops_after_limit() {
        let mut a = anim(0.1);
        a.stop_after = 4;
        let mut s = Sprite::default();
        let mut timer = Timer::new();
        a.play(&mut s, &timer);

        for step in 1..=5 {
            timer.advance_to(step as f32 * 0.11);
            a.update(&mut s, &timer);
        }
        assert_eq!(a.changes(), 5);
        assert_eq!(a.current_frame(), 1);
        assert!(!a.is_playing());
    }

    #[test]
    fn pause_keeps_frame_and_reset_rewinds() {
        let mut a = anim(0.1);
        let mut s = Sprite::default();
        let mut timer = Timer::new();
        a.play(&mut s, &timer);
        timer.advance_to(0.15);
        a.update(&mut s, &timer);

        a.pause();
        assert!(!a.is_playing());
        assert_eq!(a.current_frame(), 1);

        a.reset();
        assert_eq!(a.current_frame(), 0);
        assert_eq!(a.changes(), 0);
        assert_eq!(s.uv(), frames()[1]);
    }

    #[test]
    fn change_truth_table() {
        let timer = Timer::new();
        let mut s = Sprite::default();

        for (from_playing, to_playing, expect) in [
            (false, false, false),
            (false, true, false),
            (true, false, true),
            (true, true, false),
        ] {
            let mut from = anim(0.1);
            let mut to = anim(0.1);
            from.playing = from_playing;
            to.playing = to_playing;

            let changed = from.change(&mut to, &mut s, &timer);
            assert_eq!(changed, expect, "from={from_playing} to={to_playing}");
            if expect {
                assert!(!from.is_playing());
                assert!(to.is_playing());
            } else {
                assert_eq!(from.is_playing(), from_playing);
                assert_eq!(to.is_playing(), to_playing);
            }
        }
    }

    #[test]
    fn flips_are_involutions() {
        let mut a = anim(0.1);
        a.flip_horizontally();
        assert_eq!(a.frames()[1], UvRect::new(0.5, 0.0, 0.25, 1.0));
        a.flip_horizontally();
        assert_eq!(a.frames(), frames().as_slice());

        a.flip_vertically();
        a.flip_vertically();
        assert_eq!(a.frames(), frames().as_slice());
    }
}
