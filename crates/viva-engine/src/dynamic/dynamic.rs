use crate::coords::Vec2;
use crate::resources::SpriteId;
use crate::sprite::Sprite;
use crate::time::Timer;

/// One value per animatable sprite channel.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Motion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rot: f32,
    pub sx: f32,
    pub sy: f32,
}

/// Explicit Euler integrator driving a sprite's position, depth, rotation and scale.
///
/// Each step moves by the current velocity first and only then applies the
/// acceleration, so the result depends on how finely time is sliced.
#[derive(Debug, Clone, PartialEq)]
pub struct Dynamic {
    sprite: SpriteId,
    pub velocity: Motion,
    pub acceleration: Motion,
    last: f32,
}

impl Dynamic {
    /// A motionless integrator whose clock starts at the timer's current game time.
    pub fn new(sprite: SpriteId, timer: &Timer) -> Self {
        Self {
            sprite,
            velocity: Motion::default(),
            acceleration: Motion::default(),
            last: timer.game_time(),
        }
    }

    #[inline]
    pub fn sprite(&self) -> SpriteId {
        self.sprite
    }

    /// Integrates over the game time elapsed since the previous update.
    pub fn update(&mut self, sprite: &mut Sprite, timer: &Timer) {
        let now = timer.game_time();
        let dt = now - self.last;
        self.last = now;
        self.step(sprite, dt);
    }

    /// One step of `dt` seconds.
    pub fn step(&mut self, sprite: &mut Sprite, dt: f32) {
        let v = &mut self.velocity;
        let a = &self.acceleration;

        sprite.x += v.x * dt;
        sprite.y += v.y * dt;
        sprite.z += v.z * dt;
        sprite.rot += v.rot * dt;
        sprite.sx += v.sx * dt;
        sprite.sy += v.sy * dt;

        v.x += a.x * dt;
        v.y += a.y * dt;
        v.z += a.z * dt;
        v.rot += a.rot * dt;
        v.sx += a.sx * dt;
        v.sy += a.sy * dt;
    }

    /// Points the x/y velocity at `target`, `speed` units per second.
    pub fn move_to(&mut self, sprite: &Sprite, target: Vec2, speed: f32) {
        let v = move_to(sprite, target, speed);
        self.velocity.x = v.x;
        self.velocity.y = v.y;
    }
}

/// Velocity of magnitude `speed` from the sprite towards `target`; zero when already there.
pub fn move_to(sprite: &Sprite, target: Vec2, speed: f32) -> Vec2 {
    let delta = target - Vec2::new(sprite.x, sprite.y);
    delta.normalized() * speed
}

/// Rotation that turns the sprite's local +x axis towards `target`.
pub fn look_at(sprite: &Sprite, target: Vec2) -> f32 {
    (target.y - sprite.y).atan2(target.x - sprite.x)
}
