use std::path::Path;
use std::rc::Rc;

use crate::animation::Animation;
use crate::dynamic::Dynamic;
use crate::mesh::Mesh;
use crate::render::Renderer;
use crate::routine::{Routine, RoutineControl, RoutineQueue};
use crate::sprite::{Line, Sprite};
use crate::text::{Font, FontError, Text};
use crate::texture::{Texture, TextureError};
use crate::time::Timer;

use super::ids::{
    AnimationId, DynamicId, FontId, LineId, MeshId, RoutineId, SpriteBlock, SpriteId, TextId,
    TextureSlot,
};
use super::slots::Slots;
use super::tracker::{Allocation, LeakTracker, ResourceKind};

/// Owner of every engine resource between creation and shutdown.
///
/// Handles are plain slot indices. A freed slot is never reused, so a stale
/// handle resolves to `None`. `free_all` releases everything in dependency
/// order (users before the things they reference, GPU objects last).
#[derive(Debug, Default)]
pub struct Registry {
    textures: Slots<Texture>,
    fonts: Slots<Rc<Font>>,
    sprites: Slots<Sprite>,
    animations: Slots<Animation>,
    dynamics: Slots<Dynamic>,
    texts: Slots<Text>,
    lines: Slots<Line>,
    meshes: Slots<Mesh>,
    routines: RoutineQueue,
    next_routine: usize,
    /// Cancellations requested while the queue is detached for a run.
    pending_cancels: Vec<RoutineId>,
    tracker: LeakTracker,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── textures & fonts ──────────────────────────────────────────────────

    /// Takes ownership of `texture`; its GPU handle is released by `free_all`.
    pub fn add_texture(&mut self, mut texture: Texture) -> TextureSlot {
        texture.index = self.textures.next_index();
        let i = self.textures.push(texture);
        self.tracker.alloc(ResourceKind::Texture, i);
        TextureSlot(i)
    }

    /// Decodes and uploads an image file, then registers it.
    pub fn load_texture(
        &mut self,
        renderer: &mut Renderer<'_>,
        path: impl AsRef<Path>,
    ) -> Result<TextureSlot, TextureError> {
        let texture = renderer.create_texture_from_file(path)?;
        Ok(self.add_texture(texture))
    }

    #[inline]
    pub fn texture(&self, slot: TextureSlot) -> Option<&Texture> {
        self.textures.get(slot.0)
    }

    pub fn free_texture(&mut self, renderer: &mut Renderer<'_>, slot: TextureSlot) {
        if let Some(texture) = self.textures.take(slot.0) {
            self.tracker.free(ResourceKind::Texture, slot.0);
            if let Err(e) = renderer.destroy_texture(texture) {
                log::warn!("{e}");
            }
        }
    }

    pub fn add_font(&mut self, font: Rc<Font>) -> FontId {
        let i = self.fonts.push(font);
        self.tracker.alloc(ResourceKind::Font, i);
        FontId(i)
    }

    /// Bakes a TTF/OTF font and registers both the font and its atlas texture.
    pub fn bake_font(
        &mut self,
        renderer: &mut Renderer<'_>,
        data: &[u8],
        px: f32,
    ) -> Result<FontId, FontError> {
        let font = Font::bake(renderer, data, px)?;
        if let Some(texture) = font.texture() {
            self.add_texture(*texture);
        }
        Ok(self.add_font(Rc::new(font)))
    }

    #[inline]
    pub fn font(&self, id: FontId) -> Option<Rc<Font>> {
        self.fonts.get(id.0).cloned()
    }

    // ── sprites & lines ───────────────────────────────────────────────────

    pub fn add_sprite(&mut self, sprite: Sprite) -> SpriteId {
        let i = self.sprites.push(sprite);
        self.tracker.alloc(ResourceKind::Sprite, i);
        SpriteId(i)
    }

    /// Allocates `count` consecutive copies of `template`.
    pub fn add_sprites(&mut self, count: usize, template: Sprite) -> SpriteBlock {
        let start = self.sprites.next_index();
        for _ in 0..count {
            self.add_sprite(template);
        }
        SpriteBlock { start, len: count }
    }

    #[inline]
    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id.0)
    }

    #[inline]
    pub fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.get_mut(id.0)
    }

    pub fn sprites(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.sprites.iter().map(|(i, s)| (SpriteId(i), s))
    }

    pub fn free_sprite(&mut self, id: SpriteId) -> Option<Sprite> {
        let sprite = self.sprites.take(id.0)?;
        self.tracker.free(ResourceKind::Sprite, id.0);
        Some(sprite)
    }

    pub fn add_line(&mut self, line: Line) -> LineId {
        let i = self.lines.push(line);
        self.tracker.alloc(ResourceKind::Line, i);
        LineId(i)
    }

    #[inline]
    pub fn line_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.lines.get_mut(id.0)
    }

    pub fn free_line(&mut self, id: LineId) -> Option<Line> {
        let line = self.lines.take(id.0)?;
        self.tracker.free(ResourceKind::Line, id.0);
        Some(line)
    }

    // ── animations & dynamics ─────────────────────────────────────────────

    /// Registers `animation` and shows its first frame on the driven sprite.
    pub fn add_animation(&mut self, animation: Animation) -> AnimationId {
        if let Some(sprite) = self.sprites.get_mut(animation.sprite().0) {
            animation.init(sprite);
        }
        let i = self.animations.push(animation);
        self.tracker.alloc(ResourceKind::Animation, i);
        AnimationId(i)
    }

    #[inline]
    pub fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(id.0)
    }

    #[inline]
    pub fn animation_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.animations.get_mut(id.0)
    }

    pub fn play_animation(&mut self, id: AnimationId, timer: &Timer) {
        let Some(animation) = self.animations.get_mut(id.0) else { return };
        let Some(sprite) = self.sprites.get_mut(animation.sprite().0) else { return };
        animation.play(sprite, timer);
    }

    /// `Animation::change` for two registered animations.
    pub fn change_animation(&mut self, from: AnimationId, to: AnimationId, timer: &Timer) -> bool {
        let Some((from, to)) = self.animations.pair_mut(from.0, to.0) else {
            return false;
        };
        let Some(sprite) = self.sprites.get_mut(to.sprite().0) else {
            return false;
        };
        from.change(to, sprite, timer)
    }

    pub fn free_animation(&mut self, id: AnimationId) -> Option<Animation> {
        let animation = self.animations.take(id.0)?;
        self.tracker.free(ResourceKind::Animation, id.0);
        Some(animation)
    }

    /// Attaches a motionless integrator to `sprite`.
    pub fn add_dynamic(&mut self, sprite: SpriteId, timer: &Timer) -> DynamicId {
        let i = self.dynamics.push(Dynamic::new(sprite, timer));
        self.tracker.alloc(ResourceKind::Dynamic, i);
        DynamicId(i)
    }

    #[inline]
    pub fn dynamic_mut(&mut self, id: DynamicId) -> Option<&mut Dynamic> {
        self.dynamics.get_mut(id.0)
    }

    pub fn free_dynamic(&mut self, id: DynamicId) -> Option<Dynamic> {
        let dynamic = self.dynamics.take(id.0)?;
        self.tracker.free(ResourceKind::Dynamic, id.0);
        Some(dynamic)
    }

    // ── texts & meshes ────────────────────────────────────────────────────

    pub fn add_text(&mut self, text: Text) -> TextId {
        let i = self.texts.push(text);
        self.tracker.alloc(ResourceKind::Text, i);
        TextId(i)
    }

    #[inline]
    pub fn text(&self, id: TextId) -> Option<&Text> {
        self.texts.get(id.0)
    }

    #[inline]
    pub fn text_mut(&mut self, id: TextId) -> Option<&mut Text> {
        self.texts.get_mut(id.0)
    }

    pub fn free_text(&mut self, id: TextId) -> Option<Text> {
        let text = self.texts.take(id.0)?;
        self.tracker.free(ResourceKind::Text, id.0);
        Some(text)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let i = self.meshes.push(mesh);
        self.tracker.alloc(ResourceKind::Mesh, i);
        MeshId(i)
    }

    #[inline]
    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0)
    }

    pub fn free_mesh(&mut self, renderer: &mut Renderer<'_>, id: MeshId) {
        if let Some(mesh) = self.meshes.take(id.0) {
            self.tracker.free(ResourceKind::Mesh, id.0);
            if let Err(e) = renderer.destroy_mesh(mesh) {
                log::warn!("{e}");
            }
        }
    }

    // ── routines ──────────────────────────────────────────────────────────

    fn queue_routine(
        &mut self,
        timer: &Timer,
        timeout: f32,
        interval: f32,
        duration: f32,
        once: bool,
        f: impl FnMut(&mut Registry, &Timer) -> RoutineControl + 'static,
    ) -> RoutineId {
        let id = RoutineId(self.next_routine);
        self.next_routine += 1;
        self.routines
            .push(Routine::new(id, timer, timeout, interval, duration, once, Box::new(f)));
        self.tracker.alloc(ResourceKind::Routine, id.0);
        id
    }

    /// Runs `f` once, on the first frame more than `delay` seconds from now.
    pub fn set_timeout(
        &mut self,
        timer: &Timer,
        delay: f32,
        f: impl FnMut(&mut Registry, &Timer) -> RoutineControl + 'static,
    ) -> RoutineId {
        self.queue_routine(timer, delay, 0.0, 0.0, true, f)
    }

    /// Runs `f` whenever more than `every` seconds passed since its last run.
    pub fn set_interval(
        &mut self,
        timer: &Timer,
        every: f32,
        f: impl FnMut(&mut Registry, &Timer) -> RoutineControl + 'static,
    ) -> RoutineId {
        self.queue_routine(timer, 0.0, every, 0.0, false, f)
    }

    /// Runs `f` every `interval` seconds, starting after `timeout` and stopping
    /// `duration` seconds from now (0 never stops).
    pub fn set_duration(
        &mut self,
        timer: &Timer,
        timeout: f32,
        interval: f32,
        duration: f32,
        f: impl FnMut(&mut Registry, &Timer) -> RoutineControl + 'static,
    ) -> RoutineId {
        self.queue_routine(timer, timeout, interval, duration, false, f)
    }

    /// Stops a routine. Works from inside another routine too; the cancelled
    /// routine does not run again once this returns `true`.
    pub fn cancel_routine(&mut self, id: RoutineId) -> bool {
        if self.routines.remove(id) {
            self.tracker.free(ResourceKind::Routine, id.0);
            return true;
        }
        // Not in the attached queue: it may sit in the queue being run.
        let tracked = self.tracker.contains(ResourceKind::Routine, id.0);
        if tracked && !self.pending_cancels.contains(&id) {
            self.pending_cancels.push(id);
            return true;
        }
        false
    }

    /// Consumes a cancellation recorded during a run.
    pub(crate) fn take_cancel(&mut self, id: RoutineId) -> bool {
        match self.pending_cancels.iter().position(|c| *c == id) {
            Some(i) => {
                self.pending_cancels.swap_remove(i);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn routines(&self) -> &RoutineQueue {
        &self.routines
    }

    // ── per-frame updates ─────────────────────────────────────────────────

    /// Runs due routines. Routines may freely use the registry, including queueing
    /// new routines; those first run on a later frame.
    pub fn update_routines(&mut self, timer: &Timer) {
        let mut queue = std::mem::take(&mut self.routines);
        let mut finished = queue.run(self, timer);
        let queued_meanwhile = std::mem::replace(&mut self.routines, queue);

        // Cancelled after the run had already passed them.
        for id in std::mem::take(&mut self.pending_cancels) {
            if self.routines.remove(id) {
                finished.push(id);
            }
        }
        self.routines.absorb(queued_meanwhile);

        for id in finished {
            self.tracker.free(ResourceKind::Routine, id.0);
        }
    }

    pub fn update_animations(&mut self, timer: &Timer) {
        for (_, animation) in self.animations.iter_mut() {
            if let Some(sprite) = self.sprites.get_mut(animation.sprite().0) {
                animation.update(sprite, timer);
            }
        }
    }

    pub fn update_dynamics(&mut self, timer: &Timer) {
        for (_, dynamic) in self.dynamics.iter_mut() {
            if let Some(sprite) = self.sprites.get_mut(dynamic.sprite().0) {
                dynamic.update(sprite, timer);
            }
        }
    }

    /// Draws every sprite, then every text's glyphs, then every line.
    pub fn draw(&self, renderer: &mut Renderer<'_>) {
        for (_, sprite) in self.sprites.iter() {
            renderer.draw_sprite(sprite);
        }
        for (_, text) in self.texts.iter() {
            renderer.draw_sprites(text.sprites());
        }
        for (_, line) in self.lines.iter() {
            renderer.draw_line(line);
        }
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    /// Releases every resource: routines, texts, dynamics, animations, lines,
    /// sprites, meshes (GPU), fonts, textures (GPU).
    pub fn free_all(&mut self, renderer: &mut Renderer<'_>) {
        self.pending_cancels.clear();
        for id in self.routines.clear() {
            self.tracker.free(ResourceKind::Routine, id.0);
        }
        let texts = self.texts.drain();
        self.untrack(ResourceKind::Text, texts);
        let dynamics = self.dynamics.drain();
        self.untrack(ResourceKind::Dynamic, dynamics);
        let animations = self.animations.drain();
        self.untrack(ResourceKind::Animation, animations);
        let lines = self.lines.drain();
        self.untrack(ResourceKind::Line, lines);
        let sprites = self.sprites.drain();
        self.untrack(ResourceKind::Sprite, sprites);

        for (i, mesh) in self.meshes.drain() {
            self.tracker.free(ResourceKind::Mesh, i);
            if let Err(e) = renderer.destroy_mesh(mesh) {
                log::warn!("{e}");
            }
        }

        let fonts = self.fonts.drain();
        self.untrack(ResourceKind::Font, fonts);

        for (i, texture) in self.textures.drain() {
            self.tracker.free(ResourceKind::Texture, i);
            if let Err(e) = renderer.destroy_texture(texture) {
                log::warn!("{e}");
            }
        }

        log::debug!("registry released {} allocations", self.tracker.total());
    }

    fn untrack<T>(&mut self, kind: ResourceKind, drained: Vec<(usize, T)>) {
        for (i, _) in drained {
            self.tracker.free(kind, i);
        }
    }

    /// Logs and returns everything still allocated.
    pub fn report_leaks(&self) -> Vec<Allocation> {
        self.tracker.report()
    }

    #[inline]
    pub fn tracker(&self) -> &LeakTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Color, UvRect, Vec3};
    use crate::mesh::Vertex;
    use crate::render::BackendCall;

    fn frames() -> Vec<UvRect> {
        vec![UvRect::new(0.0, 0.0, 0.5, 1.0), UvRect::new(0.5, 0.0, 1.0, 1.0)]
    }

    #[test]
    fn free_all_releases_everything_gpu_last() {
        let (mut r, log) = Renderer::headless(64, 64);
        let mut reg = Registry::new();
        let timer = Timer::new();

        let tex = r.create_texture_from_bytes(1, 1, &[255; 4]).unwrap();
        let slot = reg.add_texture(tex);
        assert_eq!(reg.texture(slot).map(|t| t.index), Some(0));

        let sprite = reg.add_sprite(Sprite::new(Some(tex.id)));
        reg.add_sprites(3, Sprite::default());
        reg.add_animation(Animation::new(sprite, frames(), 0.1).unwrap());
        reg.add_dynamic(sprite, &timer);
        reg.add_line(Line::new(Vec3::ZERO, Vec3::ONE, Color::WHITE));
        let verts = [Vertex::default(); 3];
        let mesh = r.create_mesh(&verts, None, Some(tex.id)).unwrap();
        reg.add_mesh(mesh);
        reg.set_interval(&timer, 1.0, |_, _| RoutineControl::Continue);

        assert_eq!(reg.tracker().live(), 10);
        log.take();

        reg.free_all(&mut r);
        assert!(reg.report_leaks().is_empty());
        assert!(log.live_textures().is_empty());
        assert!(log.live_buffers().is_empty());

        // Mesh buffers go before the texture they sample.
        let calls = log.calls();
        let buffer_at = calls
            .iter()
            .position(|c| matches!(c, BackendCall::DestroyBuffer(_)))
            .unwrap();
        let texture_at = calls
            .iter()
            .position(|c| matches!(c, BackendCall::DestroyTexture(_)))
            .unwrap();
        assert!(buffer_at < texture_at);
    }

    #[test]
    fn unfreed_handles_are_reported() {
        let mut reg = Registry::new();
        let ids: Vec<_> = (0..5).map(|_| reg.add_sprite(Sprite::default())).collect();
        for id in &ids[..3] {
            reg.free_sprite(*id);
        }
        let leaks = reg.report_leaks();
        assert_eq!(leaks.len(), 2);
        assert!(leaks.iter().all(|a| a.kind == ResourceKind::Sprite));
        assert!(reg.sprite(ids[0]).is_none());
        assert!(reg.sprite(ids[4]).is_some());
    }

    #[test]
    fn sprite_blocks_are_contiguous() {
        let mut reg = Registry::new();
        reg.add_sprite(Sprite::default());
        let block = reg.add_sprites(4, Sprite::default());
        let ids: Vec<_> = block.iter().map(|id| id.index()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(block.get(4), None);
    }

    #[test]
    fn animations_drive_their_sprite() {
        let mut reg = Registry::new();
        let mut timer = Timer::new();
        let sprite = reg.add_sprite(Sprite::default());

        let idle = reg.add_animation(Animation::new(sprite, frames(), 0.1).unwrap());
        assert_eq!(reg.sprite(sprite).map(|s| s.uv()), Some(frames()[0]));

        let walk = reg.add_animation(Animation::new(sprite, frames(), 0.1).unwrap());
        reg.play_animation(idle, &timer);

        timer.advance_to(0.15);
        reg.update_animations(&timer);
        assert_eq!(reg.sprite(sprite).map(|s| s.uv()), Some(frames()[1]));

        assert!(reg.change_animation(idle, walk, &timer));
        assert!(!reg.animation(idle).unwrap().is_playing());
        assert!(reg.animation(walk).unwrap().is_playing());
        assert!(!reg.change_animation(idle, walk, &timer));
        assert!(!reg.change_animation(walk, walk, &timer));
    }

    #[test]
    fn dynamics_move_their_sprite() {
        let mut reg = Registry::new();
        let mut timer = Timer::new();
        let sprite = reg.add_sprite(Sprite::default());
        let d = reg.add_dynamic(sprite, &timer);
        reg.dynamic_mut(d).unwrap().velocity.x = 2.0;

        timer.advance_to(0.5);
        reg.update_dynamics(&timer);
        assert_eq!(reg.sprite(sprite).map(|s| s.x), Some(1.0));
    }

    #[test]
    fn draw_covers_sprites_text_and_lines() {
        let (mut r, log) = Renderer::headless(64, 64);
        let mut reg = Registry::new();
        reg.add_sprite(Sprite::default());
        reg.add_line(Line::new(Vec3::ZERO, Vec3::ONE, Color::WHITE));

        let tex = r.create_texture_from_bytes(1, 1, &[255; 4]).unwrap();
        let font = Rc::new(Font::from_table(Some(tex), [UvRect::FULL; 256]));
        let id = reg.add_font(font.clone());
        assert!(reg.font(id).is_some());
        reg.add_text(Text::new(font, 4, "hi").unwrap());

        reg.draw(&mut r);
        // One sprite, two visible glyphs, one line.
        assert_eq!(log.count(|c| matches!(c, BackendCall::Draw { .. })), 4);
    }
}
