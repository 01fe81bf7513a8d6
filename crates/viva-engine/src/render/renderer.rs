use std::collections::HashSet;
use std::path::Path;

use crate::coords::{Color, Vec2, Viewport};
use crate::mesh::{Mesh, MeshFlags, Vertex};
use crate::sprite::{Line, Sprite, SpriteFlags, SpriteTexture};
use crate::texture::{decode_file, decode_memory, Texture, TextureError};

use super::backend::{
    BufferId, ConstantBuffer, FrameStatus, GpuBackend, RasterMode, TextureFilter, TextureId,
    Topology, VertexShader, VertexSource,
};
use super::camera::{Camera, Camera3D};
use super::error::RenderError;
use super::headless::{HeadlessBackend, HeadlessLog};
use super::uniforms::{PixelFlags, TransformUniform};

/// Renderer construction options.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub clear_color: Color,
    /// Maximum vertices accepted by one `draw_mesh_dynamic` call.
    pub dynamic_vertex_capacity: usize,
    pub filter: TextureFilter,
    pub raster: RasterMode,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::SLATE,
            dynamic_vertex_capacity: 15_000,
            filter: TextureFilter::Point,
            raster: RasterMode::Solid,
        }
    }
}

/// Which vertex shader path (and slot layout) is currently bound.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PipelineMode {
    Sprite,
    Mesh,
}

/// Immediate-mode sprite, line and mesh renderer.
///
/// Every draw uploads its record into a constant buffer and issues one draw call.
/// The vertex shader path is switched lazily: consecutive draws of the same kind
/// never rebind.
pub struct Renderer<'w> {
    backend: Box<dyn GpuBackend + 'w>,
    config: RendererConfig,
    mode: PipelineMode,

    /// 2D camera, uploaded by `begin_scene` (or `update_camera`).
    pub camera: Camera,
    camera3d: Option<Camera3D>,
    clear_color: Color,

    live_textures: HashSet<TextureId>,
    live_buffers: HashSet<BufferId>,
}

impl<'w> Renderer<'w> {
    pub fn new(mut backend: Box<dyn GpuBackend + 'w>, config: RendererConfig) -> Self {
        let viewport = backend.viewport();

        backend.set_raster(config.raster);
        backend.set_filter(config.filter);
        backend.set_blend(false);

        let mut renderer = Self {
            backend,
            clear_color: config.clear_color,
            config,
            mode: PipelineMode::Sprite,
            camera: Camera::new(viewport.aspect_ratio()),
            camera3d: None,
            live_textures: HashSet::new(),
            live_buffers: HashSet::new(),
        };
        renderer.bind_mode(PipelineMode::Sprite);
        renderer
    }

    // ── state ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.backend.viewport()
    }

    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    #[inline]
    pub fn camera3d(&self) -> Option<&Camera3D> {
        self.camera3d.as_ref()
    }

    /// Sets the mesh camera. With `None`, meshes are viewed through `Camera3D::new`.
    pub fn set_camera3d(&mut self, camera: Option<Camera3D>) {
        self.camera3d = camera;
    }

    /// Resizes the backend surface and follows the new aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.resize(width, height);
        let viewport = self.backend.viewport();
        if viewport.is_valid() {
            self.camera.aspect_ratio = viewport.aspect_ratio();
            if let Some(cam) = self.camera3d.as_mut() {
                cam.aspect_ratio = viewport.aspect_ratio();
            }
        }
    }

    pub fn set_wireframe(&mut self) {
        self.backend.set_raster(RasterMode::Wireframe);
    }

    pub fn set_solid(&mut self) {
        self.backend.set_raster(RasterMode::Solid);
    }

    pub fn enable_blend(&mut self) {
        self.backend.set_blend(true);
    }

    pub fn disable_blend(&mut self) {
        self.backend.set_blend(false);
    }

    pub fn set_filter(&mut self, filter: TextureFilter) {
        self.backend.set_filter(filter);
    }

    /// Clears the depth buffer; later draws are not occluded by earlier ones.
    pub fn clear_depth(&mut self) {
        self.backend.clear_depth();
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Clears the target and uploads both cameras.
    pub fn begin_scene(&mut self) {
        self.backend.begin_frame(self.clear_color);
        self.update_camera();
    }

    /// Re-uploads the cameras so that later draws in this frame observe changes.
    pub fn update_camera(&mut self) {
        let cam = self.camera.to_uniform();
        self.backend
            .update_constant_buffer(ConstantBuffer::Camera, bytemuck::bytes_of(&cam));

        let cam3d = self
            .camera3d
            .unwrap_or_else(|| Camera3D::new(self.camera.aspect_ratio))
            .to_uniform();
        self.backend
            .update_constant_buffer(ConstantBuffer::MeshView, bytemuck::bytes_of(&cam3d));
    }

    pub fn end_scene(&mut self) -> FrameStatus {
        let status = self.backend.present();
        if status == FrameStatus::Fatal {
            log::error!("presenting failed; the device cannot continue");
        }
        status
    }

    // ── drawing ───────────────────────────────────────────────────────────

    fn bind_mode(&mut self, mode: PipelineMode) {
        match mode {
            PipelineMode::Sprite => {
                self.backend.set_vertex_shader(VertexShader::Sprite);
                self.backend.bind_constant_buffer(0, ConstantBuffer::Sprite);
                self.backend.bind_constant_buffer(1, ConstantBuffer::Camera);
            }
            PipelineMode::Mesh => {
                self.backend.set_vertex_shader(VertexShader::Mesh);
                self.backend.bind_constant_buffer(0, ConstantBuffer::MeshWorld);
                self.backend.bind_constant_buffer(1, ConstantBuffer::MeshView);
                self.backend.bind_constant_buffer(2, ConstantBuffer::MeshTransform);
            }
        }
        self.mode = mode;
    }

    fn ensure_mode(&mut self, mode: PipelineMode) {
        if self.mode != mode {
            self.bind_mode(mode);
        }
    }

    fn upload_pixel_flags(&mut self, notexture: bool) {
        let flags = PixelFlags::new(notexture);
        self.backend
            .update_constant_buffer(ConstantBuffer::PixelFlags, bytemuck::bytes_of(&flags));
    }

    /// Draws one sprite. `nodraw` and `Untextured` sprites are skipped.
    pub fn draw_sprite(&mut self, sprite: &Sprite) {
        if !sprite.is_drawable() {
            return;
        }
        self.ensure_mode(PipelineMode::Sprite);

        if let SpriteTexture::Textured(id) = sprite.texture {
            self.backend.bind_texture(id);
        }

        let uniform = sprite.to_uniform();
        self.backend
            .update_constant_buffer(ConstantBuffer::Sprite, bytemuck::bytes_of(&uniform));
        self.upload_pixel_flags(uniform.flags & SpriteFlags::NOTEXTURE != 0);
        self.backend
            .draw(Topology::Triangles, VertexSource::Generated, 6);
    }

    pub fn draw_sprites<'a>(&mut self, sprites: impl IntoIterator<Item = &'a Sprite>) {
        for sprite in sprites {
            self.draw_sprite(sprite);
        }
    }

    pub fn draw_line(&mut self, line: &Line) {
        if line.nodraw {
            return;
        }
        self.ensure_mode(PipelineMode::Sprite);

        let uniform = line.to_uniform();
        self.backend
            .update_constant_buffer(ConstantBuffer::Sprite, bytemuck::bytes_of(&uniform));
        self.upload_pixel_flags(true);
        self.backend.draw(Topology::Lines, VertexSource::Generated, 2);
    }

    /// Draws a mesh created by `create_mesh`.
    ///
    /// With `transform`, the matrix is applied to the raw vertex positions instead of
    /// the mesh's pos/rot/scale and the 3D camera. `APPLY_TRANSFORM` in `mesh.data` is
    /// updated to match either way.
    pub fn draw_mesh(&mut self, mesh: &mut Mesh, transform: Option<&glam::Mat4>) {
        let Some(vertices) = mesh.vertex_buffer else {
            log::warn!("draw_mesh on a mesh without a vertex buffer");
            return;
        };
        self.ensure_mode(PipelineMode::Mesh);

        mesh.data &= !MeshFlags::DYNAMIC_VERTICES;
        match transform {
            Some(m) => {
                mesh.data |= MeshFlags::APPLY_TRANSFORM;
                let t = TransformUniform::from(m);
                self.backend.update_constant_buffer(
                    ConstantBuffer::MeshTransform,
                    bytemuck::bytes_of(&t),
                );
            }
            None => mesh.data &= !MeshFlags::APPLY_TRANSFORM,
        }

        self.upload_mesh(mesh);

        match mesh.index_buffer {
            Some(indices) => self
                .backend
                .draw_indexed(vertices, indices, mesh.index_count),
            None => self.backend.draw(
                Topology::Triangles,
                VertexSource::Buffer(vertices),
                mesh.vertex_count,
            ),
        }
    }

    /// Draws `vertices` through the shared dynamic buffer.
    ///
    /// Positions are taken as clip-space and colors come from each vertex.
    pub fn draw_mesh_dynamic(
        &mut self,
        mesh: &mut Mesh,
        vertices: &[Vertex],
    ) -> Result<(), RenderError> {
        let capacity = self.config.dynamic_vertex_capacity;
        if vertices.len() > capacity {
            return Err(RenderError::DynamicOverflow {
                requested: vertices.len(),
                capacity,
            });
        }
        if vertices.is_empty() {
            return Ok(());
        }
        self.ensure_mode(PipelineMode::Mesh);

        self.backend.write_dynamic_vertices(vertices);
        mesh.data &= !MeshFlags::APPLY_TRANSFORM;
        mesh.data |= MeshFlags::DYNAMIC_VERTICES;
        self.upload_mesh(mesh);

        self.backend.draw(
            Topology::Triangles,
            VertexSource::Dynamic,
            vertices.len() as u32,
        );
        Ok(())
    }

    fn upload_mesh(&mut self, mesh: &Mesh) {
        if let Some(id) = mesh.texture {
            self.backend.bind_texture(id);
        }
        let world = mesh.to_uniform();
        self.backend
            .update_constant_buffer(ConstantBuffer::MeshWorld, bytemuck::bytes_of(&world));
        self.upload_pixel_flags(mesh.texture.is_none());
    }

    // ── resources ─────────────────────────────────────────────────────────

    /// Uploads tightly packed RGBA8 pixels.
    pub fn create_texture_from_bytes(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Texture, TextureError> {
        let id = self.backend.create_texture(width, height, rgba)?;
        self.live_textures.insert(id);
        log::debug!("texture {id} created ({width}x{height})");
        Ok(Texture {
            id,
            width,
            height,
            index: 0,
        })
    }

    /// Decodes an encoded image (png, jpeg, bmp) and uploads it.
    pub fn create_texture_from_memory(&mut self, bytes: &[u8]) -> Result<Texture, TextureError> {
        let img = decode_memory(bytes)?;
        self.create_texture_from_bytes(img.width, img.height, &img.rgba)
    }

    pub fn create_texture_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Texture, TextureError> {
        let img = decode_file(path)?;
        self.create_texture_from_bytes(img.width, img.height, &img.rgba)
    }

    /// Releases the GPU texture. Destroying the same texture twice is an error.
    pub fn destroy_texture(&mut self, texture: Texture) -> Result<(), RenderError> {
        if !self.live_textures.remove(&texture.id) {
            return Err(RenderError::UnknownTexture(texture.id));
        }
        self.backend.destroy_texture(texture.id);
        log::debug!("texture {} destroyed", texture.id);
        Ok(())
    }

    /// Uploads vertices (and optional indices) into GPU buffers owned by the mesh.
    ///
    /// Empty vertex or index data is rejected; GPU buffers cannot be empty.
    pub fn create_mesh(
        &mut self,
        vertices: &[Vertex],
        indices: Option<&[u32]>,
        texture: Option<TextureId>,
    ) -> Result<Mesh, RenderError> {
        if vertices.is_empty() || indices.is_some_and(<[u32]>::is_empty) {
            return Err(RenderError::EmptyMesh {
                vertices: vertices.len(),
                indices: indices.map(<[u32]>::len),
            });
        }

        let vb = self.backend.create_vertex_buffer(vertices);
        self.live_buffers.insert(vb);

        let ib = indices.map(|idx| {
            let ib = self.backend.create_index_buffer(idx);
            self.live_buffers.insert(ib);
            ib
        });
        let index_count = indices.map_or(0, |i| i.len() as u32);

        log::debug!(
            "mesh created ({} vertices, {index_count} indices)",
            vertices.len()
        );
        Ok(Mesh::with_buffers(
            Some(vb),
            vertices.len() as u32,
            ib,
            index_count,
            texture,
        ))
    }

    /// Releases the mesh's GPU buffers. The mesh texture is not touched.
    ///
    /// Every live buffer is released even when another one is unknown; the first
    /// unknown buffer is reported.
    pub fn destroy_mesh(&mut self, mesh: Mesh) -> Result<(), RenderError> {
        let mut result = Ok(());
        for id in [mesh.vertex_buffer, mesh.index_buffer].into_iter().flatten() {
            if self.live_buffers.remove(&id) {
                self.backend.destroy_buffer(id);
            } else if result.is_ok() {
                result = Err(RenderError::UnknownBuffer(id));
            }
        }
        result
    }

    // ── pixel helpers ─────────────────────────────────────────────────────

    /// World units per physical pixel at the current camera scale.
    pub fn pixel_scale(&self) -> Vec2 {
        let vp = self.viewport();
        Vec2::new(
            2.0 / vp.width / self.camera.scale * self.camera.aspect_ratio,
            2.0 / vp.height / self.camera.scale,
        )
    }

    /// Sizes `sprite` to `width` x `height` pixels on screen.
    pub fn set_pixel_scale(&self, sprite: &mut Sprite, width: f32, height: f32) {
        let unit = self.pixel_scale();
        sprite.sx = unit.x * width;
        sprite.sy = unit.y * height;
    }

    /// Centres `sprite` on the pixel `(px, py)` (top-left origin).
    pub fn set_screen_pos(&self, sprite: &mut Sprite, px: f32, py: f32) {
        let p = self.screen_to_world(px, py);
        sprite.x = p.x;
        sprite.y = p.y;
    }

    /// Like `set_pixel_scale`, ignoring the camera zoom.
    pub fn set_pixel_scale_fixed(&self, sprite: &mut Sprite, width: f32, height: f32) {
        let vp = self.viewport();
        sprite.sx = 2.0 * width / vp.height;
        sprite.sy = 2.0 * height / vp.height;
    }

    /// Like `set_screen_pos`, ignoring the camera position and zoom.
    pub fn set_screen_pos_fixed(&self, sprite: &mut Sprite, px: f32, py: f32) {
        let vp = self.viewport();
        sprite.x = 2.0 / vp.width * (px - vp.width / 2.0) * vp.aspect_ratio();
        sprite.y = 2.0 / vp.height * (py - vp.height / 2.0);
    }

    /// Sprite world position under the pixel `(px, py)`.
    pub fn screen_to_world(&self, px: f32, py: f32) -> Vec2 {
        let vp = self.viewport();
        let cam = &self.camera;
        Vec2::new(
            (px - vp.width / 2.0) / vp.width / cam.scale * cam.aspect_ratio * 2.0 + cam.x,
            (py - vp.height / 2.0) / vp.height / cam.scale * 2.0 + cam.y,
        )
    }
}

impl Renderer<'static> {
    /// A renderer over a recording backend, plus the handle to read the recording.
    pub fn headless(width: u32, height: u32) -> (Self, HeadlessLog) {
        let backend = HeadlessBackend::new(width, height);
        let log = backend.log();
        (
            Renderer::new(Box::new(backend), RendererConfig::default()),
            log,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec3;
    use crate::render::headless::BackendCall;
    use crate::render::uniforms::{MeshWorldUniform, SpriteUniform};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn quad() -> Vec<Vertex> {
        vec![
            Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0], [1.0; 4]),
            Vertex::new([1.0, 0.0, 0.0], [1.0, 0.0], [1.0; 4]),
            Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0], [1.0; 4]),
        ]
    }

    #[test]
    fn sprite_frame_uploads_exact_record() {
        let (mut r, log) = Renderer::headless(800, 600);
        let tex = r.create_texture_from_bytes(2, 2, &[255; 16]).unwrap();

        let mut s = Sprite::new(Some(tex.id));
        s.x = 0.5;
        s.rot = 0.25;
        s.set_uv(crate::coords::UvRect::new(0.0, 0.0, 0.5, 0.5));

        r.begin_scene();
        r.draw_sprite(&s);
        assert_eq!(r.end_scene(), FrameStatus::Presented);

        let uploads = log.uploads(ConstantBuffer::Sprite);
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].len(), size_of::<SpriteUniform>());
        let u: SpriteUniform = bytemuck::pod_read_unaligned(&uploads[0]);
        assert_eq!(u, s.to_uniform());

        let calls = log.calls();
        assert!(calls.contains(&BackendCall::BindTexture(tex.id)));
        assert!(calls.contains(&BackendCall::Draw {
            topology: Topology::Triangles,
            source: VertexSource::Generated,
            vertex_count: 6,
        }));
        assert_eq!(calls.last(), Some(&BackendCall::Present));
    }

    #[test]
    fn begin_scene_clears_and_uploads_camera() {
        let (mut r, log) = Renderer::headless(200, 100);
        assert!(close(r.camera.aspect_ratio, 2.0));
        r.camera.x = 3.0;
        r.begin_scene();

        assert!(log.calls().contains(&BackendCall::BeginFrame(Color::SLATE)));
        let cams = log.uploads(ConstantBuffer::Camera);
        let cam: crate::render::uniforms::CameraUniform = bytemuck::pod_read_unaligned(&cams[0]);
        assert_eq!(cam.x, 3.0);
        assert_eq!(cam.aspect_ratio, 2.0);
    }

    #[test]
    fn hidden_and_untextured_sprites_are_skipped() {
        let (mut r, log) = Renderer::headless(100, 100);
        let mut hidden = Sprite::new(None);
        hidden.nodraw = true;
        let mut untextured = Sprite::new(None);
        untextured.texture = SpriteTexture::Untextured;

        r.draw_sprite(&hidden);
        r.draw_sprite(&untextured);
        assert_eq!(log.count(|c| matches!(c, BackendCall::Draw { .. })), 0);
    }

    #[test]
    fn solid_color_sprite_sets_notexture() {
        let (mut r, log) = Renderer::headless(100, 100);
        r.draw_sprite(&Sprite::new(None));

        let flags = log.uploads(ConstantBuffer::PixelFlags);
        let f: PixelFlags = bytemuck::pod_read_unaligned(&flags[0]);
        assert_eq!(f.notexture, 1);
        assert_eq!(log.count(|c| matches!(c, BackendCall::BindTexture(_))), 0);
    }

    #[test]
    fn interleaved_draws_rebind_once_per_transition() {
        let (mut r, log) = Renderer::headless(100, 100);
        let mut mesh = r.create_mesh(&quad(), None, None).unwrap();
        let sprite = Sprite::new(None);
        log.take();

        r.draw_sprite(&sprite);
        r.draw_mesh(&mut mesh, None);
        r.draw_sprite(&sprite);
        r.draw_mesh(&mut mesh, None);

        let shaders = log.count(|c| matches!(c, BackendCall::SetVertexShader(_)));
        assert_eq!(shaders, 3);
        assert_eq!(r.mode(), PipelineMode::Mesh);
    }

    #[test]
    fn batched_draws_bind_once() {
        let (mut r, log) = Renderer::headless(100, 100);
        let mut mesh = r.create_mesh(&quad(), None, None).unwrap();
        let sprite = Sprite::new(None);
        log.take();

        for _ in 0..3 {
            r.draw_sprite(&sprite);
        }
        for _ in 0..3 {
            r.draw_mesh(&mut mesh, None);
        }

        let calls = log.calls();
        let shaders: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c, BackendCall::SetVertexShader(_)))
            .collect();
        assert_eq!(shaders, vec![&BackendCall::SetVertexShader(VertexShader::Mesh)]);
        assert!(calls.contains(&BackendCall::BindConstantBuffer {
            slot: 2,
            buffer: ConstantBuffer::MeshTransform,
        }));
    }

    #[test]
    fn draw_mesh_toggles_apply_transform() {
        let (mut r, log) = Renderer::headless(100, 100);
        let mut mesh = r.create_mesh(&quad(), Some(&[0, 1, 2]), None).unwrap();

        let m = glam::Mat4::from_translation(glam::Vec3::new(1.0, 0.0, 0.0));
        r.draw_mesh(&mut mesh, Some(&m));
        assert_ne!(mesh.data & MeshFlags::APPLY_TRANSFORM, 0);

        r.draw_mesh(&mut mesh, None);
        assert_eq!(mesh.data & MeshFlags::APPLY_TRANSFORM, 0);

        let worlds = log.uploads(ConstantBuffer::MeshWorld);
        let first: MeshWorldUniform = bytemuck::pod_read_unaligned(&worlds[0]);
        let second: MeshWorldUniform = bytemuck::pod_read_unaligned(&worlds[1]);
        assert_eq!(first.data, MeshFlags::APPLY_TRANSFORM);
        assert_eq!(second.data, 0);

        let transforms = log.uploads(ConstantBuffer::MeshTransform);
        assert_eq!(transforms.len(), 1);
        let t: TransformUniform = bytemuck::pod_read_unaligned(&transforms[0]);
        assert_eq!(t.cols[3], [1.0, 0.0, 0.0, 1.0]);

        assert_eq!(
            log.count(|c| matches!(c, BackendCall::DrawIndexed { index_count: 3, .. })),
            2
        );
    }

    #[test]
    fn dynamic_draw_respects_capacity() {
        let (mut r, log) = Renderer::headless(100, 100);
        let mut mesh = Mesh::dynamic(None);

        let too_many = vec![Vertex::default(); 15_001];
        assert_eq!(
            r.draw_mesh_dynamic(&mut mesh, &too_many),
            Err(RenderError::DynamicOverflow {
                requested: 15_001,
                capacity: 15_000
            })
        );
        assert_eq!(log.count(|c| matches!(c, BackendCall::Draw { .. })), 0);

        r.draw_mesh_dynamic(&mut mesh, &quad()).unwrap();
        assert_ne!(mesh.data & MeshFlags::DYNAMIC_VERTICES, 0);
        assert!(log.calls().contains(&BackendCall::Draw {
            topology: Topology::Triangles,
            source: VertexSource::Dynamic,
            vertex_count: 3,
        }));
    }

    #[test]
    fn lines_draw_two_vertices() {
        let (mut r, log) = Renderer::headless(100, 100);
        r.draw_line(&Line::new(Vec3::ZERO, Vec3::ONE, Color::WHITE));
        assert!(log.calls().contains(&BackendCall::Draw {
            topology: Topology::Lines,
            source: VertexSource::Generated,
            vertex_count: 2,
        }));
    }

    #[test]
    fn resources_cannot_be_released_twice() {
        let (mut r, log) = Renderer::headless(100, 100);
        let tex = r.create_texture_from_bytes(1, 1, &[0; 4]).unwrap();
        let mesh = r.create_mesh(&quad(), Some(&[0, 1, 2]), Some(tex.id)).unwrap();

        r.destroy_mesh(mesh.clone()).unwrap();
        assert!(matches!(r.destroy_mesh(mesh), Err(RenderError::UnknownBuffer(_))));

        r.destroy_texture(tex).unwrap();
        assert_eq!(r.destroy_texture(tex), Err(RenderError::UnknownTexture(tex.id)));

        assert!(log.live_textures().is_empty());
        assert!(log.live_buffers().is_empty());
    }

    #[test]
    fn empty_meshes_are_rejected_before_upload() {
        let (mut r, log) = Renderer::headless(100, 100);

        assert_eq!(
            r.create_mesh(&[], None, None).unwrap_err(),
            RenderError::EmptyMesh {
                vertices: 0,
                indices: None
            }
        );
        assert_eq!(
            r.create_mesh(&quad(), Some(&[]), None).unwrap_err(),
            RenderError::EmptyMesh {
                vertices: 3,
                indices: Some(0)
            }
        );
        assert!(log.live_buffers().is_empty());
    }

    #[test]
    fn destroy_mesh_releases_what_it_can() {
        let (mut r, log) = Renderer::headless(100, 100);
        let mesh = r.create_mesh(&quad(), Some(&[0, 1, 2]), None).unwrap();
        let vb = mesh.vertex_buffer.unwrap();

        // The vertex buffer is already gone; the index buffer must still be freed.
        let mut vertex_only = mesh.clone();
        vertex_only.index_buffer = None;
        r.destroy_mesh(vertex_only).unwrap();

        assert_eq!(r.destroy_mesh(mesh), Err(RenderError::UnknownBuffer(vb)));
        assert!(log.live_buffers().is_empty());
    }

    #[test]
    fn dynamic_draw_binds_every_mesh_slot() {
        let (mut r, log) = Renderer::headless(100, 100);
        let mut dynamic = Mesh::dynamic(None);
        let mut mesh = r.create_mesh(&quad(), None, None).unwrap();
        r.draw_sprite(&Sprite::new(None));
        log.take();

        r.draw_mesh_dynamic(&mut dynamic, &quad()).unwrap();
        r.draw_mesh(&mut mesh, None);

        let calls = log.calls();
        for (slot, buffer) in [
            (0, ConstantBuffer::MeshWorld),
            (1, ConstantBuffer::MeshView),
            (2, ConstantBuffer::MeshTransform),
        ] {
            assert!(calls.contains(&BackendCall::BindConstantBuffer { slot, buffer }));
        }
        assert_eq!(log.count(|c| matches!(c, BackendCall::SetVertexShader(_))), 1);
    }

    #[test]
    fn bad_pixels_surface_as_texture_error() {
        let (mut r, _log) = Renderer::headless(100, 100);
        let err = r.create_texture_from_bytes(2, 2, &[0; 3]).unwrap_err();
        assert!(matches!(
            err,
            TextureError::Render(RenderError::TextureSizeMismatch { expected: 16, actual: 3 })
        ));
    }

    #[test]
    fn pixel_helpers_invert_the_sprite_transform() {
        let (mut r, _log) = Renderer::headless(800, 400);
        r.camera.scale = 2.0;
        r.camera.x = 1.0;

        let mut s = Sprite::new(None);
        r.set_screen_pos(&mut s, 600.0, 100.0);
        r.set_pixel_scale(&mut s, 40.0, 20.0);

        // Centre lands on the requested pixel.
        let clip = s.project(&r.camera, Vec2::ZERO);
        assert!(close((clip.x + 1.0) * 400.0, 600.0));
        assert!(close((1.0 - clip.y) * 200.0, 100.0));

        // Edges are 40 x 20 pixels apart.
        let right = s.project(&r.camera, Vec2::new(0.5, 0.0));
        let left = s.project(&r.camera, Vec2::new(-0.5, 0.0));
        assert!(close((right.x - left.x) * 400.0, 40.0));
        let top = s.project(&r.camera, Vec2::new(0.0, 0.5));
        let bottom = s.project(&r.camera, Vec2::new(0.0, -0.5));
        assert!(close((top.y - bottom.y) * 200.0, 20.0));
    }

    #[test]
    fn fixed_helpers_ignore_the_camera() {
        let (mut r, _log) = Renderer::headless(800, 400);
        r.camera.scale = 3.0;
        r.camera.x = 5.0;

        let mut s = Sprite::new(None);
        r.set_screen_pos_fixed(&mut s, 800.0, 0.0);
        r.set_pixel_scale_fixed(&mut s, 400.0, 400.0);
        assert!(close(s.x, 2.0));
        assert!(close(s.y, -1.0));
        assert!(close(s.sx, 2.0));
        assert!(close(s.sy, 2.0));
    }

    #[test]
    fn resize_tracks_aspect_ratio() {
        let (mut r, _log) = Renderer::headless(100, 100);
        r.set_camera3d(Some(Camera3D::new(1.0)));
        r.resize(300, 100);
        assert!(close(r.camera.aspect_ratio, 3.0));
        assert!(r.camera3d().is_some_and(|c| close(c.aspect_ratio, 3.0)));
    }
}
