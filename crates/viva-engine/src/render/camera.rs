use crate::coords::Vec3;

use super::uniforms::{Camera3DUniform, CameraUniform};

/// 2D camera for the sprite path.
///
/// The camera translates to `(-x, y)` first and then scales, so zooming always
/// centres on the middle of the screen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Window width over height.
    pub aspect_ratio: f32,
    pub x: f32,
    pub y: f32,
    /// Uploaded with the camera block; the sprite shader does not apply it.
    pub rotation: f32,
    /// Zoom; larger values magnify.
    pub scale: f32,
}

impl Camera {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            aspect_ratio,
            ..Self::default()
        }
    }

    /// `Scale(scale / aspect, scale) * Translation(-x, y)`.
    pub fn matrix(&self) -> glam::Mat4 {
        let s = glam::Mat4::from_scale(glam::Vec3::new(
            self.scale / self.aspect_ratio,
            self.scale,
            1.0,
        ));
        let t = glam::Mat4::from_translation(glam::Vec3::new(-self.x, self.y, 0.0));
        s * t
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            aspect_ratio: self.aspect_ratio,
            x: self.x,
            y: self.y,
            rotation: self.rotation,
            scale: self.scale,
            _pad: [0.0; 3],
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

/// Left-handed perspective camera for the mesh path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera3D {
    pub aspect_ratio: f32,
    /// Vertical field of view in radians.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    pub eye: Vec3,
    pub at: Vec3,
    pub up: Vec3,
}

impl Camera3D {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            aspect_ratio,
            fovy: std::f32::consts::FRAC_PI_4,
            znear: 0.1,
            zfar: 1000.0,
            eye: Vec3::new(0.0, 0.0, -5.0),
            at: Vec3::ZERO,
            up: Vec3::new(0.0, 1.0, 0.0),
        }
    }

    /// The view-projection the mesh shader builds from this block.
    pub fn view_projection(&self) -> glam::Mat4 {
        let view = glam::Mat4::look_at_lh(self.eye.to_glam(), self.at.to_glam(), self.up.to_glam());
        let proj = glam::Mat4::perspective_lh(self.fovy, self.aspect_ratio, self.znear, self.zfar);
        proj * view
    }

    pub fn to_uniform(&self) -> Camera3DUniform {
        Camera3DUniform {
            aspect_ratio: self.aspect_ratio,
            fovy: self.fovy,
            znear: self.znear,
            zfar: self.zfar,
            eye: [self.eye.x, self.eye.y, self.eye.z],
            at: [self.at.x, self.at.y, self.at.z],
            up: [self.up.x, self.up.y, self.up.z],
            _pad: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_target_projects_to_screen_centre() {
        let cam = Camera3D::new(16.0 / 9.0);
        let p = cam.view_projection().project_point3(glam::Vec3::ZERO);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn near_plane_maps_to_zero_depth() {
        let cam = Camera3D::new(1.0);
        let near = cam.eye + Vec3::new(0.0, 0.0, cam.znear);
        let p = cam.view_projection().project_point3(near.to_glam());
        assert!(p.z.abs() < 1e-4);
    }
}
