// src/camera.rs
//! Fixed viewer pose for the offscreen mirror.
//!
//! Head tracking belongs to the host; the mirror only needs a stable
//! view-projection to place reconstructed surfaces.

use glam::{Mat4, Vec3};

// WGPU (Vulkan/D3D) clip-space conversion for a GL-style projection
pub const OPENGL_TO_WGPU_MATRIX: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0, // map z: [-1,1] -> [0,1]
    0.0, 0.0, 0.5, 1.0,
]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Standing eye height, looking slightly down toward the room.
    pub fn standing_viewer() -> Self {
        Self {
            position: Vec3::new(0.0, 1.6, 0.5),
            target: Vec3::new(0.0, 1.0, -2.0),
            up: Vec3::Y,
            fov_y_rad: 70f32.to_radians(),
            near: 0.05,
            far: 50.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix_gl(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_rad, aspect_ratio, self.near, self.far)
    }

    /// World to wgpu clip space.
    pub fn view_proj(&self, aspect_ratio: f32) -> Mat4 {
        OPENGL_TO_WGPU_MATRIX * self.projection_matrix_gl(aspect_ratio) * self.view_matrix()
    }
}
