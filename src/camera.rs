//! Fixed perspective camera looking across the plane.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Uniform buffer for the camera (view-projection matrix)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// Stationary camera; only the aspect ratio changes (on resize)
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    target: Vec3,
    fov_y_radians: f32,
    near: f32,
    far: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            eye: Vec3::from_array(config.camera_position),
            target: Vec3::from_array(config.camera_target),
            fov_y_radians: config.fov_degrees.to_radians(),
            near: config.near_plane,
            far: config.far_plane,
            aspect: config.aspect_ratio(),
        }
    }

    /// Track the window size; zero-sized windows keep the previous aspect
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y_radians, self.aspect, self.near, self.far);
        proj * view
    }

    pub fn uniforms(&self) -> CameraUniforms {
        CameraUniforms {
            view_proj: self.view_proj().to_cols_array_2d(),
        }
    }
}
