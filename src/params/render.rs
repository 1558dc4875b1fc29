//! Window, camera and scene configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units)
    pub far_plane: f32,

    /// Camera eye position; sits below the plane looking up across it
    pub camera_position: [f32; 3],

    /// Camera look-at target
    pub camera_target: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 70.0,
            near_plane: 5.0,
            far_plane: 1000.0,
            camera_position: [0.0, -20.0, 5.0],
            camera_target: [0.0, 0.0, 0.0],
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(format!(
                "Window size must be non-zero, got {}x{}",
                self.window_width, self.window_height
            ));
        }
        if self.near_plane <= 0.0 || self.near_plane >= self.far_plane {
            return Err(format!(
                "Clip planes must satisfy 0 < near < far, got {} / {}",
                self.near_plane, self.far_plane
            ));
        }
        Ok(())
    }
}

/// Plane mesh configuration
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Plane edge length (world units)
    pub plane_size: f32,

    /// Subdivisions per edge
    pub plane_segments: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            plane_size: 64.0,
            plane_segments: 64,
        }
    }
}
