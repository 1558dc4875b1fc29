//! Subdivided plane drawn as a wireframe.

use bytemuck::{Pod, Zeroable};

use crate::params::SceneConfig;

/// Vertex data for plane mesh (position + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Flat plane in the XY plane, centred on the origin
pub struct PlaneGeometry {
    pub vertices: Vec<Vertex>,
    /// Line-list indices covering every triangle edge
    pub indices: Vec<u32>,
    segments: u32,
}

impl PlaneGeometry {
    pub fn new(config: &SceneConfig) -> Self {
        let segments = config.plane_segments.max(1);
        let size = config.plane_size;
        let half = size / 2.0;
        let step = size / segments as f32;
        let row = segments + 1;

        let mut vertices = Vec::with_capacity((row * row) as usize);
        for y in 0..=segments {
            for x in 0..=segments {
                vertices.push(Vertex {
                    position: [x as f32 * step - half, half - y as f32 * step, 0.0],
                    uv: [x as f32 / segments as f32, 1.0 - y as f32 / segments as f32],
                });
            }
        }

        let mut indices = Vec::new();
        // Horizontal lines (connect vertices in same row)
        for y in 0..=segments {
            for x in 0..segments {
                let i = y * row + x;
                indices.extend_from_slice(&[i, i + 1]);
            }
        }
        // Vertical lines (connect vertices in same column)
        for y in 0..segments {
            for x in 0..=segments {
                let i = y * row + x;
                indices.extend_from_slice(&[i, i + row]);
            }
        }
        // Quad diagonals, matching the triangle split of a filled plane
        for y in 0..segments {
            for x in 0..segments {
                let i = y * row + x;
                indices.extend_from_slice(&[i + row, i + 1]);
            }
        }

        Self {
            vertices,
            indices,
            segments,
        }
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_counts() {
        let config = SceneConfig::default();
        let plane = PlaneGeometry::new(&config);
        let s = config.plane_segments as usize;

        assert_eq!(plane.vertices.len(), (s + 1).pow(2));
        // rows + columns + diagonals, two indices per line
        assert_eq!(plane.indices.len(), 2 * (2 * s * (s + 1) + s * s));
    }

    #[test]
    fn test_plane_extent() {
        let plane = PlaneGeometry::new(&SceneConfig::default());
        let xs: Vec<f32> = plane.vertices.iter().map(|v| v.position[0]).collect();
        let min = xs.iter().cloned().fold(f32::MAX, f32::min);
        let max = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert_eq!(min, -32.0);
        assert_eq!(max, 32.0);
        assert!(plane.vertices.iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn test_indices_in_bounds() {
        let plane = PlaneGeometry::new(&SceneConfig {
            plane_size: 2.0,
            plane_segments: 3,
        });
        let n = plane.vertices.len() as u32;
        assert!(plane.indices.iter().all(|&i| i < n));
    }
}
