/// Number of vertices in the plane, drawn as a triangle strip.
pub const PLANE_VERTEX_COUNT: usize = 4;

/// Flat vertex data for the demo plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneGeometry {
    /// Two floats (x, y) per vertex.
    pub vertices: Vec<f32>,
    /// Two floats (u, v) per vertex.
    pub uvs: Vec<f32>,
}

impl PlaneGeometry {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }

    /// Positions widened to `components` floats per vertex; extra axes are 0.
    pub fn positions(&self, components: usize) -> Vec<f32> {
        let components = components.max(2);
        let mut positions = Vec::with_capacity(self.vertex_count() * components);
        for vertex in self.vertices.chunks_exact(2) {
            positions.extend_from_slice(vertex);
            positions.extend(std::iter::repeat(0.0).take(components - 2));
        }
        positions
    }
}

/// Unit quad centered on the origin, ordered for a 4-vertex triangle strip.
pub fn plane() -> PlaneGeometry {
    PlaneGeometry {
        vertices: vec![
            -0.5, -0.5, //
            0.5, -0.5, //
            -0.5, 0.5, //
            0.5, 0.5,
        ],
        uvs: vec![
            0.0, 0.0, //
            1.0, 0.0, //
            0.0, 1.0, //
            1.0, 1.0,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_has_four_vertices_and_uvs() {
        let plane = plane();
        assert_eq!(plane.vertex_count(), PLANE_VERTEX_COUNT);
        assert_eq!(plane.uvs.len(), PLANE_VERTEX_COUNT * 2);
    }

    #[test]
    fn plane_is_deterministic() {
        let first = plane();
        for _ in 0..8 {
            assert_eq!(plane(), first);
        }
    }

    #[test]
    fn uvs_cover_the_unit_square() {
        let plane = plane();
        for uv in plane.uvs.chunks_exact(2) {
            assert!(uv.iter().all(|c| *c == 0.0 || *c == 1.0));
        }
        // Strip order: the last three vertices form the second triangle.
        assert_eq!(&plane.uvs[2..], &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn quad_has_unit_side() {
        let plane = plane();
        let xs: Vec<f32> = plane.vertices.iter().step_by(2).copied().collect();
        let width = xs.iter().cloned().fold(f32::MIN, f32::max)
            - xs.iter().cloned().fold(f32::MAX, f32::min);
        assert_eq!(width, 1.0);
    }

    #[test]
    fn positions_pad_extra_axes_with_zero() {
        let positions = plane().positions(3);
        assert_eq!(positions.len(), 12);
        assert_eq!(&positions[..3], &[-0.5, -0.5, 0.0]);
        assert_eq!(plane().positions(2), plane().vertices);
    }
}
