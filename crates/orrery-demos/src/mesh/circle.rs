use bytemuck::{Pod, Zeroable};

use super::{MeshData, Vertex};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CircleVertex {
    pub pos: [f32; 2],
}

impl Vertex for CircleVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CircleVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRS,
        }
    }
}

/// Filled circle as a triangle fan around a center vertex, counter-clockwise.
///
/// `segments` is raised to at least 3.
pub fn circle(radius: f32, segments: u32) -> MeshData<CircleVertex> {
    let segments = segments.max(3);

    let mut vertices = Vec::with_capacity(segments as usize + 1);
    vertices.push(CircleVertex { pos: [0.0, 0.0] });
    for i in 0..segments {
        let a = i as f32 / segments as f32 * std::f32::consts::TAU;
        vertices.push(CircleVertex {
            pos: [radius * a.cos(), radius * a.sin()],
        });
    }

    let mut indices = Vec::with_capacity(segments as usize * 3);
    for i in 0..segments {
        indices.extend_from_slice(&[0, i + 1, (i + 1) % segments + 1]);
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_has_center_plus_rim() {
        let m = circle(0.5, 32);
        assert_eq!(m.vertices.len(), 33);
        assert_eq!(m.indices.len(), 96);
        assert!(m.indices.iter().all(|&i| (i as usize) < m.vertices.len()));
    }

    #[test]
    fn rim_sits_on_radius() {
        let m = circle(0.125, 16);
        for v in &m.vertices[1..] {
            let r = (v.pos[0] * v.pos[0] + v.pos[1] * v.pos[1]).sqrt();
            assert!((r - 0.125).abs() < 1e-6);
        }
    }

    #[test]
    fn last_triangle_closes_the_fan() {
        let m = circle(1.0, 4);
        assert_eq!(&m.indices[9..], &[0, 4, 1]);
    }

    #[test]
    fn degenerate_segment_count_is_raised() {
        assert_eq!(circle(1.0, 1).vertices.len(), 4);
    }
}
