use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::{MeshData, Vertex};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex for CubeVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
            0 => Float32x3, // pos
            1 => Float32x3, // normal
            2 => Float32x3  // color
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRS,
        }
    }
}

/// (normal, u, v, color) per face, with `u × v = normal`.
const FACES: [(Vec3, Vec3, Vec3, [f32; 3]); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y, [0.9, 0.3, 0.3]),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y, [0.3, 0.9, 0.3]),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z, [0.3, 0.3, 0.9]),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z, [0.9, 0.9, 0.3]),
    (Vec3::Z, Vec3::X, Vec3::Y, [0.3, 0.9, 0.9]),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y, [0.9, 0.3, 0.9]),
];

/// Unit cube centered on the origin, one color per face.
///
/// Faces are counter-clockwise seen from outside and carry their own normals,
/// so there are 4 vertices per face.
pub fn cube() -> MeshData<CubeVertex> {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v, color) in FACES {
        let base = vertices.len() as u32;
        let center = normal * 0.5;
        let (u, v) = (u * 0.5, v * 0.5);

        for corner in [center - u - v, center + u - v, center + u + v, center - u + v] {
            vertices.push(CubeVertex {
                pos: corner.to_array(),
                normal: normal.to_array(),
                color,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_four_vertices_and_two_triangles_per_face() {
        let m = cube();
        assert_eq!(m.vertices.len(), 24);
        assert_eq!(m.indices.len(), 36);
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let m = cube();
        for tri in m.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| m.vertices[i as usize]);
            let (pa, pb, pc) = (Vec3::from(a.pos), Vec3::from(b.pos), Vec3::from(c.pos));
            let facing = (pb - pa).cross(pc - pa).dot(Vec3::from(a.normal));
            assert!(facing > 0.0);
        }
    }

    #[test]
    fn corners_lie_on_unit_cube() {
        for v in cube().vertices {
            assert!(v.pos.iter().all(|c| c.abs() == 0.5));
        }
    }
}
