//! CPU mesh data and its GPU upload.
//!
//! Each demo owns its meshes; the lifecycle only sees them as scene assets.

mod circle;
mod cube;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

pub use circle::{circle, CircleVertex};
pub use cube::{cube, CubeVertex};

/// Vertex type with a fixed buffer layout.
pub trait Vertex: Pod {
    fn layout() -> wgpu::VertexBufferLayout<'static>;
}

/// Indexed triangle list on the CPU.
#[derive(Debug, Clone)]
pub struct MeshData<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

/// Indexed triangle list uploaded to the GPU.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    layout: wgpu::VertexBufferLayout<'static>,
}

impl Mesh {
    pub fn upload<V: Vertex>(device: &wgpu::Device, data: &MeshData<V>, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vbo")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} ibo")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            layout: V::layout(),
        }
    }

    pub fn layout(&self) -> wgpu::VertexBufferLayout<'static> {
        self.layout.clone()
    }

    /// Binds vertex/index buffers and draws `instances` copies.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: std::ops::Range<u32>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, instances);
    }
}
