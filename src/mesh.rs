use bytemuck::NoUninit;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Axis-aligned cube centered on the origin, one flat color per face.
pub fn create_cube_mesh(size: f32) -> Mesh {
    let h = size / 2.0;

    // (normal, color) per face; 4 verts each so normals stay flat
    let faces: [([f32; 3], [f32; 4]); 6] = [
        ([0.0, 0.0, 1.0], [0.85, 0.30, 0.25, 1.0]),  // +Z
        ([0.0, 0.0, -1.0], [0.25, 0.60, 0.85, 1.0]), // -Z
        ([1.0, 0.0, 0.0], [0.30, 0.75, 0.35, 1.0]),  // +X
        ([-1.0, 0.0, 0.0], [0.85, 0.70, 0.25, 1.0]), // -X
        ([0.0, 1.0, 0.0], [0.70, 0.35, 0.80, 1.0]),  // +Y
        ([0.0, -1.0, 0.0], [0.35, 0.70, 0.70, 1.0]), // -Y
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, color) in faces {
        // Build the face in its own plane: u and v span perpendicular to the normal
        let n = glam::Vec3::from_array(normal);
        let u = if n.y.abs() > 0.5 { glam::Vec3::X } else { glam::Vec3::Y.cross(n).normalize() };
        let v = n.cross(u);

        let base = vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let pos = n * h + u * (su * h) + v * (sv * h);
            vertices.push(Vertex {
                pos: pos.to_array(),
                normal,
                color,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_mesh_has_six_faces() {
        let mesh = create_cube_mesh(0.2);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn cube_vertices_lie_on_surface() {
        let mesh = create_cube_mesh(0.2);
        for v in &mesh.vertices {
            let max = v.pos.iter().fold(0.0f32, |m, c| m.max(c.abs()));
            assert!((max - 0.1).abs() < 1e-6, "vertex off the cube surface: {:?}", v.pos);
        }
    }
}
