use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

pub const CYLINDER_SEGMENTS: usize = 24;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Triangle list, counter-clockwise seen from outside.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    /// Radius 1, height 1, centered on the origin along Y. The shader
    /// narrows the top ring by the instance taper, so a taper of zero
    /// gives a cone.
    pub fn cylinder(segments: usize) -> Self {
        let mut mesh = Mesh::default();
        let ring = |i: usize| {
            let angle = i as f32 / segments as f32 * TAU;
            Vec3::new(angle.cos(), 0.0, angle.sin())
        };
        let (top, bottom) = (Vec3::Y * 0.5, Vec3::NEG_Y * 0.5);
        for i in 0..segments {
            let (near, far) = (ring(i), ring(i + 1));
            let base = mesh.next_index();
            mesh.vertices.extend([
                MeshVertex::new(near + bottom, near),
                MeshVertex::new(near + top, near),
                MeshVertex::new(far + top, far),
                MeshVertex::new(far + bottom, far),
            ]);
            mesh.indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        for (center, normal) in [(top, Vec3::Y), (bottom, Vec3::NEG_Y)] {
            let hub = mesh.next_index();
            mesh.vertices.push(MeshVertex::new(center, normal));
            for i in 0..segments {
                let first = mesh.next_index();
                mesh.vertices.extend([
                    MeshVertex::new(ring(i) + center, normal),
                    MeshVertex::new(ring(i + 1) + center, normal),
                ]);
                if normal.y > 0.0 {
                    mesh.indices.extend([hub, first + 1, first]);
                } else {
                    mesh.indices.extend([hub, first, first + 1]);
                }
            }
        }
        mesh
    }

    /// Unit cube centered on the origin.
    pub fn cube() -> Self {
        let mut mesh = Mesh::default();
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];
        for (normal, u, v) in faces {
            let base = mesh.next_index();
            for (a, b) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = (normal + u * a + v * b) * 0.5;
                mesh.vertices.push(MeshVertex::new(position, normal));
            }
            mesh.indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    fn next_index(&self) -> u16 {
        self.vertices.len() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward_winding(mesh: &Mesh) {
        for triangle in mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[triangle[k] as usize]);
            let (pa, pb, pc) = (
                Vec3::from(a.position),
                Vec3::from(b.position),
                Vec3::from(c.position),
            );
            let face_normal = (pb - pa).cross(pc - pa);
            assert!(
                face_normal.dot(Vec3::from(a.normal)) > 0.0,
                "triangle {triangle:?} faces inward"
            );
        }
    }

    #[test]
    fn cube_faces_point_outward() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.index_count(), 36);
        assert_outward_winding(&cube);
        for vertex in &cube.vertices {
            assert!(vertex.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn cylinder_faces_point_outward() {
        let cylinder = Mesh::cylinder(CYLINDER_SEGMENTS);
        assert_eq!(cylinder.index_count() as usize, CYLINDER_SEGMENTS * 12);
        assert_outward_winding(&cylinder);
        let max = cylinder
            .indices
            .iter()
            .map(|&index| index as usize)
            .max()
            .unwrap_or_default();
        assert!(max < cylinder.vertices.len());
    }
}
