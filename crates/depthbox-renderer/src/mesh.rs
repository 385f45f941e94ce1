use bytemuck::{Pod, Zeroable};

/// Lines per side of a wall grid.
pub const GRID_DIVISIONS: u32 = 20;

/// Vertex format for wireframe meshes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

impl LineVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// A line-list mesh: every index pair is one segment.
pub struct LineMesh {
    pub vertices: Vec<LineVertex>,
    pub indices: Vec<u32>,
}

impl LineMesh {
    pub fn segment_count(&self) -> usize {
        self.indices.len() / 2
    }
}

/// Unit square grid in the XY plane, centered on the origin, facing +Z.
///
/// `divisions` cells per side; the border lines are included.
pub fn grid_mesh(divisions: u32) -> LineMesh {
    let divisions = divisions.max(1);
    let lines = divisions + 1;
    let mut vertices = Vec::with_capacity((lines * 4) as usize);

    for i in 0..lines {
        let t = i as f32 / divisions as f32 - 0.5;
        // Vertical line at x = t.
        vertices.push(LineVertex {
            position: [t, -0.5, 0.0],
        });
        vertices.push(LineVertex {
            position: [t, 0.5, 0.0],
        });
        // Horizontal line at y = t.
        vertices.push(LineVertex {
            position: [-0.5, t, 0.0],
        });
        vertices.push(LineVertex {
            position: [0.5, t, 0.0],
        });
    }

    let indices = (0..vertices.len() as u32).collect();
    LineMesh { vertices, indices }
}

/// Border of the unit square in the XY plane.
pub fn outline_mesh() -> LineMesh {
    let vertices = vec![
        LineVertex {
            position: [-0.5, -0.5, 0.0],
        },
        LineVertex {
            position: [0.5, -0.5, 0.0],
        },
        LineVertex {
            position: [0.5, 0.5, 0.0],
        },
        LineVertex {
            position: [-0.5, 0.5, 0.0],
        },
    ];
    let indices = vec![0, 1, 1, 2, 2, 3, 3, 0];
    LineMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_border_and_interior_lines() {
        let mesh = grid_mesh(GRID_DIVISIONS);
        // 21 vertical + 21 horizontal segments.
        assert_eq!(mesh.segment_count(), 42);
        assert_eq!(mesh.vertices.len(), 84);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.position[0].abs() <= 0.5 && v.position[1].abs() <= 0.5 && v.position[2] == 0.0));
    }

    #[test]
    fn zero_divisions_is_a_single_cell() {
        let mesh = grid_mesh(0);
        assert_eq!(mesh.segment_count(), 4);
    }

    #[test]
    fn outline_is_closed() {
        let mesh = outline_mesh();
        assert_eq!(mesh.segment_count(), 4);
        assert_eq!(mesh.indices.first(), mesh.indices.last());
    }
}
