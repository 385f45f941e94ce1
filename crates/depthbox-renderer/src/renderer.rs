use crate::camera::Camera;
use crate::mesh::{grid_mesh, outline_mesh, LineMesh, GRID_DIVISIONS};
use crate::pipeline::{LinePipeline, Uniforms};
use crate::scene::{BoxScene, Placement, Wall};
use tracing::info;
use wgpu::util::DeviceExt;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Draw slots: one per wall plus the front frame.
const SLOT_COUNT: usize = Wall::ALL.len() + 1;

struct MeshBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn upload(device: &wgpu::Device, label: &str, mesh: &LineMesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

struct DrawSlot {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Renders the box scene into a single view.
///
/// Geometry is built once; per frame only the uniforms change.
pub struct BoxRenderer {
    pipeline: LinePipeline,
    grid: MeshBuffers,
    outline: MeshBuffers,
    slots: Vec<DrawSlot>,
}

impl BoxRenderer {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let pipeline = LinePipeline::new(device, color_format, width, height);
        let grid = MeshBuffers::upload(device, "grid", &grid_mesh(GRID_DIVISIONS));
        let outline = MeshBuffers::upload(device, "outline", &outline_mesh());

        let slots = (0..SLOT_COUNT)
            .map(|_| {
                let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("uniform_buffer"),
                    size: std::mem::size_of::<Uniforms>() as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = pipeline.create_uniform_bind_group(device, &uniform_buffer);
                DrawSlot {
                    uniform_buffer,
                    bind_group,
                }
            })
            .collect();

        info!(
            grid_segments = grid.index_count / 2,
            "Box renderer initialized"
        );

        Self {
            pipeline,
            grid,
            outline,
            slots,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.pipeline.resize(device, width, height);
    }

    /// Record one frame of the scene as seen by `camera` into `target`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        scene: &BoxScene,
        camera: &Camera,
    ) -> wgpu::CommandBuffer {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        let color = scene.rgba();

        let draws: Vec<(Placement, &MeshBuffers)> = scene
            .walls()
            .map(|(_, placement)| (placement, &self.grid))
            .chain(std::iter::once((scene.frame(), &self.outline)))
            .collect();

        for ((placement, _), slot) in draws.iter().zip(&self.slots) {
            let uniforms = Uniforms::new(placement.model_matrix(), view, projection, color);
            queue.write_buffer(&slot.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("box_render"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("box_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.pipeline.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline.pipeline);

            for ((_, mesh), slot) in draws.iter().zip(&self.slots) {
                pass.set_bind_group(0, &slot.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        encoder.finish()
    }
}
