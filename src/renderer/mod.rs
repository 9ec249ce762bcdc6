// src/renderer/mod.rs
//! Headless GPU mirror of the scene. Owns the GPU context, the offscreen
//! targets, and one set of buffers per reconstructed mesh.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    context::GpuContext,
    pipelines::environment::{EnvironmentPipeline, MeshUniform},
    targets::RenderTargets,
};
use crate::scene::{EntityId, Material, MeshEntity, MeshStore, ParameterValue};
use glam::Mat4;
use log::debug;
use std::collections::HashMap;
use wgpu::util::DeviceExt;

/// Tint for shader-bound meshes that do not declare a `Tint` color.
const DEFAULT_SHADER_TINT: [f32; 4] = [0.35, 0.9, 1.0, 1.0];

/// GPU resources for a single reconstructed mesh.
pub struct MeshDraw {
    pub name: String,
    pub positions: wgpu::Buffer,
    pub tex_coords: wgpu::Buffer,
    pub indices: wgpu::Buffer,
    pub index_count: u32,
    pub ubo: wgpu::Buffer,
    pub bind: wgpu::BindGroup,
}

pub struct MeshRenderer {
    pub context: GpuContext,
    pub targets: RenderTargets,
    pub pipeline: EnvironmentPipeline,
    intensity_parameter: String,
    meshes: HashMap<EntityId, MeshDraw>,
    frames: u64,
}

/// Tint and unscaled shader intensity for a material.
fn material_inputs(material: &Material, intensity_parameter: &str) -> ([f32; 4], f32) {
    match material {
        Material::Shader(m) => {
            let intensity = m
                .parameter(intensity_parameter)
                .and_then(|v| v.as_float())
                .unwrap_or(0.0);
            let tint = match m.parameter("Tint") {
                Some(ParameterValue::Color(c)) => c,
                _ => DEFAULT_SHADER_TINT,
            };
            (tint, intensity)
        }
        Material::Simple(m) => (m.base_color.to_array(), 0.0),
    }
}

impl MeshRenderer {
    pub fn new(context: GpuContext, width: u32, height: u32, intensity_parameter: impl Into<String>) -> Self {
        let targets = RenderTargets::new(&context, width, height);
        let pipeline = EnvironmentPipeline::new(&context.device, context.color_format, context.depth_format);
        Self {
            context,
            targets,
            pipeline,
            intensity_parameter: intensity_parameter.into(),
            meshes: HashMap::new(),
            frames: 0,
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn upload(&self, entity: &MeshEntity, uniform: &MeshUniform) -> MeshDraw {
        let device = &self.context.device;
        let mesh = &entity.mesh;

        let positions: Vec<[f32; 3]> = mesh.positions.iter().map(|p| p.to_array()).collect();
        let tex_coords: Vec<[f32; 2]> = mesh.tex_coords.iter().map(|t| t.to_array()).collect();

        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Environment Positions"),
            contents: bytemuck::cast_slice(&positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let tex_coords = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Environment TexCoords"),
            contents: bytemuck::cast_slice(&tex_coords),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Environment Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Environment Mesh UBO"),
            contents: bytemuck::bytes_of(uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Environment Mesh BG"),
            layout: &self.pipeline.mesh_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        debug!(
            "GPU upload {}: {} verts, {} indices",
            mesh.name,
            mesh.vertex_count(),
            mesh.indices.len()
        );

        MeshDraw {
            name: mesh.name.clone(),
            positions,
            tex_coords,
            indices,
            index_count: mesh.indices.len() as u32,
            ubo,
            bind,
        }
    }

    /// Uploads meshes seen for the first time and refreshes every mesh's
    /// uniform with its current pose and shader intensity.
    pub fn sync(&mut self, store: &MeshStore, view_proj: Mat4) {
        for entity in store.iter() {
            let (tint, intensity) = material_inputs(&entity.material, &self.intensity_parameter);
            let uniform = MeshUniform::new(
                entity.transform.matrix(),
                view_proj,
                tint,
                intensity,
                entity.opacity,
            );

            match self.meshes.get(&entity.id) {
                Some(draw) => {
                    self.context.queue.write_buffer(&draw.ubo, 0, bytemuck::bytes_of(&uniform));
                }
                None => {
                    let draw = self.upload(entity, &uniform);
                    self.meshes.insert(entity.id, draw);
                }
            }
        }
    }

    /// Draws every synced mesh into the offscreen target and submits the frame.
    pub fn render(&mut self) {
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Environment Frame"),
            });

        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Environment"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline.pipeline);
            for m in self.meshes.values() {
                rp.set_bind_group(0, &m.bind, &[]);
                rp.set_vertex_buffer(0, m.positions.slice(..));
                rp.set_vertex_buffer(1, m.tex_coords.slice(..));
                rp.set_index_buffer(m.indices.slice(..), wgpu::IndexFormat::Uint32);
                rp.draw_indexed(0..m.index_count, 0, 0..1);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        self.frames += 1;
    }
}
