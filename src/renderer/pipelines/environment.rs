// src/renderer/pipelines/environment.rs
//! Draws reconstructed environment meshes with the intensity-driven shader.

use super::base::single_uniform_bind_group_layout;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Per-mesh uniform block. Layout matches `MeshUniforms` in
/// `shaders/environment_mesh.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub tint: [f32; 4],
    /// x = intensity, y = opacity, zw unused
    pub params: [f32; 4],
}

impl MeshUniform {
    pub fn new(model: Mat4, view_proj: Mat4, tint: [f32; 4], intensity: f32, opacity: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            view_proj: view_proj.to_cols_array_2d(),
            tint,
            params: [intensity, opacity, 0.0, 0.0],
        }
    }
}

pub struct EnvironmentPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub mesh_layout: wgpu::BindGroupLayout,
}

impl EnvironmentPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
    ) -> Self {
        let mesh_layout = single_uniform_bind_group_layout(
            device,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            std::mem::size_of::<MeshUniform>() as u64,
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/environment_mesh.wgsl"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../../shaders/environment_mesh.wgsl").into(),
            ),
        });

        let vbuf_layouts = [
            // Positions
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    shader_location: 0,
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            },
            // Planar texture coordinates
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    shader_location: 1,
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x2,
                }],
            },
        ];

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Environment PipelineLayout"),
            bind_group_layouts: &[&mesh_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Environment Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &vbuf_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Sensor meshes have no reliable winding.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_fmt,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            mesh_layout,
        }
    }
}
