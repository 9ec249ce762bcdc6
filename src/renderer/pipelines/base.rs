// src/renderer/pipelines/base.rs
//! Shared utilities for rendering pipelines.

/// Creates a bind group layout for a single uniform buffer.
///
/// # Arguments
/// * `device` - The GPU device
/// * `stages` - Which shader stages can access the uniform
/// * `size` - Minimum binding size in bytes
pub fn single_uniform_bind_group_layout(
    device: &wgpu::Device,
    stages: wgpu::ShaderStages,
    size: u64,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Single Uniform BGL"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: stages,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size),
            },
            count: None,
        }],
    })
}
