// src/renderer/targets.rs
//! Offscreen color and depth attachments.

use super::context::GpuContext;

pub struct RenderTargets {
    pub width: u32,
    pub height: u32,
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
}

impl RenderTargets {
    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let make_tex = |label, fmt, usage| {
            let tex = gpu.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: fmt,
                usage,
                view_formats: &[],
            });
            let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
            (tex, view)
        };

        let (color, color_view) = make_tex(
            "Environment Color",
            gpu.color_format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        );
        let (depth, depth_view) =
            make_tex("Environment Depth", gpu.depth_format, wgpu::TextureUsages::RENDER_ATTACHMENT);

        Self {
            width,
            height,
            color,
            color_view,
            depth,
            depth_view,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
