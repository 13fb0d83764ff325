//! Rendering system: uploads the field as a texture and stretches it over the window.

use std::sync::Arc;
use winit::window::Window;

use crate::error::{Result, SynthError};
use crate::field::GridView;

/// Convert a field to tightly packed RGBA8, clamping each value to [0, 1].
///
/// One-channel fields are drawn as grayscale. `out` is resized to fit.
pub fn field_to_rgba8(field: &GridView<'_>, out: &mut Vec<u8>) {
    let shape = field.shape();
    out.clear();
    out.reserve(shape.height * shape.width * 4);

    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    for px in field.as_slice().chunks_exact(shape.channels.max(1)) {
        match px {
            [gray] => {
                let g = to_byte(*gray);
                out.extend_from_slice(&[g, g, g, 255]);
            }
            [r, g, b, ..] => out.extend_from_slice(&[to_byte(*r), to_byte(*g), to_byte(*b), 255]),
            // Two channels never pass validation
            [r, g] => out.extend_from_slice(&[to_byte(*r), to_byte(*g), 0, 255]),
            [] => {}
        }
    }
}

/// Rendering system managing the wgpu device, field texture and pipeline
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    field_texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    field_size: wgpu::Extent3d,
    /// Reused RGBA8 staging bytes
    pixels: Vec<u8>,
}

impl RenderSystem {
    /// Create the surface and a texture sized to the field.
    pub async fn new(window: Arc<Window>, field_width: u32, field_height: u32) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Surface borrows the window for 'static through the Arc
        let surface = instance
            .create_surface(window)
            .map_err(|e| SynthError::Render(format!("Failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| SynthError::Render("Failed to find suitable GPU adapter".to_string()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Field Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| SynthError::Render(format!("Failed to request device: {}", e)))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| SynthError::Render("Surface reports no formats".to_string()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let field_size = wgpu::Extent3d {
            width: field_width,
            height: field_height,
            depth_or_array_layers: 1,
        };
        let field_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Field Texture"),
            size: field_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Bytes are display values, same as the captured PNGs
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let field_view = field_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Field Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Field Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Field Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&field_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Field Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Field Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Field Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::info!(
            "Renderer: {} ({:?}), field texture {}x{}",
            adapter.get_info().name,
            surface_format,
            field_width,
            field_height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            field_texture,
            bind_group,
            field_size,
            pixels: Vec::new(),
        })
    }

    /// Reconfigure the surface after a window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload the field into the texture.
    pub fn upload_field(&mut self, field: &GridView<'_>) {
        field_to_rgba8(field, &mut self.pixels);
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.field_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.field_size.width),
                rows_per_image: Some(self.field_size.height),
            },
            self.field_size,
        );
    }

    /// Draw the field texture over the whole window
    pub fn render(&mut self) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(SynthError::Render(format!("Failed to acquire frame: {}", e))),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Field Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::GridShape;

    #[test]
    fn test_rgb_field_clamps() {
        let shape = GridShape::new(1, 2, 3);
        let data = [0.0, 0.5, 1.0, -0.3, 1.7, 0.25];
        let view = GridView::new(&data, shape).unwrap();
        let mut out = Vec::new();
        field_to_rgba8(&view, &mut out);
        assert_eq!(out, vec![0, 128, 255, 255, 0, 255, 64, 255]);
    }

    #[test]
    fn test_gray_field_replicates() {
        let shape = GridShape::new(2, 1, 1);
        let data = [0.2, 2.0];
        let view = GridView::new(&data, shape).unwrap();
        let mut out = vec![9; 3];
        field_to_rgba8(&view, &mut out);
        assert_eq!(out, vec![51, 51, 51, 255, 255, 255, 255, 255]);
    }
}
