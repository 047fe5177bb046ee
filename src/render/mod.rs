pub mod pipeline;

use std::sync::Arc;
use winit::window::Window;

use self::pipeline::SpritePipeline;
use crate::error::AppError;
use crate::sprite::sheet::SpriteSheet;
use crate::sprite::{CellRect, DrawSurface};

/// Window color shown where the canvas is empty.
///
/// A cleared canvas is transparent (see `PixelCanvas`, which clears to
/// `[0, 0, 0, 0]`). The window surface is opaque, so the GPU clear
/// composites that transparent canvas over `rgb` and writes the result.
/// `rgb` is sRGB; the surface format is sRGB, so clear values are linear.
pub fn background_clear_color(rgb: [u8; 3]) -> wgpu::Color {
    let linear = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    wgpu::Color {
        r: linear(rgb[0]),
        g: linear(rgb[1]),
        b: linear(rgb[2]),
        a: 1.0,
    }
}

/// Refuse sheets the device cannot hold in one texture.
pub fn check_sheet_size(width: u32, height: u32, max: u32) -> Result<(), AppError> {
    if width > max || height > max {
        return Err(AppError::SheetTooLarge { width, height, max });
    }
    Ok(())
}

/// Draw commands recorded by one tick, replayed by [`GpuState::draw_canvas`].
pub struct GpuCanvas {
    width: u32,
    height: u32,
    cleared: bool,
    blit: Option<CellRect>,
}

impl GpuCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cleared: false,
            blit: None,
        }
    }

    /// Cell drawn this tick, if any.
    pub fn pending_blit(&self) -> Option<CellRect> {
        self.blit
    }
}

impl DrawSurface for GpuCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.cleared = true;
        self.blit = None;
    }

    fn blit(&mut self, src: CellRect) {
        self.blit = Some(src);
    }
}

/// Core GPU state — device, queue, surface, pipeline.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub sprite_pipeline: SpritePipeline,
    clear_color: wgpu::Color,
}

/// Intermediate frame state returned by `begin_frame`.
pub struct FrameContext {
    pub output: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuState {
    /// Initialize wgpu and upload the sprite sheet.
    pub fn new(
        window: Arc<Window>,
        sheet: &SpriteSheet,
        background: [u8; 3],
    ) -> Result<Self, AppError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        log::info!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("sheetplay_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            },
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);

        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(AppError::NoSurfaceFormat)?;

        let present_mode = wgpu::PresentMode::AutoVsync;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!(
            "Surface: format={:?}, alpha_mode={:?}, present_mode={:?}",
            format,
            alpha_mode,
            present_mode,
        );

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        check_sheet_size(
            sheet.width(),
            sheet.height(),
            device.limits().max_texture_dimension_2d,
        )?;
        let sprite_pipeline = SpritePipeline::new(&device, &queue, format, sheet);

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            sprite_pipeline,
            clear_color: background_clear_color(background),
        })
    }

    /// Resize the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Acquire the next surface texture and create a command encoder.
    /// Returns None if the surface is lost/outdated (caller should skip this frame).
    pub fn begin_frame(&self) -> Option<FrameContext> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return None;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return None;
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return None;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        Some(FrameContext {
            output,
            view,
            encoder,
        })
    }

    /// Replay the tick's clear + blit into the frame.
    pub fn draw_canvas(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        canvas: &GpuCanvas,
    ) {
        let load = if canvas.cleared {
            wgpu::LoadOp::Clear(self.clear_color)
        } else {
            wgpu::LoadOp::Load
        };

        if let Some(cell) = canvas.blit {
            self.sprite_pipeline.update_source(&self.queue, cell);
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sprite_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if canvas.blit.is_some() {
            let p = &self.sprite_pipeline;
            render_pass.set_pipeline(&p.pipeline);
            render_pass.set_bind_group(0, &p.bind_group, &[]);
            render_pass.set_vertex_buffer(0, p.vertex_buffer.slice(..));
            render_pass.set_index_buffer(p.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..6, 0, 0..1);
        }
    }

    /// Create an egui render pass that preserves existing content (LoadOp::Load).
    /// Returns a 'static render pass suitable for egui_wgpu::Renderer::render().
    pub fn begin_panel_pass(
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'static> {
        let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("panel_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.forget_lifetime()
    }

    /// Submit the command encoder and present.
    pub fn finish_frame(
        &self,
        encoder: wgpu::CommandEncoder,
        output: wgpu::SurfaceTexture,
        extra_cmd_bufs: Vec<wgpu::CommandBuffer>,
    ) {
        self.queue.submit(
            extra_cmd_bufs
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        output.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_within_texture_limit() {
        assert!(check_sheet_size(6900, 5230, 8192).is_ok());
        assert!(check_sheet_size(8192, 8192, 8192).is_ok());
    }

    #[test]
    fn oversized_sheet_is_rejected_in_either_dimension() {
        for (w, h) in [(8193, 100), (100, 8193)] {
            match check_sheet_size(w, h, 8192) {
                Err(AppError::SheetTooLarge { width, height, max }) => {
                    assert_eq!((width, height, max), (w, h, 8192));
                }
                other => panic!("expected SheetTooLarge, got {other:?}"),
            }
        }
    }

    #[test]
    fn background_extremes_map_exactly() {
        let white = background_clear_color([255, 255, 255]);
        assert_eq!((white.r, white.g, white.b, white.a), (1.0, 1.0, 1.0, 1.0));
        let black = background_clear_color([0, 0, 0]);
        assert_eq!((black.r, black.g, black.b, black.a), (0.0, 0.0, 0.0, 1.0));
        let grey = background_clear_color([128, 128, 128]);
        assert!(grey.r > 0.2 && grey.r < 0.23);
    }

    #[test]
    fn clear_drops_previous_blit() {
        let mut canvas = GpuCanvas::new(600, 600);
        let cell = CellRect {
            x: 0,
            y: 0,
            w: 10,
            h: 10,
        };
        canvas.blit(cell);
        assert_eq!(canvas.pending_blit(), Some(cell));

        canvas.clear();

        assert!(canvas.cleared);
        assert_eq!(canvas.pending_blit(), None);
        assert_eq!(canvas.size(), (600, 600));
    }
}
