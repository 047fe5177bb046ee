use winit::window::Window;

use crate::render::GpuState;

/// Stagger slider range. The CLI can still set values outside it.
const STAGGER_RANGE: std::ops::RangeInclusive<i64> = 1..=30;

/// Input gathered from the panel during one frame.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PanelChanges {
    pub animation: Option<String>,
    pub stagger: Option<i64>,
}

/// Read-only values shown in the panel.
pub struct PanelStatus {
    pub tick_count: u64,
    pub frame: Option<u32>,
    pub num_frames: u32,
    pub fps: f64,
}

/// Animation picker + stagger slider, drawn with egui over the canvas.
pub struct ControlPanel {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub visible: bool,

    /// Catalog names, in catalog order.
    names: Vec<String>,
    selected: usize,
    stagger: i64,
}

impl ControlPanel {
    pub fn new(
        window: &Window,
        gpu: &GpuState,
        names: Vec<String>,
        current: &str,
        stagger: i64,
    ) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        let selected = names.iter().position(|n| n == current).unwrap_or(0);

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            visible: true,
            names,
            selected,
            stagger,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }

    /// Run the egui frame and produce paint output plus any control changes.
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
        status: &PanelStatus,
    ) -> (
        PanelChanges,
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        // Controls are copied out and written back after run(), egui_ctx.run
        // cannot borrow self.
        let mut selected = self.selected;
        let mut stagger = self.stagger;
        let visible = self.visible;
        let names = &self.names;

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            if visible {
                draw_ui(ctx, names, status, &mut selected, &mut stagger);
            }
        });

        let mut changes = PanelChanges::default();
        if selected != self.selected {
            self.selected = selected;
            changes.animation = self.names.get(selected).cloned();
        }
        if stagger != self.stagger {
            self.stagger = stagger;
            changes.stagger = Some(stagger);
        }

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (
            changes,
            clipped_primitives,
            full_output.textures_delta,
            screen_descriptor,
        )
    }

    /// Upload egui textures and buffers. Call before the panel render pass.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render egui into the given render pass.
    pub fn render(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::epaint::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }
}

fn draw_ui(
    ctx: &egui::Context,
    names: &[String],
    status: &PanelStatus,
    selected: &mut usize,
    stagger: &mut i64,
) {
    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Animation")
        .default_pos([10.0, 10.0])
        .default_width(240.0)
        .resizable(false)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            ui.horizontal(|ui| {
                ui.label("Animation:");
                let current = names.get(*selected).map(String::as_str).unwrap_or("");
                egui::ComboBox::from_id_salt("animation")
                    .selected_text(current)
                    .show_ui(ui, |ui| {
                        for (i, name) in names.iter().enumerate() {
                            ui.selectable_value(selected, i, name.as_str());
                        }
                    });
            });

            ui.horizontal(|ui| {
                ui.label("Stagger:");
                ui.add(
                    egui::Slider::new(stagger, STAGGER_RANGE)
                        .clamping(egui::SliderClamping::Edits),
                );
            });
            ui.add_space(4.0);

            let frame = status
                .frame
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".into());
            ui.label(format!(
                "Frame {} / {} | Tick {}",
                frame, status.num_frames, status.tick_count
            ));
            ui.label(format!("FPS: {:.1}", status.fps));
            ui.label("F1: Toggle | ESC: Quit");
        });
}
