use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use rigidframe_driver::{
    DemoConfig, DriverConfig, FailurePolicy, FrameDriver, FrameError, FrameReport, build_demo,
};
use rigidframe_kernel::World;
use rigidframe_render::{AlphaMode, DecodeOptions, SceneConfig};
use rigidframe_render_wgpu::WgpuRenderer;
use rigidframe_tools::{FrameStats, WorldInspector};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "rigidframe-desktop", about = "Falling-box physics demo")]
struct Cli {
    /// Enable verbose logging (per-frame body positions)
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Do not draw collider wireframes
    #[arg(long)]
    no_debug_render: bool,

    /// Scale debug-line alpha by 255 like the color channels
    #[arg(long)]
    scaled_alpha: bool,

    /// Close the window at the first failed frame instead of skipping it
    #[arg(long)]
    halt_on_error: bool,

    /// Hide the frame statistics overlay
    #[arg(long)]
    no_stats: bool,
}

impl Cli {
    fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            debug_render: !self.no_debug_render,
            decode: DecodeOptions {
                alpha: if self.scaled_alpha {
                    AlphaMode::Scaled
                } else {
                    AlphaMode::Unscaled
                },
                strict: false,
            },
            policy: if self.halt_on_error {
                FailurePolicy::Halt
            } else {
                FailurePolicy::LogAndContinue
            },
        }
    }
}

/// Application state.
struct AppState {
    /// Built once the window exists, since the viewport comes from its size.
    driver: Option<FrameDriver<World>>,
    driver_config: DriverConfig,
    stats: FrameStats,
    show_stats: bool,
    last_frame: Instant,
    last_report: Option<FrameReport>,
    fatal: Option<FrameError>,
}

impl AppState {
    fn new(driver_config: DriverConfig, show_stats: bool) -> Self {
        Self {
            driver: None,
            driver_config,
            stats: FrameStats::default(),
            show_stats,
            last_frame: Instant::now(),
            last_report: None,
            fatal: None,
        }
    }

    fn start(&mut self, width: u32, height: u32) -> Result<(), FrameError> {
        let demo = DemoConfig {
            scene: SceneConfig::new(width, height),
            ..DemoConfig::default()
        };
        self.driver = Some(FrameDriver::new(build_demo(&demo)?, self.driver_config));
        self.last_frame = Instant::now();
        Ok(())
    }

    /// Run one frame. Returns false once the loop must stop.
    fn update(&mut self) -> bool {
        let now = Instant::now();
        self.stats.record(now - self.last_frame);
        self.last_frame = now;

        let Some(driver) = &mut self.driver else {
            return true;
        };
        match driver.advance() {
            Ok(Some(report)) => {
                self.last_report = Some(report);
                true
            }
            Ok(None) => true,
            Err(e) => {
                self.fatal = Some(e);
                false
            }
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_stats {
            return;
        }
        let Some(driver) = &mut self.driver else {
            return;
        };

        let summary = WorldInspector::summary(&driver.context().world);
        let failures = driver.failures();
        let mut debug_render = driver.config().debug_render;

        egui::Window::new("Stats")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(self.stats.to_string());
                ui.separator();
                ui.label(format!("Tick: {}", summary.tick));
                ui.label(format!(
                    "Bodies: {}  Colliders: {}",
                    summary.body_count, summary.collider_count
                ));
                if let Some(report) = &self.last_report {
                    ui.label(format!(
                        "Body: ({:.2}, {:.2}) m  rot {:.3}",
                        report.translation.x, report.translation.y, report.rotation
                    ));
                    ui.label(format!("Debug lines: {}", report.debug_segments));
                }
                ui.label(format!("Failed frames: {failures}"));
                ui.checkbox(&mut debug_render, "Debug render");
            });

        if debug_render != driver.config().debug_render {
            driver.set_debug_render(debug_render);
        }
    }
}

struct GpuApp {
    state: AppState,
    initial_size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(cli: &Cli) -> Self {
        Self {
            state: AppState::new(cli.driver_config(), !cli.no_stats),
            initial_size: PhysicalSize::new(cli.width, cli.height),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn draw_frame(&mut self) {
        let (Some(window), Some(surface), Some(device), Some(queue), Some(config)) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
        ) else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let (Some(renderer), Some(driver)) = (&self.renderer, &self.state.driver) {
            renderer.render(device, queue, &view, driver.scene());
        }

        let (Some(egui_winit), Some(egui_renderer)) =
            (&mut self.egui_winit, &mut self.egui_renderer)
        else {
            output.present();
            return;
        };

        let raw_input = egui_winit.take_egui_input(window);
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("rigidframe")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("rigidframe_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        // Scene colors are authored in sRGB already; avoid a second encode.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // The viewport is read once; later resizes only reconfigure the surface.
        if let Err(e) = self.state.start(config.width, config.height) {
            tracing::error!("failed to build demo scene: {e}");
            self.state.fatal = Some(e);
            event_loop.exit();
            return;
        }

        let renderer = WgpuRenderer::new(&device, surface_format);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend, viewport {}x{}",
            adapter.get_info().backend.to_str(),
            config.width,
            config.height
        );

        window.request_redraw();
        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                }
            }
            WindowEvent::RedrawRequested => {
                if !self.state.update() {
                    event_loop.exit();
                    return;
                }
                self.draw_frame();
                // One pending frame at a time: reschedule only after presenting.
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("rigidframe-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GpuApp::new(&cli);
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.state.fatal.take() {
        return Err(e.into());
    }
    Ok(())
}
