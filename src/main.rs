use anyhow::{Context, Result};
use depthbox_config::{AppConfig, TrackingSource};
use depthbox_input::PointerTracker;
use depthbox_renderer::{BoxRenderer, FrameDriver};
use depthbox_tracking::{
    LandmarkEngine, ModelAssets, VideoSource, VisionData, VisionError, VisionPipeline,
    VisionProvider, VisionStartup,
};
use glam::Vec3;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const DEFAULT_FILTER: &str =
    "depthbox_app=info,depthbox_tracking=info,depthbox_renderer=info,depthbox_input=info";
const INITIAL_SIZE: PhysicalSize<u32> = PhysicalSize::new(1280, 800);

/// Where tracking stands, for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisionStatus {
    Loading,
    Live,
    Degraded,
}

impl VisionStatus {
    fn label(self) -> &'static str {
        match self {
            VisionStatus::Loading => "initializing vision",
            VisionStatus::Live => "tracking",
            VisionStatus::Degraded => "no tracking",
        }
    }
}

/// Tracking source used when vision is switched off in the config.
struct DisabledProvider;

impl VisionProvider for DisabledProvider {
    fn open_video(&mut self) -> Result<Box<dyn VideoSource>, VisionError> {
        Err(VisionError::Unavailable("vision disabled in config".into()))
    }

    fn open_engine(&mut self) -> Result<Box<dyn LandmarkEngine>, VisionError> {
        Err(VisionError::Unavailable("vision disabled in config".into()))
    }
}

/// Application state.
struct App {
    pipeline: VisionPipeline,
    startup: Option<VisionStartup>,
    status: VisionStatus,
    pointer: PointerTracker,
    driver: FrameDriver,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    last_frame: Instant,
    last_vision: VisionData,
    fps: u32,
    title: String,
    frame_count: u64,
}

struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: BoxRenderer,
}

impl GpuState {
    fn new(window: Arc<Window>) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let (adapter, device, queue) = pollster::block_on(async {
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .context("No suitable GPU adapter found")?;

            info!(name = adapter.get_info().name, "Using GPU");

            let (device, queue) = adapter
                .request_device(
                    &wgpu::DeviceDescriptor {
                        label: Some("depthbox_device"),
                        required_features: wgpu::Features::empty(),
                        required_limits: wgpu::Limits::default(),
                        memory_hints: Default::default(),
                    },
                    None,
                )
                .await
                .context("Failed to create device")?;

            anyhow::Ok((adapter, device, queue))
        })?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .context("Surface reports no formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let renderer = BoxRenderer::new(
            &device,
            format,
            surface_config.width,
            surface_config.height,
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.renderer.resize(&self.device, size.width, size.height);
    }

    fn draw(&mut self, driver: &FrameDriver) {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(e) => {
                warn!(?e, "Failed to get surface texture");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let commands = self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &driver.scene,
            &driver.camera,
        );
        self.queue.submit(std::iter::once(commands));
        output.present();
    }
}

impl App {
    fn new(config: AppConfig, pointer: PointerTracker, startup: VisionStartup) -> Self {
        let aspect = INITIAL_SIZE.width as f32 / INITIAL_SIZE.height as f32;
        let mut driver = FrameDriver::new(
            config.window,
            Vec3::from_array(config.wall_color),
            aspect,
        );
        driver.parallax_enabled = config.parallax_enabled;
        driver.hand_control_enabled = config.hand_control_enabled;

        Self {
            pipeline: VisionPipeline::new(),
            startup: Some(startup),
            status: VisionStatus::Loading,
            pointer,
            driver,
            window: None,
            gpu: None,
            last_frame: Instant::now(),
            last_vision: VisionData::neutral(),
            fps: 0,
            title: String::new(),
            frame_count: 0,
        }
    }

    /// Pick up the startup result, or give up waiting once the fallback expires.
    fn poll_startup(&mut self) {
        let Some(startup) = &mut self.startup else {
            return;
        };

        match startup.poll() {
            Some(Ok(backend)) => {
                self.pipeline.attach(backend);
                self.status = VisionStatus::Live;
                self.startup = None;
            }
            Some(Err(e)) => {
                warn!(error = %e, "Vision startup failed, running without tracking");
                self.status = VisionStatus::Degraded;
                self.startup = None;
            }
            None => {
                if self.status == VisionStatus::Loading && startup.fallback_due_at(Instant::now())
                {
                    warn!("Vision not ready in time, running without tracking");
                    self.status = VisionStatus::Degraded;
                }
            }
        }
    }

    fn status_line(&self) -> String {
        let on_off = |on: bool| if on { "on" } else { "off" };
        format!(
            "depthbox | {} | face {} | hand {} | parallax {} | hand control {} | {} fps",
            self.status.label(),
            on_off(self.last_vision.head.active),
            on_off(self.last_vision.hand.active),
            on_off(self.driver.parallax_enabled),
            on_off(self.driver.hand_control_enabled),
            self.fps,
        )
    }

    fn refresh_title(&mut self) {
        let title = self.status_line();
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::KeyP => {
                self.driver.parallax_enabled = !self.driver.parallax_enabled;
                info!(enabled = self.driver.parallax_enabled, "Parallax toggled");
            }
            KeyCode::KeyH => {
                self.driver.hand_control_enabled = !self.driver.hand_control_enabled;
                info!(enabled = self.driver.hand_control_enabled, "Hand control toggled");
            }
            KeyCode::F5 | KeyCode::KeyC => {
                self.pipeline.calibrate();
            }
            KeyCode::Escape => {
                self.shutdown();
                event_loop.exit();
            }
            _ => {}
        }
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.poll_startup();

        let vision = self.pipeline.process();
        let report = self.driver.step(&vision, self.pipeline.now_ms(), delta);
        self.last_vision = vision;
        if let Some(fps) = report.fps {
            self.fps = fps;
        }

        if let Some(gpu) = &mut self.gpu {
            gpu.draw(&self.driver);
        }

        self.frame_count += 1;
        if self.frame_count % 300 == 0 {
            debug!(
                frames = self.frame_count,
                depth = report.depth,
                head_coupled = report.head_coupled,
                "Render heartbeat"
            );
        }

        self.refresh_title();
    }

    /// Stop startup and release the video source, detectors and GPU resources.
    fn shutdown(&mut self) {
        if let Some(startup) = self.startup.take() {
            startup.cancel();
        }
        self.pipeline.shutdown();
        if self.gpu.take().is_some() {
            info!("GPU resources released");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.status_line())
            .with_inner_size(INITIAL_SIZE);

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!(?e, "Failed to create window");
                event_loop.exit();
                return;
            }
        };

        match GpuState::new(window.clone()) {
            Ok(gpu) => {
                let size = window.inner_size();
                self.driver
                    .set_aspect_ratio(size.width as f32 / size.height.max(1) as f32);
                self.pointer
                    .set_window_size(size.width as f32, size.height as f32);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                error!(?e, "GPU initialization failed");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
        info!("Application initialized");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    if let Some(gpu) = &mut self.gpu {
                        gpu.resize(size);
                    }
                    self.driver
                        .set_aspect_ratio(size.width as f32 / size.height as f32);
                    self.pointer
                        .set_window_size(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        self.on_key(event_loop, key);
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.on_cursor_moved(position.x, position.y);
            }

            WindowEvent::CursorLeft { .. } => {
                self.pointer.on_cursor_left();
            }

            WindowEvent::MouseInput { button, state, .. } => {
                self.pointer.on_mouse_button(button, state);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.pointer.on_scroll(delta);
            }

            WindowEvent::RedrawRequested => {
                self.frame();

                // Request next frame.
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .init();

    info!("depthbox starting");

    let config = depthbox_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    info!(
        source = ?config.vision.source,
        window = ?config.window,
        parallax = config.parallax_enabled,
        hand_control = config.hand_control_enabled,
        "Config loaded"
    );

    let pointer = PointerTracker::new(INITIAL_SIZE.width as f32, INITIAL_SIZE.height as f32);
    let provider: Box<dyn VisionProvider> = match config.vision.source {
        TrackingSource::Pointer => Box::new(pointer.provider()),
        TrackingSource::Disabled => Box::new(DisabledProvider),
    };
    let startup = VisionStartup::spawn(provider, ModelAssets::new(&config.vision.model_base));

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, pointer, startup);
    event_loop.run_app(&mut app)?;

    Ok(())
}
