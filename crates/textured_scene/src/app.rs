use tracing::error;
use tracing::info;
use tracing::warn;
use windows::core::HSTRING;
use windows::core::PCWSTR;

use crate::config::DemoConfig;
use crate::d3d12::create_device;
use crate::d3d12::report_live_objects;
use crate::d3d12::D3D12Fence;
use crate::d3d12::GpuDevice;
use crate::d3d12::OverlayRenderer;
use crate::d3d12::RenderContext;
use crate::d3d12::SceneCommands;
use crate::d3d12::SceneResources;
use crate::demo_error::DemoResult;
use crate::frame::run_frame;
use crate::frame_record::record_frame;
use crate::frame_record::BackBufferStates;
use crate::frame_sync::FrameSync;
use crate::keyboard::KeyboardState;
use crate::math::SceneCamera;
use crate::model::load_obj_file;
use crate::overlay::Overlay;
use crate::overlay::SceneSettings;
use crate::texture::load_texture_or_fallback;
use crate::win32::create_window;
use crate::win32::create_window_class_struct;
use crate::win32::get_handle_to_file_used_to_create_the_calling_process;
use crate::win32::poll_keyboard;
use crate::win32::pump_messages;
use crate::win32::register_window_class;
use crate::win32::OwnedWindow;
use crate::win32::PumpResult;
use crate::win32::SceneWindow;
use crate::win32::SceneWindowData;

const KEY_A: u8 = b'A';

/// The running demo. Fields drop in declaration order: GPU objects first,
/// the device after them, the window last.
pub struct App {
    scene: SceneResources,
    overlay_renderer: OverlayRenderer,
    sync: FrameSync<D3D12Fence>,
    context: RenderContext,
    _gpu: GpuDevice,
    window: OwnedWindow<SceneWindow>,
    overlay: Overlay,
    settings: SceneSettings,
    camera: SceneCamera,
    keyboard: KeyboardState,
    back_buffers: BackBufferStates,
    config: DemoConfig,
}

impl App {
    pub fn new(config: DemoConfig) -> DemoResult<Self> {
        let our_module = get_handle_to_file_used_to_create_the_calling_process()?;
        let class_name = HSTRING::from(config.window_class.as_str());
        let window_class =
            create_window_class_struct::<SceneWindow>(our_module, PCWSTR(class_name.as_ptr()))?;
        let class = register_window_class(&window_class)?;

        let window = create_window::<SceneWindow>(
            our_module,
            &class,
            &HSTRING::from(config.window_title()),
            config.client_width,
            config.client_height,
            SceneWindowData::default(),
        )?;
        window.show();

        let gpu = create_device(&config)?;
        let context = RenderContext::bind_to_window(&gpu, window.hwnd(), &config)?;
        let sync = FrameSync::new(context.create_fence()?);

        let resource_directory = config.resolve_resource_directory();
        let model = load_obj_file(&resource_directory, &config.model_file)?;
        let texture = load_texture_or_fallback(&model.material.texture_file_path);
        let scene = SceneResources::new(&context, &model, &texture)?;
        let overlay_renderer = OverlayRenderer::new(&context)?;

        info!(model = %resource_directory.join(&config.model_file).display(), "demo ready");
        Ok(Self {
            scene,
            overlay_renderer,
            sync,
            context,
            _gpu: gpu,
            window,
            overlay: Overlay::default(),
            settings: SceneSettings::default(),
            camera: SceneCamera::new(config.client_width, config.client_height),
            keyboard: KeyboardState::default(),
            back_buffers: BackBufferStates::default(),
            config,
        })
    }

    /// Runs frames until the window closes or the device is lost.
    pub fn run(&mut self) -> DemoResult<()> {
        loop {
            if pump_messages() == PumpResult::Quit {
                info!("window closed");
                return Ok(());
            }

            poll_keyboard(&mut self.keyboard)?;
            if self.keyboard.is_triggered(KEY_A) {
                info!("Hit A");
            }

            if let Err(e) = self.update().and_then(|()| self.render()) {
                if e.is_device_lost() {
                    error!("device lost, stopping: {e}");
                }
                return Err(e);
            }
        }
    }

    /// Runs the settings UI and writes this frame's constants. The previous
    /// frame has fully retired, so mapped buffers are free to overwrite.
    fn update(&mut self) -> DemoResult<()> {
        self.sync.ensure_reusable()?;

        let screen = [self.config.client_width, self.config.client_height];
        let window_data = self.window.data_mut();
        let draw_list = self
            .overlay
            .run(&mut window_data.input, screen, &mut self.settings);
        window_data.overlay_wants_pointer = self.overlay.wants_pointer_input();
        window_data.overlay_wants_keyboard = self.overlay.wants_keyboard_input();

        self.overlay_renderer
            .prepare(&self.context, self.overlay.atlas_mut(), draw_list)?;
        self.scene.update(
            self.camera.model_wvp(&self.settings.model),
            self.camera.sprite_wvp(&self.settings.sprite),
            self.settings.material_color,
        )
    }

    fn render(&mut self) -> DemoResult<()> {
        let Self {
            scene,
            overlay_renderer,
            sync,
            context,
            back_buffers,
            config,
            ..
        } = self;
        run_frame(context, sync, |context, back_buffer| {
            let mut commands = SceneCommands {
                context,
                scene,
                overlay: overlay_renderer,
            };
            record_frame(&mut commands, back_buffers, back_buffer, config.clear_color)
        })
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = self.sync.wait_for_gpu() {
            warn!("failed waiting for the GPU at shutdown: {e}");
        }
    }
}

/// Opens the window, runs the demo, and tears everything down before
/// reporting leaked DXGI objects.
pub fn run(config: DemoConfig) -> DemoResult<()> {
    let result = App::new(config).and_then(|mut app| app.run());
    report_live_objects();
    result
}
