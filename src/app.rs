//! Window and event loop around the bootstrap. Nothing is drawn.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::rc::Rc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::capabilities::VulkanProbe;
use crate::config::BootstrapConfig;
use crate::device_context::DeviceContext;
use crate::error::{BootstrapError, Result};
use crate::selector::select_device;
use crate::surface::Surface;
use crate::swapchain::Swapchain;
use crate::vulkan::Vulkan;

/// Every Vulkan object created for the window, torn down in reverse order on drop.
pub struct Bootstrap {
    swapchain: Swapchain,
}

impl Bootstrap {
    pub fn new(config: &BootstrapConfig, window: &Window) -> Result<Self> {
        let display_handle = window.display_handle()?.as_raw();
        let window_handle = window.window_handle()?.as_raw();

        let vulkan = Rc::new(Vulkan::new(config, display_handle)?);
        let surface = Rc::new(Surface::new(vulkan.clone(), display_handle, window_handle)?);

        let selected = select_device(
            &VulkanProbe::new(&vulkan, &surface),
            &config.device_extensions,
        )?;
        let device = Rc::new(DeviceContext::new(vulkan, selected, config)?);
        let swapchain = Swapchain::new(device, surface, config.resolution)?;

        Ok(Self { swapchain })
    }

    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }
}

pub struct App {
    config: BootstrapConfig,
    // Declared before `window` so Vulkan objects go first.
    bootstrap: Option<Bootstrap>,
    window: Option<Window>,
    error: Option<BootstrapError>,
}

impl App {
    pub fn new(config: BootstrapConfig) -> Self {
        Self {
            config,
            bootstrap: None,
            window: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.config.app_name.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.resolution.width,
                self.config.resolution.height,
            ))
            .with_resizable(false);
        let window = event_loop.create_window(attributes)?;

        let bootstrap = Bootstrap::new(&self.config, &window)?;
        self.bootstrap = Some(bootstrap);
        self.window = Some(window);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(bootstrap) = self.bootstrap.take() {
            if let Err(error) = bootstrap.swapchain().device().wait() {
                log::warn!("Device wait before shutdown failed: {}", error);
            }
        }
        self.window = None;
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(error) = self.init(event_loop) {
            self.error = Some(error);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Opens the window, bootstraps Vulkan, and idles until the window closes.
pub fn run(config: BootstrapConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
