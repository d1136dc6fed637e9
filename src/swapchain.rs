use ash::vk::{Extent2D, Format, Image, PresentModeKHR, SwapchainKHR};
use std::rc::Rc;

use crate::device_context::DeviceContext;
use crate::error::Result;
use crate::surface::Surface;
use crate::swapchain_util::{create_swapchain, SwapchainConfig};

pub struct Swapchain {
    device: Rc<DeviceContext>,
    surface: Rc<Surface>,
    swapchain_loader: ash::khr::swapchain::Device,
    handle: SwapchainKHR,
    images: Vec<Image>,
    config: SwapchainConfig,
}

impl Swapchain {
    /// Builds a swapchain for `surface` from the selected device's snapshot.
    pub fn new(device: Rc<DeviceContext>, surface: Rc<Surface>, requested: Extent2D) -> Result<Self> {
        let selected = device.selected();
        let config = SwapchainConfig::negotiate(
            &selected.swapchain_support,
            &selected.queue_families,
            requested,
        )?;

        let swapchain_loader =
            ash::khr::swapchain::Device::new(device.vulkan().vk_instance(), device.handle());
        let (handle, images) = create_swapchain(&swapchain_loader, surface.handle(), &config)?;

        log::info!(
            "Created swapchain: {} images {:?} {:?} {}x{} {:?}",
            images.len(),
            config.surface_format.format,
            config.surface_format.color_space,
            config.extent.width,
            config.extent.height,
            config.present_mode,
        );

        Ok(Self {
            device,
            surface,
            swapchain_loader,
            handle,
            images,
            config,
        })
    }

    pub fn handle(&self) -> SwapchainKHR {
        self.handle
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn device(&self) -> &DeviceContext {
        &self.device
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn format(&self) -> Format {
        self.config.surface_format.format
    }

    pub fn extent(&self) -> Extent2D {
        self.config.extent
    }

    pub fn present_mode(&self) -> PresentModeKHR {
        self.config.present_mode
    }

    pub fn config(&self) -> &SwapchainConfig {
        &self.config
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            self.swapchain_loader.destroy_swapchain(self.handle, None);
        }
    }
}
