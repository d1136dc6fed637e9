use ash::vk::SurfaceKHR;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::rc::Rc;

use crate::error::Result;
use crate::vulkan::Vulkan;

/// Presentation target for one window.
pub struct Surface {
    vulkan: Rc<Vulkan>,
    loader: ash::khr::surface::Instance,
    handle: SurfaceKHR,
}

impl Surface {
    pub fn new(
        vulkan: Rc<Vulkan>,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> Result<Self> {
        let handle = unsafe {
            ash_window::create_surface(
                vulkan.library(),
                vulkan.vk_instance(),
                display_handle,
                window_handle,
                None,
            )?
        };
        let loader = ash::khr::surface::Instance::new(vulkan.library(), vulkan.vk_instance());

        Ok(Self {
            vulkan,
            loader,
            handle,
        })
    }

    pub fn handle(&self) -> SurfaceKHR {
        self.handle
    }

    pub fn loader(&self) -> &ash::khr::surface::Instance {
        &self.loader
    }

    pub fn vulkan(&self) -> &Rc<Vulkan> {
        &self.vulkan
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.handle, None);
        }
    }
}
