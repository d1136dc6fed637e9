use ash::vk::{DeviceCreateInfo, DeviceQueueCreateInfo, PhysicalDeviceFeatures, Queue};
use ash::Device;
use std::rc::Rc;

use crate::config::BootstrapConfig;
use crate::error::{BootstrapError, Result};
use crate::selector::SelectedDevice;
use crate::vulkan::Vulkan;

/// Logical device with its graphics and present queues.
pub struct DeviceContext {
    vulkan: Rc<Vulkan>,
    selected: SelectedDevice,
    handle: Device,
    graphics_queue: Queue,
    present_queue: Queue,
}

impl DeviceContext {
    pub fn new(
        vulkan: Rc<Vulkan>,
        selected: SelectedDevice,
        config: &BootstrapConfig,
    ) -> Result<Self> {
        let (graphics_family, present_family) = selected
            .queue_families
            .pair()
            .ok_or(BootstrapError::IncompleteQueueFamilies)?;

        let priorities: [f32; 1] = [1.];
        let queue_infos: Vec<DeviceQueueCreateInfo> = selected
            .queue_families
            .unique_families()
            .into_iter()
            .map(|index| {
                DeviceQueueCreateInfo::default()
                    .queue_priorities(&priorities)
                    .queue_family_index(index)
            })
            .collect();

        let extension_names_raw: Vec<*const std::os::raw::c_char> = config
            .device_extensions
            .iter()
            .map(|extension| extension.as_ptr())
            .collect();

        let layer_names_raw: Vec<*const std::os::raw::c_char> = config
            .active_layers()
            .iter()
            .map(|layer_name| layer_name.as_ptr())
            .collect();

        let features = PhysicalDeviceFeatures::default();
        // Device layers are deprecated but older loaders still honor them.
        #[allow(deprecated)]
        let create_info = DeviceCreateInfo::default()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extension_names_raw)
            .enabled_layer_names(&layer_names_raw)
            .enabled_features(&features);

        let handle = unsafe {
            vulkan
                .vk_instance()
                .create_device(selected.physical_device, &create_info, None)?
        };

        let (graphics_queue, present_queue) = unsafe {
            (
                handle.get_device_queue(graphics_family, 0),
                handle.get_device_queue(present_family, 0),
            )
        };

        log::info!(
            "Created logical device on {} (graphics family {}, present family {})",
            selected.gpu.name(),
            graphics_family,
            present_family
        );

        Ok(Self {
            vulkan,
            selected,
            handle,
            graphics_queue,
            present_queue,
        })
    }

    pub fn graphics_queue(&self) -> Queue {
        self.graphics_queue
    }

    pub fn present_queue(&self) -> Queue {
        self.present_queue
    }

    pub fn wait(&self) -> Result<()> {
        unsafe { self.handle.device_wait_idle()? };
        Ok(())
    }

    pub fn handle(&self) -> &Device {
        &self.handle
    }

    pub fn selected(&self) -> &SelectedDevice {
        &self.selected
    }

    pub fn vulkan(&self) -> &Rc<Vulkan> {
        &self.vulkan
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        unsafe {
            self.handle.destroy_device(None);
        }
    }
}
