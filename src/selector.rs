//! Physical device selection.

use ash::vk::PhysicalDevice;
use std::ffi::CStr;

use crate::capabilities::{
    query_extension_support, query_queue_families, query_swapchain_support, CapabilitySource,
    QueueFamilyIndices, SwapchainSupport,
};
use crate::error::{BootstrapError, QueryError, Result};
use crate::gpu::Gpu;

/// Outcome of checking one candidate device.
#[derive(Debug, Clone)]
pub struct DeviceVerdict {
    pub gpu: Gpu,
    pub is_discrete: bool,
    pub extensions_supported: bool,
    pub swapchain_viable: bool,
    pub queue_families: QueueFamilyIndices,
    /// Queries the driver failed to answer; each one also fails its check.
    pub query_errors: Vec<QueryError>,
}

impl DeviceVerdict {
    pub fn is_accepted(&self) -> bool {
        self.is_discrete
            && self.extensions_supported
            && self.swapchain_viable
            && self.queue_families.is_complete()
    }

    fn log(&self, index: usize) {
        let name = self.gpu.name();
        for error in &self.query_errors {
            log::warn!("Device [{}] {}: {}", index, name, error);
        }
        if !self.is_discrete {
            log::info!("Device [{}] {}: invalid, not a discrete GPU", index, name);
        }
        if !self.extensions_supported {
            log::info!("Device [{}] {}: invalid, extensions unsupported", index, name);
        }
        if !self.swapchain_viable {
            log::info!("Device [{}] {}: invalid, swapchain unviable", index, name);
        }
        if self.queue_families.graphics_family.is_none() {
            log::info!("Device [{}] {}: invalid, graphics queue unsupported", index, name);
        }
        if self.queue_families.present_family.is_none() {
            log::info!("Device [{}] {}: invalid, present queue unsupported", index, name);
        }
        if self.is_accepted() {
            log::info!("Device [{}] {}: valid", index, name);
        }
    }
}

/// The device the rest of the run is built on.
#[derive(Debug, Clone)]
pub struct SelectedDevice {
    pub physical_device: PhysicalDevice,
    pub gpu: Gpu,
    pub queue_families: QueueFamilyIndices,
    pub swapchain_support: SwapchainSupport,
}

/// Runs all four checks against `device`. Failed queries count as missing capability.
pub fn evaluate_device<S: CapabilitySource + ?Sized>(
    source: &S,
    device: PhysicalDevice,
    required_extensions: &[&CStr],
) -> DeviceVerdict {
    let gpu = source.describe(device);
    let mut query_errors = Vec::new();

    let extensions_supported = query_extension_support(source, device, required_extensions)
        .unwrap_or_else(|error| {
            query_errors.push(error);
            false
        });

    // Surface queries depend on the swapchain extension being there.
    let swapchain_viable = extensions_supported
        && match query_swapchain_support(source, device) {
            Ok(support) => {
                support.log_summary();
                support.is_viable()
            }
            Err(error) => {
                query_errors.push(error);
                false
            }
        };

    let queue_families = query_queue_families(source, device).unwrap_or_else(|error| {
        query_errors.push(error);
        QueueFamilyIndices::default()
    });

    DeviceVerdict {
        is_discrete: gpu.is_discrete(),
        gpu,
        extensions_supported,
        swapchain_viable,
        queue_families,
        query_errors,
    }
}

/// Picks the device to use for this run.
///
/// Every candidate is evaluated and each accepted one replaces the previous
/// pick, so the last accepted device in enumeration order wins. There is no
/// ranking among accepted devices.
pub fn select_device<S: CapabilitySource + ?Sized>(
    source: &S,
    required_extensions: &[&CStr],
) -> Result<SelectedDevice> {
    let devices = source
        .physical_devices()
        .map_err(|error| BootstrapError::Vulkan(error.result))?;
    if devices.is_empty() {
        return Err(BootstrapError::NoPhysicalDevices);
    }

    let mut selected = None;
    for (index, &device) in devices.iter().enumerate() {
        let verdict = evaluate_device(source, device, required_extensions);
        verdict.gpu.log_summary(index);
        verdict.log(index);

        if verdict.is_accepted() {
            selected = Some((device, verdict.gpu));
        }
    }

    let (physical_device, gpu) = selected.ok_or(BootstrapError::NoSuitableDevice {
        candidates: devices.len(),
    })?;

    // Queried again rather than carried over from the verdict.
    let queue_families = query_queue_families(source, physical_device)?;
    let swapchain_support = query_swapchain_support(source, physical_device)?;

    log::info!("Selected device {} ({})", gpu.name(), gpu.type_name());

    Ok(SelectedDevice {
        physical_device,
        gpu,
        queue_families,
        swapchain_support,
    })
}
