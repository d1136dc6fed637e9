//! Per-device capability queries.
//!
//! Every driver call the device selector depends on goes through
//! [`CapabilitySource`], so the queries below work the same against a live
//! instance ([`VulkanProbe`]) and against a scripted device list.

use ash::vk::{
    PhysicalDevice, PresentModeKHR, QueueFamilyProperties, QueueFlags,
    SurfaceCapabilitiesKHR, SurfaceFormatKHR,
};
use std::collections::BTreeSet;
use std::ffi::{CStr, CString};

use crate::error::{QueryError, QueryKind};
use crate::gpu::Gpu;
use crate::surface::Surface;
use crate::vulkan::Vulkan;

/// Raw, driver-level answers about physical devices and one surface.
pub trait CapabilitySource {
    fn physical_devices(&self) -> Result<Vec<PhysicalDevice>, QueryError>;

    fn describe(&self, device: PhysicalDevice) -> Gpu;

    fn queue_family_properties(&self, device: PhysicalDevice) -> Vec<QueueFamilyProperties>;

    fn surface_support(
        &self,
        device: PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool, QueryError>;

    fn extension_names(&self, device: PhysicalDevice) -> Result<Vec<CString>, QueryError>;

    fn surface_capabilities(
        &self,
        device: PhysicalDevice,
    ) -> Result<SurfaceCapabilitiesKHR, QueryError>;

    fn surface_formats(&self, device: PhysicalDevice)
        -> Result<Vec<SurfaceFormatKHR>, QueryError>;

    fn present_modes(&self, device: PhysicalDevice) -> Result<Vec<PresentModeKHR>, QueryError>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics_family: Option<u32>,
    pub present_family: Option<u32>,
}

impl QueueFamilyIndices {
    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /// `(graphics, present)` once both are known.
    pub fn pair(&self) -> Option<(u32, u32)> {
        Some((self.graphics_family?, self.present_family?))
    }

    /// Families to create queues on: one entry when graphics and present share a family.
    pub fn unique_families(&self) -> Vec<u32> {
        self.graphics_family
            .into_iter()
            .chain(self.present_family)
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect()
    }
}

/// Snapshot of what one device can do with the surface.
#[derive(Debug, Default, Clone)]
pub struct SwapchainSupport {
    pub capabilities: SurfaceCapabilitiesKHR,
    pub formats: Vec<SurfaceFormatKHR>,
    pub present_modes: Vec<PresentModeKHR>,
}

impl SwapchainSupport {
    /// A swapchain can only be built when both lists are non-empty.
    pub fn is_viable(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }

    pub(crate) fn log_summary(&self) {
        let caps = &self.capabilities;
        log::debug!(
            "Swapchain capabilities: images {}..{} current {}x{} min {}x{} max {}x{} layers {}",
            caps.min_image_count,
            caps.max_image_count,
            caps.current_extent.width,
            caps.current_extent.height,
            caps.min_image_extent.width,
            caps.min_image_extent.height,
            caps.max_image_extent.width,
            caps.max_image_extent.height,
            caps.max_image_array_layers,
        );
        log::debug!(
            "Swapchain formats: {:?}",
            self.formats
                .iter()
                .map(|f| (f.format, f.color_space))
                .collect::<Vec<_>>()
        );
        log::debug!("Swapchain present modes: {:?}", self.present_modes);
    }
}

/// Scans queue families in driver order until both a graphics and a present
/// family are known.
///
/// Within the scanned prefix a later matching family replaces an earlier one,
/// so the result is not necessarily the lowest index for each role.
pub fn query_queue_families<S: CapabilitySource + ?Sized>(
    source: &S,
    device: PhysicalDevice,
) -> Result<QueueFamilyIndices, QueryError> {
    let mut indices = QueueFamilyIndices::default();

    for (index, family) in source.queue_family_properties(device).iter().enumerate() {
        let index = index as u32;
        if family.queue_flags.contains(QueueFlags::GRAPHICS) {
            indices.graphics_family = Some(index);
        }

        if source.surface_support(device, index)? {
            indices.present_family = Some(index);
        }

        if indices.is_complete() {
            break;
        }
    }

    Ok(indices)
}

/// True iff every name in `required` is among the device's extensions.
pub fn query_extension_support<S: CapabilitySource + ?Sized>(
    source: &S,
    device: PhysicalDevice,
    required: &[&CStr],
) -> Result<bool, QueryError> {
    let mut missing: BTreeSet<&CStr> = required.iter().copied().collect();
    for name in source.extension_names(device)? {
        missing.remove(name.as_c_str());
    }

    if !missing.is_empty() {
        log::debug!("Missing device extensions: {:?}", missing);
    }

    Ok(missing.is_empty())
}

pub fn query_swapchain_support<S: CapabilitySource + ?Sized>(
    source: &S,
    device: PhysicalDevice,
) -> Result<SwapchainSupport, QueryError> {
    let capabilities = source.surface_capabilities(device)?;
    let formats = source.surface_formats(device)?;
    let present_modes = source.present_modes(device)?;

    Ok(SwapchainSupport {
        capabilities,
        formats,
        present_modes,
    })
}

/// [`CapabilitySource`] backed by a live instance and surface.
pub struct VulkanProbe<'a> {
    vulkan: &'a Vulkan,
    surface: &'a Surface,
}

impl<'a> VulkanProbe<'a> {
    pub fn new(vulkan: &'a Vulkan, surface: &'a Surface) -> Self {
        Self { vulkan, surface }
    }
}

impl CapabilitySource for VulkanProbe<'_> {
    fn physical_devices(&self) -> Result<Vec<PhysicalDevice>, QueryError> {
        unsafe {
            self.vulkan
                .vk_instance()
                .enumerate_physical_devices()
                .map_err(|result| QueryError::new(QueryKind::Enumerate, result))
        }
    }

    fn describe(&self, device: PhysicalDevice) -> Gpu {
        let properties = unsafe {
            self.vulkan
                .vk_instance()
                .get_physical_device_properties(device)
        };
        Gpu::from_properties(&properties)
    }

    fn queue_family_properties(&self, device: PhysicalDevice) -> Vec<QueueFamilyProperties> {
        unsafe {
            self.vulkan
                .vk_instance()
                .get_physical_device_queue_family_properties(device)
        }
    }

    fn surface_support(
        &self,
        device: PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool, QueryError> {
        unsafe {
            self.surface
                .loader()
                .get_physical_device_surface_support(
                    device,
                    queue_family_index,
                    self.surface.handle(),
                )
                .map_err(|result| QueryError::new(QueryKind::SurfaceSupport, result))
        }
    }

    fn extension_names(&self, device: PhysicalDevice) -> Result<Vec<CString>, QueryError> {
        let properties = unsafe {
            self.vulkan
                .vk_instance()
                .enumerate_device_extension_properties(device)
                .map_err(|result| QueryError::new(QueryKind::Extensions, result))?
        };

        Ok(properties
            .iter()
            .filter_map(|extension| extension.extension_name_as_c_str().ok())
            .map(CStr::to_owned)
            .collect())
    }

    fn surface_capabilities(
        &self,
        device: PhysicalDevice,
    ) -> Result<SurfaceCapabilitiesKHR, QueryError> {
        unsafe {
            self.surface
                .loader()
                .get_physical_device_surface_capabilities(device, self.surface.handle())
                .map_err(|result| QueryError::new(QueryKind::Capabilities, result))
        }
    }

    fn surface_formats(
        &self,
        device: PhysicalDevice,
    ) -> Result<Vec<SurfaceFormatKHR>, QueryError> {
        unsafe {
            self.surface
                .loader()
                .get_physical_device_surface_formats(device, self.surface.handle())
                .map_err(|result| QueryError::new(QueryKind::Formats, result))
        }
    }

    fn present_modes(&self, device: PhysicalDevice) -> Result<Vec<PresentModeKHR>, QueryError> {
        unsafe {
            self.surface
                .loader()
                .get_physical_device_surface_present_modes(device, self.surface.handle())
                .map_err(|result| QueryError::new(QueryKind::PresentModes, result))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::{self, Handle};

    /// One device whose families are `(graphics, present)` flags.
    struct Families(Vec<(bool, bool)>);

    impl CapabilitySource for Families {
        fn physical_devices(&self) -> Result<Vec<PhysicalDevice>, QueryError> {
            Ok(vec![PhysicalDevice::from_raw(1)])
        }

        fn describe(&self, _: PhysicalDevice) -> Gpu {
            Gpu::new("families", vk::PhysicalDeviceType::DISCRETE_GPU)
        }

        fn queue_family_properties(&self, _: PhysicalDevice) -> Vec<QueueFamilyProperties> {
            self.0
                .iter()
                .map(|&(graphics, _)| QueueFamilyProperties {
                    queue_flags: if graphics {
                        QueueFlags::GRAPHICS | QueueFlags::TRANSFER
                    } else {
                        QueueFlags::TRANSFER
                    },
                    queue_count: 1,
                    ..Default::default()
                })
                .collect()
        }

        fn surface_support(&self, _: PhysicalDevice, index: u32) -> Result<bool, QueryError> {
            Ok(self.0[index as usize].1)
        }

        fn extension_names(&self, _: PhysicalDevice) -> Result<Vec<CString>, QueryError> {
            Ok(vec![
                c"VK_KHR_swapchain".to_owned(),
                c"VK_KHR_maintenance1".to_owned(),
            ])
        }

        fn surface_capabilities(
            &self,
            _: PhysicalDevice,
        ) -> Result<SurfaceCapabilitiesKHR, QueryError> {
            Ok(SurfaceCapabilitiesKHR::default())
        }

        fn surface_formats(&self, _: PhysicalDevice) -> Result<Vec<SurfaceFormatKHR>, QueryError> {
            Ok(Vec::new())
        }

        fn present_modes(&self, _: PhysicalDevice) -> Result<Vec<PresentModeKHR>, QueryError> {
            Err(QueryError::new(
                QueryKind::PresentModes,
                vk::Result::ERROR_SURFACE_LOST_KHR,
            ))
        }
    }

    fn scan(families: Vec<(bool, bool)>) -> QueueFamilyIndices {
        let source = Families(families);
        query_queue_families(&source, PhysicalDevice::from_raw(1)).unwrap()
    }

    #[test]
    fn shared_family() {
        let indices = scan(vec![(true, true), (true, true)]);
        assert_eq!(indices.pair(), Some((0, 0)));
        assert_eq!(indices.unique_families(), vec![0]);
    }

    #[test]
    fn separate_families() {
        let indices = scan(vec![(true, false), (false, true)]);
        assert_eq!(indices.pair(), Some((0, 1)));
        assert_eq!(indices.unique_families(), vec![0, 1]);
    }

    #[test]
    fn missing_roles_stay_absent() {
        let no_graphics = scan(vec![(false, true), (false, true)]);
        assert_eq!(no_graphics.graphics_family, None);
        assert_eq!(no_graphics.present_family, Some(1));
        assert!(!no_graphics.is_complete());

        let no_present = scan(vec![(true, false)]);
        assert_eq!(no_present.graphics_family, Some(0));
        assert_eq!(no_present.present_family, None);

        assert_eq!(scan(Vec::new()), QueueFamilyIndices::default());
    }

    #[test]
    fn scan_stops_once_both_known() {
        // Family 1 replaces family 0 as graphics before family 2 completes the pair;
        // family 3 is never looked at.
        let indices = scan(vec![(true, false), (true, false), (false, true), (true, true)]);
        assert_eq!(indices.pair(), Some((1, 2)));
    }

    #[test]
    fn extension_check_is_subset() {
        let source = Families(vec![(true, true)]);
        let device = PhysicalDevice::from_raw(1);

        assert!(query_extension_support(&source, device, &[c"VK_KHR_swapchain"]).unwrap());
        assert!(query_extension_support(&source, device, &[]).unwrap());
        assert!(!query_extension_support(
            &source,
            device,
            &[c"VK_KHR_swapchain", c"VK_KHR_ray_query"]
        )
        .unwrap());
    }

    #[test]
    fn swapchain_query_reports_failing_step() {
        let source = Families(vec![(true, true)]);
        let error = query_swapchain_support(&source, PhysicalDevice::from_raw(1)).unwrap_err();
        assert_eq!(error.kind, QueryKind::PresentModes);
    }

    #[test]
    fn empty_lists_are_not_viable() {
        let support = SwapchainSupport {
            formats: vec![SurfaceFormatKHR::default()],
            ..Default::default()
        };
        assert!(!support.is_viable());
    }
}
