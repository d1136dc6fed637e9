use ash::vk::{
    ColorSpaceKHR, CompositeAlphaFlagsKHR, Extent2D, Format, Image, ImageUsageFlags,
    PresentModeKHR, SharingMode, SurfaceCapabilitiesKHR, SurfaceFormatKHR, SurfaceKHR,
    SurfaceTransformFlagsKHR, SwapchainCreateInfoKHR, SwapchainKHR,
};

use crate::capabilities::{QueueFamilyIndices, SwapchainSupport};
use crate::error::{BootstrapError, Result};

/// `B8G8R8A8_SRGB` with the nonlinear sRGB color space if offered, else the first format.
pub fn choose_surface_format(formats: &[SurfaceFormatKHR]) -> Option<SurfaceFormatKHR> {
    formats
        .iter()
        .copied()
        .find(|format| {
            format.format == Format::B8G8R8A8_SRGB
                && format.color_space == ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first().copied())
}

/// Mailbox when available, otherwise FIFO which every driver must support.
pub fn choose_present_mode(present_modes: &[PresentModeKHR]) -> PresentModeKHR {
    present_modes
        .iter()
        .cloned()
        .find(|&mode| mode == PresentModeKHR::MAILBOX)
        .unwrap_or(PresentModeKHR::FIFO)
}

/// The surface's current extent, or `requested` clamped into the surface
/// bounds when the surface leaves the size up to the swapchain.
pub fn choose_extent(capabilities: &SurfaceCapabilitiesKHR, requested: Extent2D) -> Extent2D {
    match capabilities.current_extent.width {
        u32::MAX => Extent2D {
            width: requested.width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
            ),
            height: requested.height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
            ),
        },
        _ => capabilities.current_extent,
    }
}

/// One image more than the minimum; a `max_image_count` of zero means unbounded.
pub fn choose_image_count(capabilities: &SurfaceCapabilitiesKHR) -> u32 {
    let mut desired_image_count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && desired_image_count > capabilities.max_image_count {
        desired_image_count = capabilities.max_image_count;
    }
    desired_image_count
}

/// How swapchain images are shared between the graphics and present queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSharing {
    Exclusive,
    Concurrent([u32; 2]),
}

impl ImageSharing {
    pub fn from_queue_families(indices: &QueueFamilyIndices) -> Option<Self> {
        let (graphics, present) = indices.pair()?;
        if graphics == present {
            Some(ImageSharing::Exclusive)
        } else {
            Some(ImageSharing::Concurrent([graphics, present]))
        }
    }

    pub fn mode(&self) -> SharingMode {
        match self {
            ImageSharing::Exclusive => SharingMode::EXCLUSIVE,
            ImageSharing::Concurrent(_) => SharingMode::CONCURRENT,
        }
    }

    pub fn queue_family_indices(&self) -> &[u32] {
        match self {
            ImageSharing::Exclusive => &[],
            ImageSharing::Concurrent(indices) => indices,
        }
    }
}

/// Everything needed to build a swapchain for the selected device.
#[derive(Debug, Clone, Copy)]
pub struct SwapchainConfig {
    pub surface_format: SurfaceFormatKHR,
    pub present_mode: PresentModeKHR,
    pub extent: Extent2D,
    pub image_count: u32,
    pub pre_transform: SurfaceTransformFlagsKHR,
    pub sharing: ImageSharing,
}

impl SwapchainConfig {
    pub fn negotiate(
        support: &SwapchainSupport,
        queue_families: &QueueFamilyIndices,
        requested: Extent2D,
    ) -> Result<Self> {
        let surface_format =
            choose_surface_format(&support.formats).ok_or(BootstrapError::NoSurfaceFormat)?;
        let sharing = ImageSharing::from_queue_families(queue_families)
            .ok_or(BootstrapError::IncompleteQueueFamilies)?;

        Ok(Self {
            surface_format,
            present_mode: choose_present_mode(&support.present_modes),
            extent: choose_extent(&support.capabilities, requested),
            image_count: choose_image_count(&support.capabilities),
            pre_transform: support.capabilities.current_transform,
            sharing,
        })
    }
}

pub(crate) fn create_swapchain(
    swapchain_loader: &ash::khr::swapchain::Device,
    surface: SurfaceKHR,
    config: &SwapchainConfig,
) -> Result<(SwapchainKHR, Vec<Image>)> {
    let swapchain_create_info = SwapchainCreateInfoKHR::default()
        .surface(surface)
        .min_image_count(config.image_count)
        .image_color_space(config.surface_format.color_space)
        .image_format(config.surface_format.format)
        .image_extent(config.extent)
        .image_usage(ImageUsageFlags::COLOR_ATTACHMENT)
        .image_sharing_mode(config.sharing.mode())
        .queue_family_indices(config.sharing.queue_family_indices())
        .pre_transform(config.pre_transform)
        .composite_alpha(CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(config.present_mode)
        .clipped(true)
        .image_array_layers(1)
        .old_swapchain(SwapchainKHR::null());

    let swapchain = unsafe { swapchain_loader.create_swapchain(&swapchain_create_info, None)? };

    let images = match unsafe { swapchain_loader.get_swapchain_images(swapchain) } {
        Ok(images) => images,
        Err(error) => {
            unsafe { swapchain_loader.destroy_swapchain(swapchain, None) };
            return Err(error.into());
        }
    };

    Ok((swapchain, images))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn format(format: Format, color_space: ColorSpaceKHR) -> SurfaceFormatKHR {
        SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    fn pair(format: Option<SurfaceFormatKHR>) -> Option<(Format, ColorSpaceKHR)> {
        format.map(|f| (f.format, f.color_space))
    }

    fn bounds(min: u32, max: u32) -> SurfaceCapabilitiesKHR {
        SurfaceCapabilitiesKHR {
            current_extent: Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: Extent2D {
                width: min,
                height: min,
            },
            max_image_extent: Extent2D {
                width: max,
                height: max,
            },
            ..Default::default()
        }
    }

    fn size(extent: Extent2D) -> (u32, u32) {
        (extent.width, extent.height)
    }

    #[test]
    fn prefers_bgra_srgb_nonlinear() {
        let formats = [
            format(Format::R8G8B8A8_UNORM, ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT),
            format(Format::B8G8R8A8_SRGB, ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        assert_eq!(
            pair(choose_surface_format(&formats)),
            Some((Format::B8G8R8A8_SRGB, ColorSpaceKHR::SRGB_NONLINEAR))
        );
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [
            format(Format::R8G8B8A8_UNORM, ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT),
            format(Format::B8G8R8A8_SRGB, ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT),
        ];
        assert_eq!(
            pair(choose_surface_format(&formats[..1])),
            Some((
                Format::R8G8B8A8_UNORM,
                ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT
            ))
        );
        // Right format, wrong color space.
        assert_eq!(
            pair(choose_surface_format(&formats)),
            Some((
                Format::R8G8B8A8_UNORM,
                ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT
            ))
        );
        assert_eq!(pair(choose_surface_format(&[])), None);
    }

    #[test]
    fn present_mode_policy() {
        assert_eq!(
            choose_present_mode(&[PresentModeKHR::FIFO, PresentModeKHR::MAILBOX]),
            PresentModeKHR::MAILBOX
        );
        assert_eq!(
            choose_present_mode(&[PresentModeKHR::FIFO]),
            PresentModeKHR::FIFO
        );
        assert_eq!(
            choose_present_mode(&[PresentModeKHR::IMMEDIATE, PresentModeKHR::FIFO_RELAXED]),
            PresentModeKHR::FIFO
        );
    }

    #[test]
    fn current_extent_wins_when_defined() {
        let capabilities = SurfaceCapabilitiesKHR {
            current_extent: Extent2D {
                width: 800,
                height: 600,
            },
            ..bounds(64, 4096)
        };
        let requested = Extent2D {
            width: 1024,
            height: 1024,
        };
        assert_eq!(size(choose_extent(&capabilities, requested)), (800, 600));
    }

    #[test]
    fn undefined_extent_uses_request_within_bounds() {
        let requested = Extent2D {
            width: 1024,
            height: 1024,
        };
        assert_eq!(size(choose_extent(&bounds(64, 4096), requested)), (1024, 1024));
    }

    #[test]
    fn undefined_extent_clamps_request() {
        let too_big = Extent2D {
            width: 8192,
            height: 16,
        };
        assert_eq!(size(choose_extent(&bounds(64, 4096), too_big)), (4096, 64));
    }

    #[test]
    fn image_count_is_min_plus_one_capped() {
        let mut capabilities = SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(choose_image_count(&capabilities), 3);

        capabilities.max_image_count = 2;
        assert_eq!(choose_image_count(&capabilities), 2);

        capabilities.max_image_count = 8;
        assert_eq!(choose_image_count(&capabilities), 3);
    }

    #[test]
    fn sharing_follows_queue_families() {
        let shared = QueueFamilyIndices {
            graphics_family: Some(0),
            present_family: Some(0),
        };
        let sharing = ImageSharing::from_queue_families(&shared).unwrap();
        assert_eq!(sharing, ImageSharing::Exclusive);
        assert_eq!(sharing.mode(), SharingMode::EXCLUSIVE);
        assert!(sharing.queue_family_indices().is_empty());

        let split = QueueFamilyIndices {
            graphics_family: Some(0),
            present_family: Some(2),
        };
        let sharing = ImageSharing::from_queue_families(&split).unwrap();
        assert_eq!(sharing.mode(), SharingMode::CONCURRENT);
        assert_eq!(sharing.queue_family_indices(), &[0, 2]);

        assert_eq!(
            ImageSharing::from_queue_families(&QueueFamilyIndices::default()),
            None
        );
    }

    #[test]
    fn negotiate_requires_a_format() {
        let support = SwapchainSupport {
            capabilities: bounds(1, 10),
            formats: Vec::new(),
            present_modes: vec![PresentModeKHR::FIFO],
        };
        let indices = QueueFamilyIndices {
            graphics_family: Some(0),
            present_family: Some(0),
        };
        let requested = Extent2D {
            width: 4,
            height: 4,
        };
        assert!(matches!(
            SwapchainConfig::negotiate(&support, &indices, requested),
            Err(BootstrapError::NoSurfaceFormat)
        ));
    }

    #[test]
    fn negotiate_combines_policies() {
        let support = SwapchainSupport {
            capabilities: SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 3,
                current_transform: SurfaceTransformFlagsKHR::ROTATE_90,
                ..bounds(64, 4096)
            },
            formats: vec![
                format(Format::R8G8B8A8_UNORM, ColorSpaceKHR::SRGB_NONLINEAR),
                format(Format::B8G8R8A8_SRGB, ColorSpaceKHR::SRGB_NONLINEAR),
            ],
            present_modes: vec![PresentModeKHR::FIFO, PresentModeKHR::MAILBOX],
        };
        let indices = QueueFamilyIndices {
            graphics_family: Some(1),
            present_family: Some(0),
        };
        let requested = Extent2D {
            width: 1024,
            height: 768,
        };

        let config = SwapchainConfig::negotiate(&support, &indices, requested).unwrap();
        assert_eq!(config.surface_format.format, Format::B8G8R8A8_SRGB);
        assert_eq!(config.present_mode, PresentModeKHR::MAILBOX);
        assert_eq!(size(config.extent), (1024, 768));
        assert_eq!(config.image_count, 3);
        assert_eq!(config.pre_transform, SurfaceTransformFlagsKHR::ROTATE_90);
        assert_eq!(config.sharing, ImageSharing::Concurrent([1, 0]));
    }
}
