pub mod app;
pub mod capabilities;
pub mod config;
pub mod device_context;
pub mod error;
pub mod gpu;
pub mod selector;
pub mod surface;
pub mod swapchain;
pub mod swapchain_util;
pub mod vulkan;

pub use ash::vk::{Extent2D, PhysicalDevice, PhysicalDeviceType, PresentModeKHR, QueueFlags};
pub use capabilities::{CapabilitySource, QueueFamilyIndices, SwapchainSupport};
pub use error::{BootstrapError, QueryError, QueryKind};
pub use selector::{evaluate_device, select_device, DeviceVerdict, SelectedDevice};
