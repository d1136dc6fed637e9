use ash::vk::Extent2D;
use std::ffi::{CStr, CString};

pub const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

const VALIDATION_ENV: &str = "VK_BOOTSTRAP_VALIDATION";

/// Startup settings threaded through every bootstrap step.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub app_name: String,
    /// Window size, also the fallback swapchain extent.
    pub resolution: Extent2D,
    pub enable_validation: bool,
    pub validation_layers: Vec<CString>,
    pub device_extensions: Vec<&'static CStr>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("Vulkan"),
            resolution: Extent2D {
                width: 1024,
                height: 1024,
            },
            enable_validation: cfg!(debug_assertions),
            validation_layers: vec![VALIDATION_LAYER.to_owned()],
            device_extensions: vec![ash::khr::swapchain::NAME],
        }
    }
}

impl BootstrapConfig {
    /// Defaults, with validation overridable through `VK_BOOTSTRAP_VALIDATION`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(VALIDATION_ENV) {
            match parse_toggle(&value) {
                Some(enabled) => config.enable_validation = enabled,
                None => log::warn!("Ignoring {}={:?}, expected 0 or 1", VALIDATION_ENV, value),
            }
        }
        config
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = enabled;
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Extent2D { width, height };
        self
    }

    /// Layers to enable on the instance and device, empty when validation is off.
    pub fn active_layers(&self) -> &[CString] {
        if self.enable_validation {
            &self.validation_layers
        } else {
            &[]
        }
    }
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_requires_swapchain_only() {
        let config = BootstrapConfig::default();
        assert_eq!(config.device_extensions, vec![ash::khr::swapchain::NAME]);
        assert_eq!(
            (config.resolution.width, config.resolution.height),
            (1024, 1024)
        );
    }

    #[test]
    fn layers_follow_validation_toggle() {
        let config = BootstrapConfig::default().with_validation(false);
        assert!(config.active_layers().is_empty());

        let config = config.with_validation(true);
        assert_eq!(config.active_layers(), &[VALIDATION_LAYER.to_owned()]);
    }

    #[test]
    fn toggle_parsing() {
        assert_eq!(parse_toggle("1"), Some(true));
        assert_eq!(parse_toggle(" Off "), Some(false));
        assert_eq!(parse_toggle("maybe"), None);
    }
}
