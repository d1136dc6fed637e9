use ash::vk::{PhysicalDeviceProperties, PhysicalDeviceType};

/// Descriptive facts about a physical device, as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gpu {
    name: String,
    device_type: PhysicalDeviceType,
    api_version: u32,
    driver_version: u32,
    vendor_id: u32,
    device_id: u32,
}

impl Gpu {
    pub fn new(name: impl Into<String>, device_type: PhysicalDeviceType) -> Self {
        Self {
            name: name.into(),
            device_type,
            api_version: 0,
            driver_version: 0,
            vendor_id: 0,
            device_id: 0,
        }
    }

    pub fn from_properties(properties: &PhysicalDeviceProperties) -> Self {
        let name = properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            device_type: properties.device_type,
            api_version: properties.api_version,
            driver_version: properties.driver_version,
            vendor_id: properties.vendor_id,
            device_id: properties.device_id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_type(&self) -> PhysicalDeviceType {
        self.device_type
    }

    pub fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    pub fn driver_version(&self) -> u32 {
        self.driver_version
    }

    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    pub fn is_discrete(&self) -> bool {
        self.device_type == PhysicalDeviceType::DISCRETE_GPU
    }

    pub fn is_virtual(&self) -> bool {
        self.device_type == PhysicalDeviceType::VIRTUAL_GPU
    }

    pub fn type_name(&self) -> &'static str {
        match self.device_type {
            PhysicalDeviceType::INTEGRATED_GPU => "Integrated",
            PhysicalDeviceType::DISCRETE_GPU => "Discrete",
            PhysicalDeviceType::VIRTUAL_GPU => "Virtual",
            PhysicalDeviceType::CPU => "CPU",
            _ => "Other",
        }
    }

    pub(crate) fn log_summary(&self, index: usize) {
        log::debug!(
            "Device [{}] {} ({}) api {}.{}.{} driver {:#x} vendor {:#06x} device {:#06x}",
            index,
            self.name,
            self.type_name(),
            ash::vk::api_version_major(self.api_version),
            ash::vk::api_version_minor(self.api_version),
            ash::vk::api_version_patch(self.api_version),
            self.driver_version,
            self.vendor_id,
            self.device_id,
        );
    }
}
