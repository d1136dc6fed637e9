use ash::ext::debug_utils;
use ash::vk::{
    ApplicationInfo, Bool32, DebugUtilsMessageSeverityFlagsEXT, DebugUtilsMessageTypeFlagsEXT,
    DebugUtilsMessengerCallbackDataEXT, DebugUtilsMessengerCreateInfoEXT, DebugUtilsMessengerEXT,
    InstanceCreateInfo, API_VERSION_1_0, FALSE,
};
pub use ash::{Entry, Instance};
use raw_window_handle::RawDisplayHandle;
use std::borrow::Cow;
use std::ffi::{CStr, CString};

use crate::config::BootstrapConfig;
use crate::error::{BootstrapError, Result};

unsafe extern "system" fn vulkan_debug_callback(
    message_severity: DebugUtilsMessageSeverityFlagsEXT,
    message_type: DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> Bool32 {
    if p_callback_data.is_null() {
        return FALSE;
    }
    let callback_data = &*p_callback_data;

    let message = if callback_data.p_message.is_null() {
        Cow::from("")
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    let level = if message_severity.contains(DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if message_severity.contains(DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if message_severity.contains(DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Trace
    };

    log::log!(target: "vulkan", level, "{}: {}", message_type_name(message_type), message);

    FALSE
}

fn message_type_name(message_type: DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

fn debug_messenger_info() -> DebugUtilsMessengerCreateInfoEXT<'static> {
    DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            DebugUtilsMessageSeverityFlagsEXT::ERROR
                | DebugUtilsMessageSeverityFlagsEXT::WARNING
                | DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
        )
        .message_type(
            DebugUtilsMessageTypeFlagsEXT::GENERAL
                | DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback))
}

/// Loaded Vulkan library plus the instance, and the debug messenger when
/// validation is on.
pub struct Vulkan {
    debug_utils: Option<(debug_utils::Instance, DebugUtilsMessengerEXT)>,
    library: Entry,
    instance: Instance,
}

impl Vulkan {
    pub fn new(config: &BootstrapConfig, display_handle: RawDisplayHandle) -> Result<Self> {
        let library = unsafe { Entry::load()? };

        if config.enable_validation {
            check_layers(&library, &config.validation_layers)?;
        }

        let c_name = CString::new(config.app_name.as_str())?;
        let appinfo = ApplicationInfo::default()
            .application_name(&c_name)
            .application_version(ash::vk::make_api_version(0, 1, 0, 0))
            .engine_name(c"No Engine")
            .engine_version(ash::vk::make_api_version(0, 1, 0, 0))
            .api_version(API_VERSION_1_0);

        let layers_names_raw: Vec<*const std::os::raw::c_char> = config
            .active_layers()
            .iter()
            .map(|layer_name| layer_name.as_ptr())
            .collect();

        let mut extension_names_raw =
            ash_window::enumerate_required_extensions(display_handle)?.to_vec();
        if config.enable_validation {
            extension_names_raw.push(debug_utils::NAME.as_ptr());
        }

        let mut instance_debug_info = debug_messenger_info();
        let mut create_info = InstanceCreateInfo::default()
            .application_info(&appinfo)
            .enabled_layer_names(&layers_names_raw)
            .enabled_extension_names(&extension_names_raw);
        if config.enable_validation {
            create_info = create_info.push_next(&mut instance_debug_info);
        }

        let instance = unsafe { library.create_instance(&create_info, None)? };

        let debug_utils = if config.enable_validation {
            let loader = debug_utils::Instance::new(&library, &instance);
            match unsafe { loader.create_debug_utils_messenger(&debug_messenger_info(), None) } {
                Ok(messenger) => Some((loader, messenger)),
                Err(error) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(error.into());
                }
            }
        } else {
            None
        };

        let vulkan = Self {
            debug_utils,
            library,
            instance,
        };

        if log::log_enabled!(log::Level::Debug) {
            for extension in vulkan.instance_extensions()? {
                log::debug!("Instance extension: {}", extension);
            }
        }

        Ok(vulkan)
    }

    /// Loads the Vulkan library just long enough to list its extensions.
    pub fn available_instance_extensions() -> Result<Vec<String>> {
        let library = unsafe { Entry::load()? };
        extension_names(&library)
    }

    pub fn available_instance_layers() -> Result<Vec<String>> {
        let library = unsafe { Entry::load()? };
        layer_names(&library)
    }

    pub fn instance_extensions(&self) -> Result<Vec<String>> {
        extension_names(&self.library)
    }

    pub fn library(&self) -> &Entry {
        &self.library
    }

    pub fn vk_instance(&self) -> &Instance {
        &self.instance
    }

    pub fn validation_enabled(&self) -> bool {
        self.debug_utils.is_some()
    }
}

impl Drop for Vulkan {
    fn drop(&mut self) {
        unsafe {
            if let Some((loader, messenger)) = self.debug_utils.take() {
                loader.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

fn extension_names(library: &Entry) -> Result<Vec<String>> {
    let properties = unsafe { library.enumerate_instance_extension_properties(None)? };
    Ok(properties
        .iter()
        .filter_map(|extension| {
            let name = extension.extension_name_as_c_str().ok()?;
            Some(format!(
                "{} v{}",
                name.to_string_lossy(),
                extension.spec_version
            ))
        })
        .collect())
}

fn layer_names(library: &Entry) -> Result<Vec<String>> {
    let properties = unsafe { library.enumerate_instance_layer_properties()? };
    Ok(properties
        .iter()
        .filter_map(|layer| layer.layer_name_as_c_str().ok())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

fn check_layers(library: &Entry, requested: &[CString]) -> Result<()> {
    let available = layer_names(library)?;
    for layer in requested {
        let name = layer.to_string_lossy();
        if !available.iter().any(|available| *available == name) {
            return Err(BootstrapError::MissingValidationLayer(name.into_owned()));
        }
    }
    Ok(())
}
