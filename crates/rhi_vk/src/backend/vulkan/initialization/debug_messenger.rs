//! Validation-layer debug messenger
//!
//! The messenger is the debug hook attached to an instance once the debug
//! utilities extension has been negotiated. Native messages are routed to the
//! `log` facade under the `rhi_vk::validation` target.

use ash::vk;
use std::ffi::CStr;

use crate::backend::vulkan::native::NativeBackend;
use crate::foundation::logging::Diagnostics;

/// `log` target used for messages coming from the validation layers
pub const VALIDATION_TARGET: &str = "rhi_vk::validation";

/// Severities and message types the messenger subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMessengerConfig {
    /// Severities forwarded to the callback
    pub severities: vk::DebugUtilsMessageSeverityFlagsEXT,
    /// Message categories forwarded to the callback
    pub message_types: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl Default for DebugMessengerConfig {
    fn default() -> Self {
        Self {
            severities: vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            message_types: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        }
    }
}

impl DebugMessengerConfig {
    /// Native create info pointing at [`debug_callback`]
    pub fn create_info(&self) -> vk::DebugUtilsMessengerCreateInfoEXT {
        vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(self.severities)
            .message_type(self.message_types)
            .pfn_user_callback(Some(debug_callback))
            .build()
    }
}

fn message_type_prefix(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    match message_type {
        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL => "<GENERAL>",
        vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION => "<VALIDATION>",
        vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE => "<PERFORMANCE>",
        _ => "<UNKNOWN>",
    }
}

fn severity_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    match severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE | vk::DebugUtilsMessageSeverityFlagsEXT::INFO => {
            log::Level::Debug
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => log::Level::Warn,
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => log::Level::Error,
        _ => log::Level::Info,
    }
}

/// Debug callback for validation layers
pub unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();

    log::log!(
        target: VALIDATION_TARGET,
        severity_level(message_severity),
        "Vulkan Validation Layer {}: {}",
        message_type_prefix(message_type),
        message
    );

    vk::FALSE
}

/// A debug messenger bound to one instance
#[derive(Debug)]
pub struct DebugMessenger {
    instance: vk::Instance,
    handle: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    /// Attach a messenger to `instance`
    pub fn create<B: NativeBackend>(
        backend: &B,
        instance: vk::Instance,
        config: &DebugMessengerConfig,
        diagnostics: &Diagnostics,
    ) -> Result<Self, vk::Result> {
        match backend.create_debug_messenger(instance, config) {
            Ok(handle) => Ok(Self { instance, handle }),
            Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT) => {
                diagnostics.error(format_args!("Debug extension not present!"));
                Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT)
            }
            Err(result) => {
                diagnostics.error(format_args!("Failed to create debug messenger: {result:?}"));
                Err(result)
            }
        }
    }

    /// Native messenger handle
    pub const fn handle(&self) -> vk::DebugUtilsMessengerEXT {
        self.handle
    }

    /// Detach and destroy the messenger
    pub fn destroy<B: NativeBackend>(self, backend: &B, diagnostics: &Diagnostics) {
        diagnostics.debug(format_args!("Destroying debug messenger..."));
        backend.destroy_debug_messenger(self.instance, self.handle);
        diagnostics.debug(format_args!("Debug messenger destroyed."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_subscription() {
        let config = DebugMessengerConfig::default();
        assert!(config.severities.contains(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
        assert!(!config.severities.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO));
        assert!(config.message_types.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE));

        let info = config.create_info();
        assert!(info.pfn_user_callback.is_some());
        assert_eq!(info.message_severity, config.severities);
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE), log::Level::Debug);
        assert_eq!(severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::INFO), log::Level::Debug);
        assert_eq!(severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING), log::Level::Warn);
        assert_eq!(severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR), log::Level::Error);
        assert_eq!(message_type_prefix(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION), "<VALIDATION>");
    }
}
