//! # Instance Configuration
//!
//! Serializable description of an instance build. The instance builder's
//! fluent setters are plain field setters over an [`InstanceConfig`], so a
//! build can equally be described in a `.toml` or `.ron` file and loaded
//! through [`Config`].
//!
//! ```toml
//! application_name = "probe"
//! enable_debug = true
//! headless = true
//! extensions = ["VK_KHR_get_physical_device_properties2"]
//!
//! [[device_extensions]]
//! name = "VK_KHR_swapchain"
//!
//! [[device_extensions]]
//! name = "VK_EXT_memory_budget"
//! required = false
//! ```

use ash::vk;
use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

use crate::backend::vulkan::initialization::requirements::CapabilityRequest;
use crate::foundation::logging::DiagnosticsConfig;

/// Everything the instance builder needs before its terminal `build()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Application name reported to the driver
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Engine name reported to the driver
    pub engine_name: String,
    /// Engine version (major, minor, patch)
    pub engine_version: (u32, u32, u32),
    /// Vulkan API version (major, minor)
    pub api_version: (u32, u32),
    /// Whether to negotiate the debug utilities and validation layer
    ///
    /// `None` enables debugging in debug builds only.
    pub enable_debug: Option<bool>,
    /// Skip surface extensions and presentation checks
    pub headless: bool,
    /// Extra instance extensions, all required
    pub extensions: Vec<String>,
    /// Device extensions every suitable device is filtered by
    pub device_extensions: Vec<CapabilityRequest>,
    /// Diagnostics switches for every negotiation component
    pub diagnostics: DiagnosticsConfig,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            application_name: "RHI_VK_APPLICATION".to_string(),
            application_version: (1, 0, 0),
            engine_name: "NO_ENGINE".to_string(),
            engine_version: (1, 0, 0),
            api_version: (1, 0),
            enable_debug: None,
            headless: false,
            extensions: Vec::new(),
            device_extensions: Vec::new(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl InstanceConfig {
    /// Create a configuration for a named application
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            ..Self::default()
        }
    }

    /// Set application version
    pub fn with_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.application_version = (major, minor, patch);
        self
    }

    /// Enable or disable the debug utilities
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.enable_debug = Some(enabled);
        self
    }

    /// Build without a presentation surface
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Resolved debug switch
    pub fn debug_enabled(&self) -> bool {
        self.enable_debug.unwrap_or(cfg!(debug_assertions))
    }

    /// Packed application version
    pub const fn packed_application_version(&self) -> u32 {
        let (major, minor, patch) = self.application_version;
        vk::make_api_version(0, major, minor, patch)
    }

    /// Packed engine version
    pub const fn packed_engine_version(&self) -> u32 {
        let (major, minor, patch) = self.engine_version;
        vk::make_api_version(0, major, minor, patch)
    }

    /// Packed API version
    pub const fn packed_api_version(&self) -> u32 {
        let (major, minor) = self.api_version;
        vk::make_api_version(0, major, minor, 0)
    }
}

impl Config for InstanceConfig {}
