//! # rhi_vk
//!
//! Vulkan capability negotiation and device selection.
//!
//! The crate discovers which extensions and layers the Vulkan loader offers,
//! negotiates required/optional requests against them, enumerates physical
//! devices, filters them by queue families, presentation support, limits and
//! device extensions, and hands out an [`Instance`](backend::vulkan::Instance)
//! that owns every logical device it creates.
//!
//! ## Features
//!
//! - **Negotiation**: ordered required/optional requests, first missing
//!   required name ends the build
//! - **Device Selection**: suitability filtering in enumeration order
//! - **Explicit Diagnostics**: every component logs through a
//!   [`Diagnostics`](foundation::logging::Diagnostics) context
//! - **File Configuration**: builds can be described in TOML or RON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rhi_vk::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     rhi_vk::foundation::logging::init();
//!
//!     let mut instance = InstanceBuilder::new()
//!         .enable_debug()
//!         .headless(true)
//!         .build()?;
//!
//!     for device in instance.suitable_devices() {
//!         println!("{}", format_physical_device_properties(device.properties(), "  "));
//!     }
//!
//!     let device = instance.create_device()?;
//!     println!("created device on {}", device.physical_device_id());
//!
//!     instance.destroy();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod backend;
pub mod config;
pub mod core;
pub mod foundation;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        backend::vulkan::{
            initialization::{
                format_physical_device_properties, physical_device_type_name, CapabilityRequest, Device,
                DeviceBuilder, Instance, InstanceBuilder, PhysicalDeviceDescriptor,
            },
            AshBackend, DeviceError, ErrorCode, InstanceError, NativeBackend, WindowData,
        },
        core::config::{Config, InstanceConfig},
        foundation::logging::{Diagnostics, DiagnosticsConfig},
    };
}
