//! Vulkan capability negotiation and device selection

pub mod catalog;
pub mod debug_messenger;
pub mod device;
pub mod format;
pub mod instance;
pub mod physical_device;
pub mod queue_family;
pub mod requirements;
pub mod swapchain_support;

pub use catalog::{CapabilityCatalog, CatalogScope, LayerCatalog, SupportQuery};
pub use debug_messenger::{DebugMessenger, DebugMessengerConfig};
pub use device::{Device, DeviceBuilder};
pub use format::{format_physical_device_properties, physical_device_type_name, version_string};
pub use instance::{Instance, InstanceBuilder};
pub use physical_device::{PhysicalDeviceCatalog, PhysicalDeviceDescriptor};
pub use queue_family::QueueFamilyIndices;
pub use requirements::{resolve, CapabilityRequest};
pub use swapchain_support::{SwapchainSupportCache, SwapchainSupportError, SwapchainSupportInfo};
