//! Vulkan backend
//!
//! Organized into the native call surface, its `ash` implementation, window
//! data, error types and the initialization (negotiation) components.

/// `ash` implementation of the native call surface
pub mod ash_backend;

/// Error types
pub mod error;

/// Capability negotiation, device selection and instance/device builders
pub mod initialization;

/// The native call surface
pub mod native;

/// Platform window descriptors
pub mod window;

#[cfg(test)]
pub mod tests;

pub use ash_backend::AshBackend;
pub use error::{DeviceError, ErrorCode, InstanceError, ResolveError, SurfaceCreateError};
pub use initialization::{
    CapabilityRequest, Device, Instance, InstanceBuilder, PhysicalDeviceDescriptor, QueueFamilyIndices,
    SwapchainSupportInfo,
};
pub use native::NativeBackend;
pub use window::{WindowData, WindowPlatform};
