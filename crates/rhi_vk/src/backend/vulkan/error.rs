//! Error types for capability negotiation, surface, device and instance creation

use ash::vk;
use std::fmt;
use thiserror::Error;

use crate::backend::vulkan::window::WindowPlatform;

/// A required capability request could not be satisfied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The first required name missing from the catalog
    #[error("Required capability {name} is missing")]
    Missing {
        /// Name exactly as it was requested
        name: String,
    },
}

impl ResolveError {
    /// Name of the missing capability
    pub fn name(&self) -> &str {
        match self {
            Self::Missing { name } => name,
        }
    }
}

/// Presentation surface creation failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCreateError {
    /// The window data belongs to another platform than the compiled one
    #[error("Wrong window data variant: expected {expected}, found {found}")]
    WrongWindowData {
        /// Platform compiled in for this target
        expected: WindowPlatform,
        /// Variant that was supplied
        found: WindowPlatform,
    },

    /// Surface creation is not wired up for this variant on this target
    #[error("Surface creation is not supported for {0} window data")]
    UnsupportedPlatform(WindowPlatform),

    /// The native call failed
    #[error("Surface creation failed with {0:?}")]
    Creation(vk::Result),
}

/// Logical device creation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The owning instance was already destroyed
    #[error("Instance has already been destroyed")]
    InstanceDestroyed,

    /// No suitable physical device carries the requested id
    #[error("Device with id {id} was not found in list of suitable devices")]
    NotFound {
        /// Requested `deviceID`
        id: u32,
    },

    /// The suitable-device list is empty
    #[error("No suitable physical device is available")]
    NoSuitableDevice,

    /// The selected physical device exposes no graphics+compute family
    #[error("Physical device {0} has no graphics queue family")]
    MissingGraphicsQueue(String),

    /// A required device extension is not exposed by the physical device
    #[error("Required device extension {0} is missing")]
    MissingExtension(String),

    /// `vkCreateDevice` failed
    #[error("Failed to create device. vkCreateDevice failed with {0:?}")]
    Creation(vk::Result),
}

/// Tag carried by every [`InstanceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The Vulkan loader could not be loaded
    Loading,
    /// A required layer is not available
    MissingLayer,
    /// A required instance extension is not available
    MissingExtension,
    /// `vkCreateInstance` failed
    InstanceCreation,
    /// Window data does not match the compiled platform
    WrongWindowData,
    /// Presentation surface creation failed natively
    SurfaceCreation,
    /// The debug messenger could not be attached
    DebugMessenger,
    /// Physical devices could not be enumerated
    DeviceEnumeration,
    /// Filtering left no physical device
    NoSuitableDevice,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loading => "LOADING",
            Self::MissingLayer => "MISSING_LAYER",
            Self::MissingExtension => "MISSING_EXTENSION",
            Self::InstanceCreation => "INSTANCE_CREATION",
            Self::WrongWindowData => "WRONG_WINDOW_DATA",
            Self::SurfaceCreation => "SURFACE_CREATION",
            Self::DebugMessenger => "DEBUG_MESSENGER",
            Self::DeviceEnumeration => "DEVICE_ENUMERATION",
            Self::NoSuitableDevice => "NO_SUITABLE_DEVICE",
        };
        f.write_str(name)
    }
}

/// Instance build failure: a tag plus a human readable message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{code}] {message}")]
pub struct InstanceError {
    code: ErrorCode,
    message: String,
}

impl InstanceError {
    /// Create a tagged failure
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Failure tag
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Failure description
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<SurfaceCreateError> for InstanceError {
    fn from(err: SurfaceCreateError) -> Self {
        let code = match err {
            SurfaceCreateError::WrongWindowData { .. } | SurfaceCreateError::UnsupportedPlatform(_) => {
                ErrorCode::WrongWindowData
            }
            SurfaceCreateError::Creation(_) => ErrorCode::SurfaceCreation,
        };
        Self::new(code, format!("Failed to create presentation surface: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_error_accessors() {
        let err = InstanceError::new(ErrorCode::NoSuitableDevice, "No suitable physical devices found");
        assert_eq!(err.code(), ErrorCode::NoSuitableDevice);
        assert_eq!(err.message(), "No suitable physical devices found");
        assert_eq!(err.to_string(), "[NO_SUITABLE_DEVICE] No suitable physical devices found");
    }

    #[test]
    fn test_surface_error_tagging() {
        let wrong: InstanceError = SurfaceCreateError::WrongWindowData {
            expected: WindowPlatform::Xlib,
            found: WindowPlatform::Win32,
        }
        .into();
        assert_eq!(wrong.code(), ErrorCode::WrongWindowData);

        let native: InstanceError = SurfaceCreateError::Creation(vk::Result::ERROR_SURFACE_LOST_KHR).into();
        assert_eq!(native.code(), ErrorCode::SurfaceCreation);
    }

    #[test]
    fn test_device_error_names_native_result() {
        let err = DeviceError::Creation(vk::Result::ERROR_DEVICE_LOST);
        assert!(err.to_string().contains("ERROR_DEVICE_LOST"));
    }
}
