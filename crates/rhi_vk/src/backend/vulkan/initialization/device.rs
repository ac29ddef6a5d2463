//! Logical device creation

use ash::vk;

use crate::backend::vulkan::error::{DeviceError, ResolveError};
use crate::backend::vulkan::initialization::physical_device::PhysicalDeviceDescriptor;
use crate::backend::vulkan::initialization::queue_family::QueueFamilyIndices;
use crate::backend::vulkan::initialization::requirements::{resolve, CapabilityRequest};
use crate::backend::vulkan::native::{DeviceCreateRequest, NativeBackend};
use crate::foundation::logging::Diagnostics;

/// Logical device owned by an [`Instance`](super::instance::Instance)
///
/// Not `Clone`: the native handle is destroyed exactly once, by the owning
/// instance.
#[derive(Debug)]
pub struct Device {
    handle: vk::Device,
    physical_device_id: u32,
    queue_families: QueueFamilyIndices,
    extensions: Vec<String>,
}

impl Device {
    /// Native handle
    pub const fn handle(&self) -> vk::Device {
        self.handle
    }

    /// `deviceID` of the physical device this was created from
    pub const fn physical_device_id(&self) -> u32 {
        self.physical_device_id
    }

    /// Queue family roles queues were created for
    pub const fn queue_families(&self) -> QueueFamilyIndices {
        self.queue_families
    }

    /// Enabled extension names
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub(crate) fn destroy<B: NativeBackend>(self, backend: &B, diagnostics: &Diagnostics) {
        diagnostics.debug(format_args!("Destroying device {:?}", self.handle));
        backend.destroy_device(self.handle);
    }
}

/// Turns one physical device descriptor into a [`Device`]
#[derive(Debug, Clone)]
pub struct DeviceBuilder<'a> {
    physical_device: &'a PhysicalDeviceDescriptor,
    surface: Option<vk::SurfaceKHR>,
    extensions: Vec<CapabilityRequest>,
}

impl<'a> DeviceBuilder<'a> {
    /// Start from a suitable physical device
    pub const fn new(physical_device: &'a PhysicalDeviceDescriptor) -> Self {
        Self {
            physical_device,
            surface: None,
            extensions: Vec::new(),
        }
    }

    /// Surface the present queue must support
    pub fn surface(mut self, surface: Option<vk::SurfaceKHR>) -> Self {
        self.surface = surface;
        self
    }

    /// Append one extension request
    pub fn request_extension(mut self, request: CapabilityRequest) -> Self {
        self.extensions.push(request);
        self
    }

    /// Append requests whose name is not already requested
    pub fn request_extensions<'r>(mut self, requests: impl IntoIterator<Item = &'r CapabilityRequest>) -> Self {
        for request in requests {
            if !self.extensions.iter().any(|existing| existing.name == request.name) {
                self.extensions.push(request.clone());
            }
        }
        self
    }

    /// Requests accumulated so far
    pub fn extension_requests(&self) -> &[CapabilityRequest] {
        &self.extensions
    }

    /// Create the logical device
    pub fn build<B: NativeBackend>(&self, backend: &B, diagnostics: &Diagnostics) -> Result<Device, DeviceError> {
        let physical_device = self.physical_device;
        let queue_families = physical_device.queue_family_indices(backend, self.surface, diagnostics);

        if !queue_families.has_graphics() {
            return Err(DeviceError::MissingGraphicsQueue(physical_device.name().to_string()));
        }

        let extensions = resolve(&self.extensions, physical_device, diagnostics).map_err(|err| match err {
            ResolveError::Missing { name } => DeviceError::MissingExtension(name),
        })?;

        diagnostics.debug(format_args!("Creating device on {}...", physical_device.name()));
        diagnostics.debug(format_args!("Enabled extensions: "));
        for extension in &extensions {
            diagnostics.debug(format_args!("\t{extension}"));
        }

        let request = DeviceCreateRequest {
            queues: queue_families.queue_setups(),
            features: physical_device.features(),
            extensions,
        };

        let handle = backend
            .create_device(physical_device.handle(), &request)
            .map_err(DeviceError::Creation)?;

        Ok(Device {
            handle,
            physical_device_id: physical_device.id(),
            queue_families,
            extensions: request.extensions,
        })
    }
}
