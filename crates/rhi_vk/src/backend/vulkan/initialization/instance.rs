//! Instance construction and ownership
//!
//! [`InstanceBuilder`] accumulates an [`InstanceConfig`] through side-effect
//! free setters. The terminal [`InstanceBuilder::build_with`] runs the whole
//! negotiation handshake:
//!
//! 1. snapshot instance extensions and layers
//! 2. inject the debug utilities and validation layer if debugging was asked
//!    for and the loader supports it
//! 3. inject surface extensions unless headless
//! 4. resolve layers, then extensions; the first missing required name ends
//!    the build
//! 5. create the native instance
//! 6. create the presentation surface from the window data, if any
//! 7. attach the debug messenger
//! 8. enumerate and filter physical devices; an empty result is a failure
//!
//! The returned [`Instance`] owns every native object created along the way,
//! and a partially built instance is torn down by its `Drop`.

use ash::vk;

use crate::backend::vulkan::ash_backend::AshBackend;
use crate::backend::vulkan::error::{DeviceError, ErrorCode, InstanceError, SurfaceCreateError};
use crate::backend::vulkan::initialization::catalog::{CapabilityCatalog, CatalogScope, LayerCatalog, SupportQuery};
use crate::backend::vulkan::initialization::debug_messenger::{DebugMessenger, DebugMessengerConfig};
use crate::backend::vulkan::initialization::device::{Device, DeviceBuilder};
use crate::backend::vulkan::initialization::physical_device::{PhysicalDeviceCatalog, PhysicalDeviceDescriptor};
use crate::backend::vulkan::initialization::requirements::{resolve, CapabilityRequest};
use crate::backend::vulkan::native::{InstanceCreateRequest, NativeBackend};
use crate::backend::vulkan::window::{WindowData, WindowPlatform};
use crate::core::config::InstanceConfig;
use crate::foundation::logging::Diagnostics;

/// `VK_EXT_debug_utils`
pub const DEBUG_UTILS_EXTENSION: &str = "VK_EXT_debug_utils";
/// Khronos validation layer
pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";
/// `VK_KHR_surface`
pub const SURFACE_EXTENSION: &str = "VK_KHR_surface";
/// `VK_KHR_swapchain`
pub const SWAPCHAIN_EXTENSION: &str = "VK_KHR_swapchain";

/// Fluent configuration for an [`Instance`]
#[derive(Debug, Clone, Default)]
pub struct InstanceBuilder {
    config: InstanceConfig,
    window: Option<WindowData>,
    diagnostics: Option<Diagnostics>,
    debug_messenger: DebugMessengerConfig,
}

impl InstanceBuilder {
    /// Builder with default configuration: windowed, debug in debug builds
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder over an existing configuration value
    pub fn from_config(config: InstanceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Configuration accumulated so far
    pub const fn config(&self) -> &InstanceConfig {
        &self.config
    }

    /// Request the debug utilities and validation layer
    pub fn enable_debug(mut self) -> Self {
        self.config.enable_debug = Some(true);
        self
    }

    /// Build without debug utilities
    pub fn disable_debug(mut self) -> Self {
        self.config.enable_debug = Some(false);
        self
    }

    /// Require an instance extension
    pub fn add_extension(mut self, name: impl Into<String>) -> Self {
        self.config.extensions.push(name.into());
        self
    }

    /// Require several instance extensions
    pub fn add_extensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extensions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Window the presentation surface is created for
    pub fn set_window_data(mut self, window: WindowData) -> Self {
        self.window = Some(window);
        self
    }

    /// Skip surface extensions and presentation checks
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Application name reported to the driver
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.config.application_name = name.into();
        self
    }

    /// Application version reported to the driver
    pub fn application_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.config.application_version = (major, minor, patch);
        self
    }

    /// Engine name reported to the driver
    pub fn engine_name(mut self, name: impl Into<String>) -> Self {
        self.config.engine_name = name.into();
        self
    }

    /// Require a device extension on every suitable device
    pub fn add_device_extension(self, name: impl Into<String>) -> Self {
        self.request_device_extension(name, true)
    }

    /// Request a device extension; optional ones never exclude a device
    pub fn request_device_extension(mut self, name: impl Into<String>, required: bool) -> Self {
        self.config.device_extensions.push(CapabilityRequest::new(name, required));
        self
    }

    /// Diagnostics context used instead of the configured switches
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Severities and message types of the debug messenger
    pub fn debug_messenger(mut self, config: DebugMessengerConfig) -> Self {
        self.debug_messenger = config;
        self
    }

    /// Load the system Vulkan library and build over it
    pub fn build(&self) -> Result<Instance, InstanceError> {
        let backend = AshBackend::load()
            .map_err(|err| InstanceError::new(ErrorCode::Loading, format!("Failed to load Vulkan library: {err}")))?;
        self.build_with(backend)
    }

    /// Run the negotiation handshake against `backend`
    pub fn build_with<B: NativeBackend>(&self, backend: B) -> Result<Instance<B>, InstanceError> {
        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Diagnostics::from_config(self.config.diagnostics));
        let fail = |err: InstanceError| {
            diagnostics.error(format_args!("Instance creation failed with message: [{err}]"));
            err
        };

        let extensions = CapabilityCatalog::fetch(&backend, CatalogScope::Instance, &diagnostics).map_err(|result| {
            fail(InstanceError::new(
                ErrorCode::Loading,
                format!("Failed to enumerate instance extensions: {result:?}"),
            ))
        })?;
        let layers = LayerCatalog::fetch(&backend, &diagnostics).map_err(|result| {
            fail(InstanceError::new(
                ErrorCode::Loading,
                format!("Failed to enumerate instance layers: {result:?}"),
            ))
        })?;

        let mut extension_requests = Vec::new();
        let mut layer_requests = Vec::new();

        let use_debug = self.config.debug_enabled() && extensions.is_supported(DEBUG_UTILS_EXTENSION);
        if use_debug {
            diagnostics.debug(format_args!("Use debug option is enabled."));
            extension_requests.push(CapabilityRequest::required(DEBUG_UTILS_EXTENSION));
            layer_requests.push(CapabilityRequest::optional(VALIDATION_LAYER));
        } else if self.config.debug_enabled() {
            diagnostics.warn(format_args!(
                "Debug was requested but {DEBUG_UTILS_EXTENSION} is not supported; continuing without it"
            ));
        }

        for extension in &self.config.extensions {
            diagnostics.debug(format_args!("Requested extension: {extension}"));
            extension_requests.push(CapabilityRequest::required(extension.as_str()));
        }

        if !self.config.headless {
            extension_requests.push(CapabilityRequest::required(SURFACE_EXTENSION));
            match WindowPlatform::current() {
                Some(platform) => {
                    extension_requests.push(CapabilityRequest::required(platform.surface_extension()));
                }
                None => diagnostics.warn(format_args!("No surface extension is known for this platform")),
            }
        }

        let enabled_layers = resolve(&layer_requests, &layers, &diagnostics).map_err(|err| {
            fail(InstanceError::new(
                ErrorCode::MissingLayer,
                format!("Missing required layer {}", err.name()),
            ))
        })?;
        let enabled_extensions = resolve(&extension_requests, &extensions, &diagnostics).map_err(|err| {
            fail(InstanceError::new(
                ErrorCode::MissingExtension,
                format!("Missing required extension {}", err.name()),
            ))
        })?;

        let request = InstanceCreateRequest {
            application_name: self.config.application_name.clone(),
            application_version: self.config.packed_application_version(),
            engine_name: self.config.engine_name.clone(),
            engine_version: self.config.packed_engine_version(),
            api_version: self.config.packed_api_version(),
            layers: enabled_layers,
            extensions: enabled_extensions,
            debug_messenger: use_debug.then_some(self.debug_messenger),
        };

        let handle = backend.create_instance(&request).map_err(|result| {
            fail(InstanceError::new(
                ErrorCode::InstanceCreation,
                format!("Failed to create instance. vkCreateInstance failed with {result:?}"),
            ))
        })?;
        diagnostics.debug(format_args!("Instance creation completed successfully."));

        let mut instance = Instance {
            backend,
            handle,
            surface: None,
            debug_messenger: None,
            suitable_devices: Vec::new(),
            devices: Vec::new(),
            device_extension_requests: Vec::new(),
            debug_enabled: use_debug,
            diagnostics,
            destroyed: false,
        };

        match (&self.window, self.config.headless) {
            (Some(window), false) => {
                let surface = instance.create_surface(window).map_err(|err| fail(err.into()))?;
                instance.surface = Some(surface);
                diagnostics.debug(format_args!("Surface created."));
            }
            (Some(_), true) => {
                diagnostics.warn(format_args!("Window data ignored for a headless instance"));
            }
            (None, false) => {
                diagnostics.warn(format_args!("No window data supplied; physical devices are checked without a surface"));
            }
            (None, true) => {}
        }

        if use_debug {
            diagnostics.debug(format_args!("Creating debug messenger..."));
            let messenger = DebugMessenger::create(&instance.backend, handle, &self.debug_messenger, &diagnostics)
                .map_err(|result| {
                    fail(InstanceError::new(
                        ErrorCode::DebugMessenger,
                        format!("Failed to create debug messenger: {result:?}"),
                    ))
                })?;
            instance.debug_messenger = Some(messenger);
            diagnostics.debug(format_args!("Debug messenger created."));
        }

        diagnostics.debug(format_args!("Retrieving suitable physical devices..."));
        let mut catalog = PhysicalDeviceCatalog::enumerate(&instance.backend, handle, instance.surface, diagnostics)
            .map_err(|result| {
                fail(InstanceError::new(
                    ErrorCode::DeviceEnumeration,
                    format!("Failed to enumerate physical devices: {result:?}"),
                ))
            })?;
        catalog.request_extensions(self.config.device_extensions.iter().cloned());
        if instance.surface.is_some() {
            catalog.request_extension(SWAPCHAIN_EXTENSION, true);
        }

        instance.device_extension_requests = catalog.extension_requests().to_vec();
        instance.suitable_devices = catalog.get_suitable_devices(&instance.backend);

        if instance.suitable_devices.is_empty() {
            return Err(fail(InstanceError::new(
                ErrorCode::NoSuitableDevice,
                "No suitable physical devices found",
            )));
        }

        Ok(instance)
    }
}

/// A live Vulkan instance and everything created from it
///
/// Owns the surface, the debug messenger and every [`Device`] handed out by
/// [`Instance::create_device`]. Not `Clone`; [`Instance::destroy`] runs once,
/// either explicitly or on drop.
#[derive(Debug)]
pub struct Instance<B: NativeBackend = AshBackend> {
    backend: B,
    handle: vk::Instance,
    surface: Option<vk::SurfaceKHR>,
    debug_messenger: Option<DebugMessenger>,
    suitable_devices: Vec<PhysicalDeviceDescriptor>,
    devices: Vec<Device>,
    device_extension_requests: Vec<CapabilityRequest>,
    debug_enabled: bool,
    diagnostics: Diagnostics,
    destroyed: bool,
}

impl<B: NativeBackend> Instance<B> {
    fn create_surface(&self, window: &WindowData) -> Result<vk::SurfaceKHR, SurfaceCreateError> {
        window.check_platform()?;
        self.backend
            .create_surface(self.handle, window)
            .map_err(SurfaceCreateError::Creation)
    }

    /// Create a device on the first suitable physical device
    pub fn create_device(&mut self) -> Result<&Device, DeviceError> {
        if self.destroyed {
            return Err(DeviceError::InstanceDestroyed);
        }
        if self.suitable_devices.is_empty() {
            return Err(DeviceError::NoSuitableDevice);
        }
        self.create_device_at(0)
    }

    /// Create a device on the suitable physical device with this `deviceID`
    pub fn create_device_with_id(&mut self, id: u32) -> Result<&Device, DeviceError> {
        if self.destroyed {
            return Err(DeviceError::InstanceDestroyed);
        }
        let index = self
            .suitable_devices
            .iter()
            .position(|device| device.id() == id)
            .ok_or(DeviceError::NotFound { id })?;
        self.create_device_at(index)
    }

    fn create_device_at(&mut self, index: usize) -> Result<&Device, DeviceError> {
        let device = DeviceBuilder::new(&self.suitable_devices[index])
            .surface(self.surface)
            .request_extensions(&self.device_extension_requests)
            .build(&self.backend, &self.diagnostics)
            .map_err(|err| {
                self.diagnostics.error(format_args!("{err}"));
                err
            })?;

        let slot = self.devices.len();
        self.devices.push(device);
        Ok(&self.devices[slot])
    }

    /// Tear down every owned object, then the instance itself
    ///
    /// Order: debug messenger, devices, suitable list, surface, instance.
    /// Calling this again is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.diagnostics.debug(format_args!("Destroying instance..."));

        if let Some(messenger) = self.debug_messenger.take() {
            messenger.destroy(&self.backend, &self.diagnostics);
        }

        for device in self.devices.drain(..) {
            device.destroy(&self.backend, &self.diagnostics);
        }

        self.suitable_devices.clear();

        if let Some(surface) = self.surface.take() {
            self.backend.destroy_surface(self.handle, surface);
        }

        self.backend.destroy_instance(self.handle);
        self.destroyed = true;
        self.diagnostics.debug(format_args!("Instance destroyed"));
    }

    /// Native handle
    pub const fn handle(&self) -> vk::Instance {
        self.handle
    }

    /// Presentation surface, if one was created
    pub const fn surface(&self) -> Option<vk::SurfaceKHR> {
        self.surface
    }

    /// Physical devices that passed filtering, in enumeration order
    pub fn suitable_devices(&self) -> &[PhysicalDeviceDescriptor] {
        &self.suitable_devices
    }

    /// Devices created so far
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Device extensions every device is created with
    pub fn device_extension_requests(&self) -> &[CapabilityRequest] {
        &self.device_extension_requests
    }

    /// Whether the debug utilities were negotiated
    pub const fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    /// Whether [`Instance::destroy`] already ran
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Backend the instance was built over
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: NativeBackend> Drop for Instance<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}
