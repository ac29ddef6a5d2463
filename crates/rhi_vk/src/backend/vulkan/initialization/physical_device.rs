//! Physical device enumeration and suitability filtering
//!
//! [`PhysicalDeviceCatalog`] enumerates every physical device once and wraps
//! each in a [`PhysicalDeviceDescriptor`], a cheap value snapshot of the
//! device's properties, features and extensions. Filtering keeps enumeration
//! order; devices are never ranked.

use ash::prelude::VkResult;
use ash::vk;

use crate::backend::vulkan::initialization::catalog::SupportQuery;
use crate::backend::vulkan::initialization::format::format_physical_device_properties;
use crate::backend::vulkan::initialization::queue_family::QueueFamilyIndices;
use crate::backend::vulkan::initialization::requirements::CapabilityRequest;
use crate::backend::vulkan::initialization::swapchain_support::{
    SwapchainSupportCache, SwapchainSupportError, SwapchainSupportInfo,
};
use crate::backend::vulkan::native::{fixed_name, NativeBackend};
use crate::foundation::logging::Diagnostics;

/// Highest sample count usable by both color and depth attachments
pub fn max_usable_sample_count(limits: &vk::PhysicalDeviceLimits) -> vk::SampleCountFlags {
    let counts = limits.framebuffer_color_sample_counts & limits.framebuffer_depth_sample_counts;

    [
        vk::SampleCountFlags::TYPE_64,
        vk::SampleCountFlags::TYPE_32,
        vk::SampleCountFlags::TYPE_16,
        vk::SampleCountFlags::TYPE_8,
        vk::SampleCountFlags::TYPE_4,
        vk::SampleCountFlags::TYPE_2,
    ]
    .into_iter()
    .find(|&count| counts.contains(count))
    .unwrap_or(vk::SampleCountFlags::TYPE_1)
}

/// Snapshot of one physical device
///
/// The wrapped handle is not owned; it lives as long as the instance that
/// enumerated it.
#[derive(Debug, Clone)]
pub struct PhysicalDeviceDescriptor {
    handle: vk::PhysicalDevice,
    name: String,
    properties: vk::PhysicalDeviceProperties,
    features: vk::PhysicalDeviceFeatures,
    extensions: Vec<String>,
    max_sample_count: vk::SampleCountFlags,
    max_sampler_anisotropy: f32,
    swapchain_support: SwapchainSupportCache,
}

impl PhysicalDeviceDescriptor {
    /// Query properties, features and device extensions of `handle`
    pub fn create<B: NativeBackend>(
        backend: &B,
        handle: vk::PhysicalDevice,
        diagnostics: &Diagnostics,
    ) -> VkResult<Self> {
        let properties = backend.physical_device_properties(handle)?;
        let features = backend.physical_device_features(handle)?;
        let name = fixed_name(&properties.device_name);

        diagnostics.debug(format_args!("Creating vulkan physical device: {name}"));
        diagnostics.debug(format_args!(
            "Properties: \n{}",
            format_physical_device_properties(&properties, "\t")
        ));

        let extensions = backend.device_extensions(handle)?;

        Ok(Self {
            handle,
            name,
            max_sample_count: max_usable_sample_count(&properties.limits),
            max_sampler_anisotropy: properties.limits.max_sampler_anisotropy,
            properties,
            features,
            extensions,
            swapchain_support: SwapchainSupportCache::default(),
        })
    }

    /// Native handle
    pub const fn handle(&self) -> vk::PhysicalDevice {
        self.handle
    }

    /// `deviceName`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `deviceID`
    pub const fn id(&self) -> u32 {
        self.properties.device_id
    }

    /// `vendorID`
    pub const fn vendor_id(&self) -> u32 {
        self.properties.vendor_id
    }

    /// Discrete, integrated, virtual, CPU or other
    pub const fn device_type(&self) -> vk::PhysicalDeviceType {
        self.properties.device_type
    }

    /// Full property block
    pub const fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    /// Device limits
    pub const fn limits(&self) -> &vk::PhysicalDeviceLimits {
        &self.properties.limits
    }

    /// Supported feature set
    pub const fn features(&self) -> vk::PhysicalDeviceFeatures {
        self.features
    }

    /// Device extensions captured at creation
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Exact-name lookup in the cached extension list
    pub fn is_extension_supported(&self, name: &str) -> bool {
        self.extensions.iter().any(|extension| extension == name)
    }

    /// Highest sample count both color and depth attachments support
    pub const fn max_sample_count(&self) -> vk::SampleCountFlags {
        self.max_sample_count
    }

    /// `maxSamplerAnisotropy`
    pub const fn max_sampler_anisotropy(&self) -> f32 {
        self.max_sampler_anisotropy
    }

    /// Probe queue family roles against an optional surface
    pub fn queue_family_indices<B: NativeBackend>(
        &self,
        backend: &B,
        surface: Option<vk::SurfaceKHR>,
        diagnostics: &Diagnostics,
    ) -> QueueFamilyIndices {
        QueueFamilyIndices::probe(backend, self.handle, surface, diagnostics)
    }

    /// Swapchain support for `surface`, queried once and then memoized
    pub fn swapchain_support<B: NativeBackend>(
        &mut self,
        backend: &B,
        surface: vk::SurfaceKHR,
    ) -> Result<SwapchainSupportInfo, SwapchainSupportError> {
        self.swapchain_support.get_or_query(backend, self.handle, surface)
    }
}

impl SupportQuery for PhysicalDeviceDescriptor {
    fn is_supported(&self, name: &str) -> bool {
        self.is_extension_supported(name)
    }
}

/// Every physical device of an instance plus the device-extension requests
/// used to filter them
#[derive(Debug, Clone)]
pub struct PhysicalDeviceCatalog {
    surface: Option<vk::SurfaceKHR>,
    devices: Vec<PhysicalDeviceDescriptor>,
    extension_requests: Vec<CapabilityRequest>,
    diagnostics: Diagnostics,
}

impl PhysicalDeviceCatalog {
    /// Enumerate the instance's physical devices; no surface means headless
    pub fn enumerate<B: NativeBackend>(
        backend: &B,
        instance: vk::Instance,
        surface: Option<vk::SurfaceKHR>,
        diagnostics: Diagnostics,
    ) -> VkResult<Self> {
        let handles = backend.enumerate_physical_devices(instance)?;
        diagnostics.debug(format_args!("Found {} physical device(s)", handles.len()));

        let mut devices = Vec::with_capacity(handles.len());
        for handle in handles {
            match PhysicalDeviceDescriptor::create(backend, handle, &diagnostics) {
                Ok(device) => devices.push(device),
                Err(result) => {
                    diagnostics.warn(format_args!("Skipping physical device {handle:?}: {result:?}"));
                }
            }
        }

        Ok(Self {
            surface,
            devices,
            extension_requests: Vec::new(),
            diagnostics,
        })
    }

    /// Add one device-extension request; duplicates are kept
    pub fn request_extension(&mut self, name: impl Into<String>, required: bool) {
        self.extension_requests.push(CapabilityRequest::new(name, required));
    }

    /// Add several device-extension requests, in order
    pub fn request_extensions(&mut self, requests: impl IntoIterator<Item = CapabilityRequest>) {
        self.extension_requests.extend(requests);
    }

    /// Accumulated device-extension requests
    pub fn extension_requests(&self) -> &[CapabilityRequest] {
        &self.extension_requests
    }

    /// Every enumerated device, suitable or not
    pub fn devices(&self) -> &[PhysicalDeviceDescriptor] {
        &self.devices
    }

    /// No surface was supplied
    pub const fn is_headless(&self) -> bool {
        self.surface.is_none()
    }

    /// Devices passing the suitability predicate, in enumeration order
    pub fn get_suitable_devices<B: NativeBackend>(&mut self, backend: &B) -> Vec<PhysicalDeviceDescriptor> {
        let Self {
            surface,
            devices,
            extension_requests,
            diagnostics,
        } = self;

        diagnostics.debug(format_args!("Getting suitable vulkan physical devices..."));
        if surface.is_none() {
            diagnostics.warn(format_args!("No surface was supplied. Assuming headless rendering!"));
        }

        let mut suitable = Vec::new();
        for device in devices.iter_mut() {
            diagnostics.debug(format_args!("Checking {}...", device.name()));
            if is_device_suitable(backend, device, *surface, extension_requests, diagnostics) {
                diagnostics.debug(format_args!("Suitable."));
                suitable.push(device.clone());
            } else {
                diagnostics.debug(format_args!("Not suitable."));
            }
        }

        suitable
    }
}

fn is_device_suitable<B: NativeBackend>(
    backend: &B,
    device: &mut PhysicalDeviceDescriptor,
    surface: Option<vk::SurfaceKHR>,
    extension_requests: &[CapabilityRequest],
    diagnostics: &Diagnostics,
) -> bool {
    let indices = device.queue_family_indices(backend, surface, diagnostics);

    match surface {
        None => {
            if !indices.has_graphics() {
                diagnostics.debug(format_args!(
                    "Device {} does not have valid graphics queue index.",
                    device.name()
                ));
                return false;
            }
        }
        Some(surface) => {
            if !indices.is_complete() {
                diagnostics.debug(format_args!(
                    "Device {} does not have valid queue family indices: {}",
                    device.name(),
                    indices.describe()
                ));
                return false;
            }

            match device.swapchain_support(backend, surface) {
                Ok(support) if support.is_adequate() => {}
                Ok(_) => {
                    diagnostics.debug(format_args!(
                        "Device {} has no surface formats or present modes.",
                        device.name()
                    ));
                    return false;
                }
                Err(err) => {
                    diagnostics.error(format_args!(
                        "Error getting support for swapchain for device [{}]: {err}",
                        device.name()
                    ));
                    return false;
                }
            }
        }
    }

    if device.max_sampler_anisotropy() <= 0.0 {
        diagnostics.debug(format_args!(
            "Device {} does not have valid max sampler anisotropy",
            device.name()
        ));
        return false;
    }

    for request in extension_requests.iter().filter(|request| request.required) {
        if !device.is_extension_supported(&request.name) {
            diagnostics.debug(format_args!(
                "Device {} does not support required extension: {}",
                device.name(),
                request.name
            ));
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::vulkan::tests::fake_backend::{FakeBackend, FakeDevice};

    fn catalog(backend: &FakeBackend, surface: Option<vk::SurfaceKHR>) -> PhysicalDeviceCatalog {
        PhysicalDeviceCatalog::enumerate(backend, FakeBackend::instance(), surface, Diagnostics::disabled()).unwrap()
    }

    fn names(devices: &[PhysicalDeviceDescriptor]) -> Vec<&str> {
        devices.iter().map(PhysicalDeviceDescriptor::name).collect()
    }

    #[test]
    fn test_sample_count_is_highest_common_bit() {
        let limits = vk::PhysicalDeviceLimits {
            framebuffer_color_sample_counts: vk::SampleCountFlags::TYPE_1
                | vk::SampleCountFlags::TYPE_4
                | vk::SampleCountFlags::TYPE_8,
            framebuffer_depth_sample_counts: vk::SampleCountFlags::TYPE_1
                | vk::SampleCountFlags::TYPE_2
                | vk::SampleCountFlags::TYPE_4,
            ..Default::default()
        };
        assert_eq!(max_usable_sample_count(&limits), vk::SampleCountFlags::TYPE_4);

        let limits = vk::PhysicalDeviceLimits::default();
        assert_eq!(max_usable_sample_count(&limits), vk::SampleCountFlags::TYPE_1);
    }

    #[test]
    fn test_descriptor_snapshot() {
        let backend = FakeBackend::new().with_device(
            FakeDevice::new(0x1234, "Fake GPU")
                .with_vendor(0x10de)
                .with_device_type(vk::PhysicalDeviceType::DISCRETE_GPU)
                .with_extensions(["VK_KHR_swapchain"]),
        );
        let catalog = catalog(&backend, None);
        let device = &catalog.devices()[0];

        assert_eq!(device.name(), "Fake GPU");
        assert_eq!(device.id(), 0x1234);
        assert_eq!(device.vendor_id(), 0x10de);
        assert_eq!(device.device_type(), vk::PhysicalDeviceType::DISCRETE_GPU);
        assert!(device.is_extension_supported("VK_KHR_swapchain"));
        assert!(!device.is_extension_supported("vk_khr_swapchain"));
        assert_eq!(device.max_sample_count(), vk::SampleCountFlags::TYPE_8);
        assert_eq!(backend.calls().device_extensions, 1);
    }

    #[test]
    fn test_zero_anisotropy_excluded() {
        let backend = FakeBackend::new()
            .with_device(FakeDevice::new(1, "good"))
            .with_device(FakeDevice::new(2, "no-aniso").with_max_sampler_anisotropy(0.0));
        let mut catalog = catalog(&backend, None);

        assert_eq!(names(&catalog.get_suitable_devices(&backend)), vec!["good"]);
    }

    #[test]
    fn test_headless_accepts_device_without_present_support() {
        let backend = FakeBackend::new().with_device(
            FakeDevice::new(1, "compute-box").with_queue_families(vec![(
                vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE,
                false,
            )]),
        );
        let mut catalog = catalog(&backend, None);

        assert!(catalog.is_headless());
        assert_eq!(catalog.get_suitable_devices(&backend).len(), 1);
    }

    #[test]
    fn test_windowed_requires_present_and_swapchain_support() {
        let backend = FakeBackend::new()
            .with_device(
                FakeDevice::new(1, "no-present")
                    .with_queue_families(vec![(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE, false)]),
            )
            .with_device(FakeDevice::new(2, "no-formats").with_surface_formats(Vec::new()))
            .with_device(FakeDevice::new(3, "no-modes").with_present_modes(Vec::new()))
            .with_device(FakeDevice::new(4, "lost").with_capabilities_error(vk::Result::ERROR_SURFACE_LOST_KHR))
            .with_device(FakeDevice::new(5, "presentable"));
        let mut catalog = catalog(&backend, Some(FakeBackend::surface()));

        assert_eq!(names(&catalog.get_suitable_devices(&backend)), vec!["presentable"]);
    }

    #[test]
    fn test_required_extension_filter_and_order() {
        let backend = FakeBackend::new()
            .with_device(FakeDevice::new(1, "first").with_extensions(["VK_KHR_swapchain"]))
            .with_device(FakeDevice::new(2, "bare"))
            .with_device(FakeDevice::new(3, "third").with_extensions(["VK_KHR_swapchain"]));
        let mut catalog = catalog(&backend, None);
        catalog.request_extension("VK_KHR_swapchain", true);
        catalog.request_extension("VK_EXT_mesh_shader", false);
        catalog.request_extension("VK_KHR_swapchain", true);

        assert_eq!(catalog.extension_requests().len(), 3);
        assert_eq!(names(&catalog.get_suitable_devices(&backend)), vec!["first", "third"]);
    }

    #[test]
    fn test_swapchain_support_memo_survives_filtering() {
        let backend = FakeBackend::new().with_device(FakeDevice::new(1, "presentable"));
        let mut catalog = catalog(&backend, Some(FakeBackend::surface()));

        let mut suitable = catalog.get_suitable_devices(&backend);
        catalog.get_suitable_devices(&backend);
        suitable[0].swapchain_support(&backend, FakeBackend::surface()).unwrap();

        assert_eq!(backend.calls().surface_capabilities, 1);
    }

    #[test]
    fn test_unreadable_device_skipped() {
        let backend = FakeBackend::new()
            .with_device(FakeDevice::new(1, "broken").with_extensions_error(vk::Result::ERROR_OUT_OF_HOST_MEMORY))
            .with_device(FakeDevice::new(2, "fine"));
        let catalog = catalog(&backend, None);

        assert_eq!(names(catalog.devices()), vec!["fine"]);
    }
}
