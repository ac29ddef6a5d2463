//! The native call surface the negotiation engine drives
//!
//! Every method is one blocking round trip to the Vulkan implementation.
//! [`AshBackend`](crate::backend::vulkan::AshBackend) is the production
//! implementation; tests substitute a scripted fake.

use ash::prelude::VkResult;
use ash::vk;

use crate::backend::vulkan::initialization::debug_messenger::DebugMessengerConfig;
use crate::backend::vulkan::window::WindowData;

/// Everything `vkCreateInstance` needs after negotiation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceCreateRequest {
    /// `VkApplicationInfo::pApplicationName`
    pub application_name: String,
    /// Packed application version
    pub application_version: u32,
    /// `VkApplicationInfo::pEngineName`
    pub engine_name: String,
    /// Packed engine version
    pub engine_version: u32,
    /// Packed Vulkan API version
    pub api_version: u32,
    /// Resolved layer names, in request order
    pub layers: Vec<String>,
    /// Resolved extension names, in request order
    pub extensions: Vec<String>,
    /// Messenger chained into instance creation when debugging is active
    pub debug_messenger: Option<DebugMessengerConfig>,
}

/// Queues requested from one queue family
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSetup {
    /// Index into the physical device's queue family list
    pub family_index: u32,
    /// One priority per queue
    pub priorities: Vec<f32>,
}

impl QueueSetup {
    /// One queue at full priority
    pub fn single(family_index: u32) -> Self {
        Self {
            family_index,
            priorities: vec![1.0],
        }
    }
}

/// Everything `vkCreateDevice` needs
#[derive(Debug, Clone)]
pub struct DeviceCreateRequest {
    /// One entry per distinct queue family
    pub queues: Vec<QueueSetup>,
    /// Features to enable
    pub features: vk::PhysicalDeviceFeatures,
    /// Device extension names to enable
    pub extensions: Vec<String>,
}

/// Opaque, blocking Vulkan call surface
pub trait NativeBackend {
    /// Names of the instance extensions the loader exposes
    fn instance_extensions(&self) -> VkResult<Vec<String>>;

    /// Names of the instance layers the loader exposes
    fn instance_layers(&self) -> VkResult<Vec<String>>;

    /// `vkCreateInstance`
    fn create_instance(&self, request: &InstanceCreateRequest) -> VkResult<vk::Instance>;

    /// `vkDestroyInstance`
    fn destroy_instance(&self, instance: vk::Instance);

    /// `vkEnumeratePhysicalDevices`
    fn enumerate_physical_devices(&self, instance: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>>;

    /// `vkGetPhysicalDeviceProperties`
    fn physical_device_properties(&self, device: vk::PhysicalDevice) -> VkResult<vk::PhysicalDeviceProperties>;

    /// `vkGetPhysicalDeviceFeatures`
    fn physical_device_features(&self, device: vk::PhysicalDevice) -> VkResult<vk::PhysicalDeviceFeatures>;

    /// Names returned by `vkEnumerateDeviceExtensionProperties`
    fn device_extensions(&self, device: vk::PhysicalDevice) -> VkResult<Vec<String>>;

    /// `vkGetPhysicalDeviceQueueFamilyProperties`
    fn queue_family_properties(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::QueueFamilyProperties>>;

    /// `vkGetPhysicalDeviceSurfaceSupportKHR`
    fn surface_support(&self, device: vk::PhysicalDevice, family_index: u32, surface: vk::SurfaceKHR) -> VkResult<bool>;

    /// `vkGetPhysicalDeviceSurfaceCapabilitiesKHR`
    fn surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR>;

    /// `vkGetPhysicalDeviceSurfaceFormatsKHR`
    fn surface_formats(&self, device: vk::PhysicalDevice, surface: vk::SurfaceKHR) -> VkResult<Vec<vk::SurfaceFormatKHR>>;

    /// `vkGetPhysicalDeviceSurfacePresentModesKHR`
    fn surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>>;

    /// `vkCreateDevice`
    fn create_device(&self, device: vk::PhysicalDevice, request: &DeviceCreateRequest) -> VkResult<vk::Device>;

    /// `vkDestroyDevice`
    fn destroy_device(&self, device: vk::Device);

    /// Platform surface creation for already validated window data
    fn create_surface(&self, instance: vk::Instance, window: &WindowData) -> VkResult<vk::SurfaceKHR>;

    /// `vkDestroySurfaceKHR`
    fn destroy_surface(&self, instance: vk::Instance, surface: vk::SurfaceKHR);

    /// `vkCreateDebugUtilsMessengerEXT`
    fn create_debug_messenger(
        &self,
        instance: vk::Instance,
        config: &DebugMessengerConfig,
    ) -> VkResult<vk::DebugUtilsMessengerEXT>;

    /// `vkDestroyDebugUtilsMessengerEXT`
    fn destroy_debug_messenger(&self, instance: vk::Instance, messenger: vk::DebugUtilsMessengerEXT);
}

/// Read a NUL-terminated fixed-size name field such as
/// `VkExtensionProperties::extensionName`
pub fn fixed_name(raw: &[std::os::raw::c_char]) -> String {
    let bytes: Vec<u8> = raw.iter().take_while(|&&c| c != 0).map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_name_stops_at_nul() {
        let mut raw = [0 as std::os::raw::c_char; 16];
        for (slot, byte) in raw.iter_mut().zip(b"VK_KHR_surface") {
            *slot = *byte as std::os::raw::c_char;
        }
        assert_eq!(fixed_name(&raw), "VK_KHR_surface");
    }

    #[test]
    fn test_single_queue_setup() {
        let setup = QueueSetup::single(3);
        assert_eq!(setup.family_index, 3);
        assert_eq!(setup.priorities, vec![1.0]);
    }
}
