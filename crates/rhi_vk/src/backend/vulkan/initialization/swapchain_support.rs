//! Device/surface presentation compatibility
//!
//! Swapchain support is the triplet of surface capabilities, formats and
//! present modes. It is queried at most once per (device, surface) pair; the
//! result is memoized on the physical device descriptor.

use ash::vk;
use thiserror::Error;

use crate::backend::vulkan::native::NativeBackend;

/// Failures while querying swapchain support
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainSupportError {
    /// `vkGetPhysicalDeviceSurfaceCapabilitiesKHR` failed
    #[error("Failed to retrieve device surface capabilities: {0:?}")]
    Capabilities(vk::Result),
    /// `vkGetPhysicalDeviceSurfaceFormatsKHR` failed
    #[error("Failed to retrieve device surface formats: {0:?}")]
    Formats(vk::Result),
    /// `vkGetPhysicalDeviceSurfacePresentModesKHR` failed
    #[error("Failed to retrieve device surface present modes: {0:?}")]
    PresentModes(vk::Result),
}

/// Capabilities, formats and present modes of a device for one surface
#[derive(Debug, Clone, Default)]
pub struct SwapchainSupportInfo {
    /// Image count, extent and transform limits
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    /// Supported format/color space pairs, in driver order
    pub formats: Vec<vk::SurfaceFormatKHR>,
    /// Supported present modes, in driver order
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupportInfo {
    /// Issue the three native queries
    pub fn query<B: NativeBackend>(
        backend: &B,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Self, SwapchainSupportError> {
        let capabilities = backend
            .surface_capabilities(device, surface)
            .map_err(SwapchainSupportError::Capabilities)?;
        let formats = backend
            .surface_formats(device, surface)
            .map_err(SwapchainSupportError::Formats)?;
        let present_modes = backend
            .surface_present_modes(device, surface)
            .map_err(SwapchainSupportError::PresentModes)?;

        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }

    /// A swapchain can be built: at least one format and one present mode
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Per-surface memo for one device
#[derive(Debug, Clone, Default)]
pub struct SwapchainSupportCache {
    entries: Vec<(vk::SurfaceKHR, SwapchainSupportInfo)>,
}

impl SwapchainSupportCache {
    /// Cached support for `surface`, querying the device on first use
    pub fn get_or_query<B: NativeBackend>(
        &mut self,
        backend: &B,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<SwapchainSupportInfo, SwapchainSupportError> {
        if let Some(info) = self.cached(surface) {
            return Ok(info.clone());
        }

        let info = SwapchainSupportInfo::query(backend, device, surface)?;
        self.entries.push((surface, info.clone()));
        Ok(info)
    }

    /// Support already known for `surface`
    pub fn cached(&self, surface: vk::SurfaceKHR) -> Option<&SwapchainSupportInfo> {
        self.entries
            .iter()
            .find(|(cached, _)| *cached == surface)
            .map(|(_, info)| info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::vulkan::tests::fake_backend::{FakeBackend, FakeDevice};
    use ash::vk::Handle;

    fn presentable_backend() -> FakeBackend {
        FakeBackend::new().with_device(
            FakeDevice::new(7, "presentable")
                .with_surface_formats(vec![vk::SurfaceFormatKHR {
                    format: vk::Format::B8G8R8A8_SRGB,
                    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
                }])
                .with_present_modes(vec![vk::PresentModeKHR::FIFO]),
        )
    }

    #[test]
    fn test_second_call_is_memoized() {
        let backend = presentable_backend();
        let device = backend.device_handle(0);
        let mut cache = SwapchainSupportCache::default();

        let first = cache.get_or_query(&backend, device, FakeBackend::surface()).unwrap();
        let second = cache.get_or_query(&backend, device, FakeBackend::surface()).unwrap();

        assert_eq!(first.formats.len(), 1);
        assert_eq!(second.present_modes, vec![vk::PresentModeKHR::FIFO]);

        let calls = backend.calls();
        assert_eq!(calls.surface_capabilities, 1);
        assert_eq!(calls.surface_formats, 1);
        assert_eq!(calls.surface_present_modes, 1);
    }

    #[test]
    fn test_each_surface_queried_once() {
        let backend = presentable_backend();
        let device = backend.device_handle(0);
        let mut cache = SwapchainSupportCache::default();
        let other = vk::SurfaceKHR::from_raw(0xbeef);

        cache.get_or_query(&backend, device, FakeBackend::surface()).unwrap();
        cache.get_or_query(&backend, device, other).unwrap();
        cache.get_or_query(&backend, device, FakeBackend::surface()).unwrap();
        cache.get_or_query(&backend, device, other).unwrap();

        let calls = backend.calls();
        assert_eq!(calls.surface_capabilities, 2);
        assert_eq!(calls.surface_formats, 2);
        assert_eq!(calls.surface_present_modes, 2);
        assert!(cache.cached(FakeBackend::surface()).is_some());
        assert!(cache.cached(other).is_some());
    }

    #[test]
    fn test_capabilities_failure_is_reported() {
        let backend = FakeBackend::new().with_device(
            FakeDevice::new(7, "broken").with_capabilities_error(vk::Result::ERROR_SURFACE_LOST_KHR),
        );
        let device = backend.device_handle(0);
        let mut cache = SwapchainSupportCache::default();

        let err = cache
            .get_or_query(&backend, device, FakeBackend::surface())
            .unwrap_err();

        assert_eq!(err, SwapchainSupportError::Capabilities(vk::Result::ERROR_SURFACE_LOST_KHR));
        assert!(err.to_string().starts_with("Failed to retrieve device surface capabilities"));
        assert!(cache.cached(FakeBackend::surface()).is_none());
    }

    #[test]
    fn test_adequacy() {
        let mut info = SwapchainSupportInfo::default();
        assert!(!info.is_adequate());

        info.formats.push(vk::SurfaceFormatKHR::default());
        assert!(!info.is_adequate());

        info.present_modes.push(vk::PresentModeKHR::MAILBOX);
        assert!(info.is_adequate());
    }
}
