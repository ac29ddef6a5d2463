//! Queue family role probing

use ash::vk;

use crate::backend::vulkan::native::{NativeBackend, QueueSetup};
use crate::foundation::logging::Diagnostics;

/// Queue family indices chosen for each role a device must fill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// First family supporting both graphics and compute
    pub graphics: Option<u32>,
    /// First family able to present to the surface
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    /// Scan the device's queue families in index order
    ///
    /// Each role takes the first family that satisfies it and is never
    /// reassigned. Presentation is only queried when a surface is given, so in
    /// headless mode `present` stays unset. The scan ends as soon as both roles
    /// are filled.
    pub fn probe<B: NativeBackend>(
        backend: &B,
        device: vk::PhysicalDevice,
        surface: Option<vk::SurfaceKHR>,
        diagnostics: &Diagnostics,
    ) -> Self {
        let mut indices = Self::default();

        let families = match backend.queue_family_properties(device) {
            Ok(families) => families,
            Err(result) => {
                diagnostics.error(format_args!("Failed to query queue families: {result:?}"));
                return indices;
            }
        };

        for (index, family) in (0u32..).zip(families.iter()) {
            if indices.is_complete() {
                break;
            }

            if indices.graphics.is_none()
                && family
                    .queue_flags
                    .contains(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE)
            {
                indices.graphics = Some(index);
            }

            if let (Some(surface), None) = (surface, indices.present) {
                match backend.surface_support(device, index, surface) {
                    Ok(true) => indices.present = Some(index),
                    Ok(false) => {}
                    Err(result) => {
                        diagnostics.warn(format_args!(
                            "Present support query failed for queue family {index}: {result:?}"
                        ));
                    }
                }
            }
        }

        indices
    }

    /// Both graphics and present roles are filled
    pub const fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    /// The graphics role is filled
    pub const fn has_graphics(&self) -> bool {
        self.graphics.is_some()
    }

    /// Distinct family indices to create queues on, graphics first
    pub fn unique_families(&self) -> Vec<u32> {
        let mut families = Vec::with_capacity(2);
        families.extend(self.graphics);
        if let Some(present) = self.present {
            if !families.contains(&present) {
                families.push(present);
            }
        }
        families
    }

    /// One queue per distinct family
    pub fn queue_setups(&self) -> Vec<QueueSetup> {
        self.unique_families().into_iter().map(QueueSetup::single).collect()
    }

    /// Short form for log output
    pub fn describe(&self) -> String {
        let show = |index: Option<u32>| index.map_or_else(|| "none".to_string(), |i| i.to_string());
        format!("graphics: {}, present: {}", show(self.graphics), show(self.present))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::vulkan::tests::fake_backend::{FakeBackend, FakeDevice};

    fn graphics_compute() -> vk::QueueFlags {
        vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE
    }

    #[test]
    fn test_distinct_graphics_and_present_families() {
        let device = FakeDevice::new(1, "split")
            .with_queue_family(vk::QueueFlags::TRANSFER, false)
            .with_queue_family(graphics_compute(), false)
            .with_queue_family(vk::QueueFlags::COMPUTE, true);
        let backend = FakeBackend::new().with_device(device);
        let handle = backend.device_handle(0);

        let indices = QueueFamilyIndices::probe(&backend, handle, Some(FakeBackend::surface()), &Diagnostics::disabled());

        assert_eq!(indices.graphics, Some(1));
        assert_eq!(indices.present, Some(2));
        assert!(indices.is_complete());
        assert_eq!(indices.unique_families(), vec![1, 2]);
    }

    #[test]
    fn test_headless_never_queries_present() {
        let device = FakeDevice::new(1, "headless")
            .with_queue_family(graphics_compute(), true)
            .with_queue_family(vk::QueueFlags::COMPUTE, true);
        let backend = FakeBackend::new().with_device(device);
        let handle = backend.device_handle(0);

        let indices = QueueFamilyIndices::probe(&backend, handle, None, &Diagnostics::disabled());

        assert_eq!(indices.present, None);
        assert!(indices.has_graphics());
        assert!(!indices.is_complete());
        assert_eq!(backend.calls().surface_support, 0);
    }

    #[test]
    fn test_graphics_only_family_is_not_enough() {
        let device = FakeDevice::new(1, "no-compute").with_queue_family(vk::QueueFlags::GRAPHICS, false);
        let backend = FakeBackend::new().with_device(device);
        let handle = backend.device_handle(0);

        let indices = QueueFamilyIndices::probe(&backend, handle, None, &Diagnostics::disabled());
        assert!(!indices.has_graphics());
    }

    #[test]
    fn test_first_match_wins_and_scan_stops() {
        let device = FakeDevice::new(1, "shared")
            .with_queue_family(graphics_compute(), true)
            .with_queue_family(graphics_compute(), true)
            .with_queue_family(graphics_compute(), true);
        let backend = FakeBackend::new().with_device(device);
        let handle = backend.device_handle(0);

        let indices = QueueFamilyIndices::probe(&backend, handle, Some(FakeBackend::surface()), &Diagnostics::disabled());

        assert_eq!(indices.graphics, Some(0));
        assert_eq!(indices.present, Some(0));
        assert_eq!(indices.unique_families(), vec![0]);
        assert_eq!(indices.queue_setups().len(), 1);
        assert_eq!(backend.calls().surface_support, 1);
    }

    #[test]
    fn test_describe() {
        let indices = QueueFamilyIndices {
            graphics: Some(0),
            present: None,
        };
        assert_eq!(indices.describe(), "graphics: 0, present: none");
    }
}
