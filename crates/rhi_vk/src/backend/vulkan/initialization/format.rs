//! Human readable renderings of device properties

use ash::vk;
use std::fmt::Write;

use crate::backend::vulkan::native::fixed_name;

/// Upper-case name of a physical device type
pub fn physical_device_type_name(device_type: vk::PhysicalDeviceType) -> &'static str {
    match device_type {
        vk::PhysicalDeviceType::OTHER => "OTHER",
        vk::PhysicalDeviceType::INTEGRATED_GPU => "INTEGRATED_GPU",
        vk::PhysicalDeviceType::DISCRETE_GPU => "DISCRETE_GPU",
        vk::PhysicalDeviceType::VIRTUAL_GPU => "VIRTUAL_GPU",
        vk::PhysicalDeviceType::CPU => "CPU",
        _ => "UNKNOWN",
    }
}

/// `major.minor.patch` of a packed Vulkan version
pub fn version_string(version: u32) -> String {
    format!(
        "{}.{}.{}",
        vk::api_version_major(version),
        vk::api_version_minor(version),
        vk::api_version_patch(version)
    )
}

/// One property per line, each line starting with `prefix`
pub fn format_physical_device_properties(properties: &vk::PhysicalDeviceProperties, prefix: &str) -> String {
    let mut out = String::new();
    let rows = [
        ("Device Name:   ", fixed_name(&properties.device_name)),
        ("API Version:   ", version_string(properties.api_version)),
        ("Device ID:     ", properties.device_id.to_string()),
        ("Device Type:   ", physical_device_type_name(properties.device_type).to_string()),
        ("Vendor ID:     ", properties.vendor_id.to_string()),
        ("Driver Version:", properties.driver_version.to_string()),
    ];

    for (label, value) in rows {
        // Writing into a String cannot fail
        let _ = writeln!(out, "{prefix}{label} {value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(physical_device_type_name(vk::PhysicalDeviceType::DISCRETE_GPU), "DISCRETE_GPU");
        assert_eq!(physical_device_type_name(vk::PhysicalDeviceType::CPU), "CPU");
        assert_eq!(physical_device_type_name(vk::PhysicalDeviceType::from_raw(42)), "UNKNOWN");
    }

    #[test]
    fn test_version_string() {
        assert_eq!(version_string(vk::make_api_version(0, 1, 3, 250)), "1.3.250");
    }

    #[test]
    fn test_properties_block() {
        let mut properties = vk::PhysicalDeviceProperties {
            api_version: vk::API_VERSION_1_2,
            device_id: 7,
            vendor_id: 0x1002,
            driver_version: 99,
            device_type: vk::PhysicalDeviceType::INTEGRATED_GPU,
            ..Default::default()
        };
        for (slot, byte) in properties.device_name.iter_mut().zip(b"Fake GPU") {
            *slot = *byte as std::os::raw::c_char;
        }

        let text = format_physical_device_properties(&properties, "\t");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|line| line.starts_with('\t')));
        assert_eq!(lines[0], "\tDevice Name:    Fake GPU");
        assert_eq!(lines[1], "\tAPI Version:    1.2.0");
        assert_eq!(lines[3], "\tDevice Type:    INTEGRATED_GPU");
        assert_eq!(lines[5], "\tDriver Version: 99");
    }
}
