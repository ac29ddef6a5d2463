//! Vulkan probe
//!
//! Builds a headless instance over the system Vulkan loader, prints every
//! suitable physical device, creates a logical device on the first one and
//! tears everything down again.
//!
//! Usage: `vk_probe [config.toml|config.ron]`

use rhi_vk::config::ConfigError;
use rhi_vk::prelude::*;

#[derive(Debug, thiserror::Error)]
enum ProbeError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Instance build failed: {0}")]
    Instance(#[from] InstanceError),

    #[error("Device creation failed: {0}")]
    Device(#[from] DeviceError),
}

fn load_config() -> Result<InstanceConfig, ProbeError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading configuration from {path}");
            Ok(InstanceConfig::load_from_file(path)?)
        }
        None => Ok(InstanceConfig::new("vk_probe")),
    }
}

fn run() -> Result<(), ProbeError> {
    let config = load_config()?;

    let mut instance = InstanceBuilder::from_config(config).headless(true).build()?;
    log::info!("Instance created (debug utilities: {})", instance.debug_enabled());

    for (index, device) in instance.suitable_devices().iter().enumerate() {
        println!("Suitable device #{index}:");
        print!("{}", format_physical_device_properties(device.properties(), "    "));
        println!("    Max Samples:    {:?}", device.max_sample_count());
        println!("    Extensions:     {}", device.extensions().len());
    }

    let device = instance.create_device()?;
    println!(
        "Created device {:?} on physical device {} ({})",
        device.handle(),
        device.physical_device_id(),
        device.queue_families().describe()
    );

    instance.destroy();
    log::info!("Instance destroyed");
    Ok(())
}

fn main() {
    rhi_vk::foundation::logging::init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
