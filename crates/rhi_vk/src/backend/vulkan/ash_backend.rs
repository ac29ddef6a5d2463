//! [`NativeBackend`] over the `ash` loader
//!
//! One backend drives at most one live instance. The instance and device
//! function tables are kept here so the negotiation code only ever handles raw
//! Vulkan handles.

use ash::extensions::{ext::DebugUtils, khr::Surface};
use ash::prelude::VkResult;
use ash::{vk, Device, Entry, Instance};
use raw_window_handle::{
    RawDisplayHandle, RawWindowHandle, Win32WindowHandle, WindowsDisplayHandle, XlibDisplayHandle, XlibWindowHandle,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::os::raw::c_char;

use crate::backend::vulkan::initialization::debug_messenger::DebugMessengerConfig;
use crate::backend::vulkan::native::{fixed_name, DeviceCreateRequest, InstanceCreateRequest, NativeBackend};
use crate::backend::vulkan::window::WindowData;

struct LoadedInstance {
    instance: Instance,
    surface: Surface,
    debug_utils: DebugUtils,
}

/// Vulkan backend over a dynamically loaded `ash::Entry`
pub struct AshBackend {
    entry: Entry,
    loaded: RefCell<Option<LoadedInstance>>,
    devices: RefCell<HashMap<vk::Device, Device>>,
}

impl fmt::Debug for AshBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AshBackend")
            .field("instance", &self.loaded.borrow().as_ref().map(|loaded| loaded.instance.handle()))
            .field("devices", &self.devices.borrow().len())
            .finish_non_exhaustive()
    }
}

impl AshBackend {
    /// Load the system Vulkan library
    pub fn load() -> Result<Self, ash::LoadingError> {
        let entry = unsafe { Entry::load() }?;
        Ok(Self::from_entry(entry))
    }

    /// Wrap an already loaded entry point table
    pub fn from_entry(entry: Entry) -> Self {
        Self {
            entry,
            loaded: RefCell::new(None),
            devices: RefCell::new(HashMap::new()),
        }
    }

    /// Vulkan entry point table
    pub const fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Loaded function table of the live instance, if one exists
    pub fn instance(&self) -> Option<Instance> {
        self.loaded.borrow().as_ref().map(|loaded| loaded.instance.clone())
    }

    /// Loaded function table of a device created through this backend
    pub fn device(&self, device: vk::Device) -> Option<Device> {
        self.devices.borrow().get(&device).cloned()
    }

    fn with_instance<T>(&self, f: impl FnOnce(&LoadedInstance) -> VkResult<T>) -> VkResult<T> {
        let loaded = self.loaded.borrow();
        let loaded = loaded.as_ref().ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)?;
        f(loaded)
    }
}

fn to_cstrings(names: &[String]) -> VkResult<Vec<CString>> {
    names
        .iter()
        .map(|name| CString::new(name.as_str()).map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED))
        .collect()
}

fn as_ptrs(names: &[CString]) -> Vec<*const c_char> {
    names.iter().map(|name| name.as_ptr()).collect()
}

fn raw_handles(window: &WindowData) -> VkResult<(RawDisplayHandle, RawWindowHandle)> {
    match window {
        WindowData::Win32(data) => {
            let mut handle = Win32WindowHandle::empty();
            handle.hwnd = data.hwnd;
            handle.hinstance = data.hinstance;
            Ok((
                RawDisplayHandle::Windows(WindowsDisplayHandle::empty()),
                RawWindowHandle::Win32(handle),
            ))
        }
        WindowData::Xlib(data) => {
            let mut display = XlibDisplayHandle::empty();
            display.display = data.display;
            let mut handle = XlibWindowHandle::empty();
            handle.window = data.window;
            Ok((RawDisplayHandle::Xlib(display), RawWindowHandle::Xlib(handle)))
        }
        // TODO: route Wayland and Metal through ash-window once their instance extensions are negotiated
        WindowData::Wayland(_) | WindowData::Metal(_) => Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT),
    }
}

impl NativeBackend for AshBackend {
    fn instance_extensions(&self) -> VkResult<Vec<String>> {
        let properties = self.entry.enumerate_instance_extension_properties(None)?;
        Ok(properties.iter().map(|p| fixed_name(&p.extension_name)).collect())
    }

    fn instance_layers(&self) -> VkResult<Vec<String>> {
        let properties = self.entry.enumerate_instance_layer_properties()?;
        Ok(properties.iter().map(|p| fixed_name(&p.layer_name)).collect())
    }

    fn create_instance(&self, request: &InstanceCreateRequest) -> VkResult<vk::Instance> {
        if self.loaded.borrow().is_some() {
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        }

        let app_name = CString::new(request.application_name.as_str())
            .map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)?;
        let engine_name =
            CString::new(request.engine_name.as_str()).map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)?;
        let layer_names = to_cstrings(&request.layers)?;
        let extension_names = to_cstrings(&request.extensions)?;
        let layer_ptrs = as_ptrs(&layer_names);
        let extension_ptrs = as_ptrs(&extension_names);

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(request.application_version)
            .engine_name(&engine_name)
            .engine_version(request.engine_version)
            .api_version(request.api_version);

        // Chaining the messenger also reports problems in vkCreateInstance/vkDestroyInstance
        let mut debug_info = request.debug_messenger.as_ref().map(DebugMessengerConfig::create_info);

        let mut create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_layer_names(&layer_ptrs)
            .enabled_extension_names(&extension_ptrs);
        if let Some(debug_info) = debug_info.as_mut() {
            create_info = create_info.push_next(debug_info);
        }

        let instance = unsafe { self.entry.create_instance(&create_info, None) }?;
        let handle = instance.handle();
        let surface = Surface::new(&self.entry, &instance);
        let debug_utils = DebugUtils::new(&self.entry, &instance);
        *self.loaded.borrow_mut() = Some(LoadedInstance {
            instance,
            surface,
            debug_utils,
        });

        Ok(handle)
    }

    fn destroy_instance(&self, instance: vk::Instance) {
        let mut loaded = self.loaded.borrow_mut();
        if loaded.as_ref().map(|l| l.instance.handle()) != Some(instance) {
            log::warn!("Ignoring destroy of unknown instance {:?}", instance);
            return;
        }
        if let Some(loaded) = loaded.take() {
            unsafe { loaded.instance.destroy_instance(None) };
        }
    }

    fn enumerate_physical_devices(&self, _instance: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>> {
        self.with_instance(|loaded| unsafe { loaded.instance.enumerate_physical_devices() })
    }

    fn physical_device_properties(&self, device: vk::PhysicalDevice) -> VkResult<vk::PhysicalDeviceProperties> {
        self.with_instance(|loaded| Ok(unsafe { loaded.instance.get_physical_device_properties(device) }))
    }

    fn physical_device_features(&self, device: vk::PhysicalDevice) -> VkResult<vk::PhysicalDeviceFeatures> {
        self.with_instance(|loaded| Ok(unsafe { loaded.instance.get_physical_device_features(device) }))
    }

    fn device_extensions(&self, device: vk::PhysicalDevice) -> VkResult<Vec<String>> {
        self.with_instance(|loaded| {
            let properties = unsafe { loaded.instance.enumerate_device_extension_properties(device) }?;
            Ok(properties.iter().map(|p| fixed_name(&p.extension_name)).collect())
        })
    }

    fn queue_family_properties(&self, device: vk::PhysicalDevice) -> VkResult<Vec<vk::QueueFamilyProperties>> {
        self.with_instance(|loaded| Ok(unsafe { loaded.instance.get_physical_device_queue_family_properties(device) }))
    }

    fn surface_support(&self, device: vk::PhysicalDevice, family_index: u32, surface: vk::SurfaceKHR) -> VkResult<bool> {
        self.with_instance(|loaded| unsafe {
            loaded
                .surface
                .get_physical_device_surface_support(device, family_index, surface)
        })
    }

    fn surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        self.with_instance(|loaded| unsafe {
            loaded
                .surface
                .get_physical_device_surface_capabilities(device, surface)
        })
    }

    fn surface_formats(&self, device: vk::PhysicalDevice, surface: vk::SurfaceKHR) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        self.with_instance(|loaded| unsafe { loaded.surface.get_physical_device_surface_formats(device, surface) })
    }

    fn surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        self.with_instance(|loaded| unsafe {
            loaded
                .surface
                .get_physical_device_surface_present_modes(device, surface)
        })
    }

    fn create_device(&self, device: vk::PhysicalDevice, request: &DeviceCreateRequest) -> VkResult<vk::Device> {
        let extension_names = to_cstrings(&request.extensions)?;
        let extension_ptrs = as_ptrs(&extension_names);

        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = request
            .queues
            .iter()
            .map(|queue| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(queue.family_index)
                    .queue_priorities(&queue.priorities)
                    .build()
            })
            .collect();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extension_ptrs)
            .enabled_features(&request.features);

        let logical = self.with_instance(|loaded| unsafe { loaded.instance.create_device(device, &create_info, None) })?;
        let handle = logical.handle();
        self.devices.borrow_mut().insert(handle, logical);

        Ok(handle)
    }

    fn destroy_device(&self, device: vk::Device) {
        match self.devices.borrow_mut().remove(&device) {
            Some(logical) => unsafe {
                // Ensure device is idle before destruction
                let _ = logical.device_wait_idle();
                logical.destroy_device(None);
            },
            None => log::warn!("Ignoring destroy of unknown device {:?}", device),
        }
    }

    fn create_surface(&self, _instance: vk::Instance, window: &WindowData) -> VkResult<vk::SurfaceKHR> {
        let (display_handle, window_handle) = raw_handles(window)?;
        self.with_instance(|loaded| unsafe {
            ash_window::create_surface(&self.entry, &loaded.instance, display_handle, window_handle, None)
        })
    }

    fn destroy_surface(&self, _instance: vk::Instance, surface: vk::SurfaceKHR) {
        let destroyed = self.with_instance(|loaded| {
            unsafe { loaded.surface.destroy_surface(surface, None) };
            Ok(())
        });
        if destroyed.is_err() {
            log::warn!("Surface {:?} outlived its instance", surface);
        }
    }

    fn create_debug_messenger(
        &self,
        _instance: vk::Instance,
        config: &DebugMessengerConfig,
    ) -> VkResult<vk::DebugUtilsMessengerEXT> {
        let create_info = config.create_info();
        self.with_instance(|loaded| unsafe { loaded.debug_utils.create_debug_utils_messenger(&create_info, None) })
    }

    fn destroy_debug_messenger(&self, _instance: vk::Instance, messenger: vk::DebugUtilsMessengerEXT) {
        let destroyed = self.with_instance(|loaded| {
            unsafe { loaded.debug_utils.destroy_debug_utils_messenger(messenger, None) };
            Ok(())
        });
        if destroyed.is_err() {
            log::warn!("Debug messenger {:?} outlived its instance", messenger);
        }
    }
}
