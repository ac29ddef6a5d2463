//! Platform window descriptors used for presentation surface creation
//!
//! [`WindowData`] is a closed sum over every windowing platform the crate knows
//! about. Only the platform compiled in for the current target can produce a
//! surface; every other variant is rejected at surface-creation time with a
//! dedicated error instead of being silently ignored.

use std::ffi::c_void;
use std::fmt;
use std::os::raw::c_ulong;

use crate::backend::vulkan::error::SurfaceCreateError;

/// Win32 window handles
#[derive(Debug, Clone, Copy)]
pub struct Win32WindowData {
    /// `HWND` of the target window
    pub hwnd: *mut c_void,
    /// `HINSTANCE` of the module owning the window
    pub hinstance: *mut c_void,
}

/// Xlib window handles
#[derive(Debug, Clone, Copy)]
pub struct XlibWindowData {
    /// `Display*` connection
    pub display: *mut c_void,
    /// X11 `Window` id
    pub window: c_ulong,
}

/// Wayland window handles
#[derive(Debug, Clone, Copy)]
pub struct WaylandWindowData {
    /// `wl_display*`
    pub display: *mut c_void,
    /// `wl_surface*`
    pub surface: *mut c_void,
}

/// Metal layer handle
#[derive(Debug, Clone, Copy)]
pub struct MetalWindowData {
    /// `CAMetalLayer*`
    pub layer: *mut c_void,
}

/// Platform-specific window handles passed to the instance builder
#[derive(Debug, Clone, Copy)]
pub enum WindowData {
    /// Windows desktop window
    Win32(Win32WindowData),
    /// X11 window
    Xlib(XlibWindowData),
    /// Wayland surface
    Wayland(WaylandWindowData),
    /// Apple Metal layer
    Metal(MetalWindowData),
}

/// Tag of a [`WindowData`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowPlatform {
    /// Windows desktop
    Win32,
    /// X11
    Xlib,
    /// Wayland
    Wayland,
    /// Apple Metal
    Metal,
}

impl WindowPlatform {
    /// Instance extension enabling surfaces on this platform
    pub const fn surface_extension(self) -> &'static str {
        match self {
            Self::Win32 => "VK_KHR_win32_surface",
            Self::Xlib => "VK_KHR_xlib_surface",
            Self::Wayland => "VK_KHR_wayland_surface",
            Self::Metal => "VK_EXT_metal_surface",
        }
    }

    /// Whether surface creation is wired up for this platform
    pub const fn is_implemented(self) -> bool {
        matches!(self, Self::Win32 | Self::Xlib)
    }

    /// Platform compiled in for the current target, if surfaces are wired up for it
    ///
    /// Targets whose surface path is not implemented report `None`, so no
    /// platform surface extension is negotiated for them.
    pub const fn current() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(Self::Win32)
        } else if cfg!(any(target_os = "linux", target_os = "freebsd", target_os = "openbsd")) {
            Some(Self::Xlib)
        } else {
            None
        }
    }
}

impl fmt::Display for WindowPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Win32 => "Win32",
            Self::Xlib => "Xlib",
            Self::Wayland => "Wayland",
            Self::Metal => "Metal",
        };
        f.write_str(name)
    }
}

impl WindowData {
    /// Tag of this variant
    pub const fn platform(&self) -> WindowPlatform {
        match self {
            Self::Win32(_) => WindowPlatform::Win32,
            Self::Xlib(_) => WindowPlatform::Xlib,
            Self::Wayland(_) => WindowPlatform::Wayland,
            Self::Metal(_) => WindowPlatform::Metal,
        }
    }

    /// Check that this variant can create a surface on the compiled platform
    pub fn check_platform(&self) -> Result<(), SurfaceCreateError> {
        Self::check_against(self.platform(), WindowPlatform::current())
    }

    pub(crate) fn check_against(
        found: WindowPlatform,
        expected: Option<WindowPlatform>,
    ) -> Result<(), SurfaceCreateError> {
        match expected {
            Some(expected) if expected != found => Err(SurfaceCreateError::WrongWindowData { expected, found }),
            Some(_) if found.is_implemented() => Ok(()),
            _ => Err(SurfaceCreateError::UnsupportedPlatform(found)),
        }
    }
}
