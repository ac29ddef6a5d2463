//! Snapshots of the extensions and layers a Vulkan implementation exposes
//!
//! Catalogs are built with a single enumeration call and never change
//! afterwards. Lookups are exact, case-sensitive string compares.

use ash::prelude::VkResult;

use crate::backend::vulkan::native::NativeBackend;
use crate::foundation::logging::Diagnostics;

/// Anything that can answer "is this name available?"
pub trait SupportQuery {
    /// Exact, case-sensitive lookup
    fn is_supported(&self, name: &str) -> bool;
}

/// Level at which extensions are enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogScope {
    /// Instance extensions, enumerated through the loader
    Instance,
    /// Device extensions; these are gathered eagerly per physical device by
    /// the physical device catalog, so fetching at this scope yields nothing
    PhysicalDevice,
}

/// Immutable list of extension names available at one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityCatalog {
    scope: CatalogScope,
    names: Vec<String>,
}

impl CapabilityCatalog {
    /// Snapshot the extensions available at `scope`
    pub fn fetch<B: NativeBackend>(backend: &B, scope: CatalogScope, diagnostics: &Diagnostics) -> VkResult<Self> {
        let names = match scope {
            CatalogScope::Instance => backend.instance_extensions()?,
            CatalogScope::PhysicalDevice => {
                diagnostics.trace(format_args!(
                    "Device-scope extension fetch skipped; physical devices cache their own list"
                ));
                Vec::new()
            }
        };

        diagnostics.debug(format_args!("{} {:?} extension(s) available", names.len(), scope));
        for name in &names {
            diagnostics.trace(format_args!("\t{name}"));
        }

        Ok(Self { scope, names })
    }

    /// Catalog over an already known list of names
    pub fn from_names<I, S>(scope: CatalogScope, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Scope this catalog was taken at
    pub const fn scope(&self) -> CatalogScope {
        self.scope
    }

    /// Available names, in enumeration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of available extensions
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is available
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl SupportQuery for CapabilityCatalog {
    fn is_supported(&self, name: &str) -> bool {
        self.names.iter().any(|available| available == name)
    }
}

/// Immutable list of instance layer names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerCatalog {
    names: Vec<String>,
}

impl LayerCatalog {
    /// Snapshot the layers the loader exposes
    pub fn fetch<B: NativeBackend>(backend: &B, diagnostics: &Diagnostics) -> VkResult<Self> {
        let names = backend.instance_layers()?;
        diagnostics.debug(format_args!("{} instance layer(s) available", names.len()));
        Ok(Self { names })
    }

    /// Catalog over an already known list of names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Available layers, in enumeration order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl SupportQuery for LayerCatalog {
    fn is_supported(&self, name: &str) -> bool {
        self.names.iter().any(|available| available == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::vulkan::tests::fake_backend::FakeBackend;

    #[test]
    fn test_lookup_is_case_sensitive() {
        let catalog = CapabilityCatalog::from_names(CatalogScope::Instance, ["VK_KHR_surface"]);
        assert!(catalog.is_supported("VK_KHR_surface"));
        assert!(!catalog.is_supported("vk_khr_surface"));
        assert!(!catalog.is_supported("VK_KHR_surface "));
    }

    #[test]
    fn test_instance_fetch_enumerates_once() {
        let backend = FakeBackend::new().with_instance_extensions(["VK_KHR_surface", "VK_EXT_debug_utils"]);
        let catalog = CapabilityCatalog::fetch(&backend, CatalogScope::Instance, &Diagnostics::disabled()).unwrap();

        assert_eq!(catalog.scope(), CatalogScope::Instance);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.is_supported("VK_EXT_debug_utils"));
        assert_eq!(backend.calls().instance_extensions, 1);
    }

    #[test]
    fn test_device_scope_fetch_is_empty() {
        let backend = FakeBackend::new().with_instance_extensions(["VK_KHR_surface"]);
        let catalog =
            CapabilityCatalog::fetch(&backend, CatalogScope::PhysicalDevice, &Diagnostics::disabled()).unwrap();

        assert!(catalog.is_empty());
        assert_eq!(backend.calls().instance_extensions, 0);
    }

    #[test]
    fn test_layer_catalog() {
        let backend = FakeBackend::new().with_layers(["VK_LAYER_KHRONOS_validation"]);
        let layers = LayerCatalog::fetch(&backend, &Diagnostics::disabled()).unwrap();

        assert!(layers.is_supported("VK_LAYER_KHRONOS_validation"));
        assert!(!layers.is_supported("VK_LAYER_khronos_validation"));
        assert_eq!(layers.names().len(), 1);
    }
}
