//! Required/optional capability negotiation
//!
//! [`resolve`] walks an ordered request list against a catalog. The first
//! missing required request ends resolution; missing optional requests are
//! dropped with a warning. Surviving names keep their request order.

use serde::{Deserialize, Serialize};

use crate::backend::vulkan::error::ResolveError;
use crate::backend::vulkan::initialization::catalog::SupportQuery;
use crate::foundation::logging::Diagnostics;

const fn default_required() -> bool {
    true
}

/// A named extension or layer the caller asks for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityRequest {
    /// Exact native name
    pub name: String,
    /// Whether resolution fails when the name is unavailable
    #[serde(default = "default_required")]
    pub required: bool,
}

impl CapabilityRequest {
    /// Create a request
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
        }
    }

    /// A request that must be satisfied
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// A request that is dropped when unavailable
    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }
}

/// Match `requests` against `catalog`, in order
///
/// Returns the supported names in request order, or the name of the first
/// unsupported required request. Requests after that one are never looked at.
pub fn resolve<Q>(
    requests: &[CapabilityRequest],
    catalog: &Q,
    diagnostics: &Diagnostics,
) -> Result<Vec<String>, ResolveError>
where
    Q: SupportQuery + ?Sized,
{
    let mut found = Vec::with_capacity(requests.len());

    for request in requests {
        if catalog.is_supported(&request.name) {
            diagnostics.debug(format_args!("Capability {} found.", request.name));
            found.push(request.name.clone());
        } else if request.required {
            diagnostics.error(format_args!("Required capability {} is missing.", request.name));
            return Err(ResolveError::Missing {
                name: request.name.clone(),
            });
        } else {
            diagnostics.warn(format_args!("Non-required capability {} is missing.", request.name));
        }
    }

    diagnostics.debug(format_args!("All required capabilities found."));
    Ok(found)
}
