//! Foundation module - Core utilities and types
//!
//! - Logging utilities and the diagnostics context

pub mod logging;
