//! # Core Module
//!
//! Configuration types shared by the backends.

pub mod config;

pub use config::{Config, ConfigError, InstanceConfig};
