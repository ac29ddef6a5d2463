//! # Backend Module
//!
//! Concrete graphics API backends. Vulkan is the only one.

pub mod vulkan;
