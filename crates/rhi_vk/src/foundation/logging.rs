//! Logging utilities and the diagnostics context
//!
//! The crate never logs through hidden global switches. Every component holds
//! a [`Diagnostics`] value decided once at build time, which classifies each
//! message by severity and forwards it to the `log` facade. The output and
//! error sinks are whatever logger the host process installed, `env_logger`
//! through [`init`] by default.

pub use log::{debug, error, info, trace, warn};

use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default `log` target used by [`Diagnostics`]
pub const DEFAULT_TARGET: &str = "rhi_vk";

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize `env_logger` with a default level filter, still honouring
/// `RUST_LOG` when it is set
pub fn init_with_filter(filter: LevelFilter) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .try_init()
}

/// Serializable switches for a [`Diagnostics`] context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Master switch for all messages
    pub enabled: bool,
    /// Debug-severity messages are only emitted when this is also set
    pub debug_enabled: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug_enabled: cfg!(debug_assertions),
        }
    }
}

/// Explicit diagnostics context held by each negotiation component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    enabled: bool,
    debug_enabled: bool,
    target: &'static str,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::from_config(DiagnosticsConfig::default())
    }
}

impl Diagnostics {
    /// Build a context from its serialized switches
    pub const fn from_config(config: DiagnosticsConfig) -> Self {
        Self {
            enabled: config.enabled,
            debug_enabled: config.debug_enabled,
            target: DEFAULT_TARGET,
        }
    }

    /// A context that drops every message
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            debug_enabled: false,
            target: DEFAULT_TARGET,
        }
    }

    /// Route messages to a different `log` target
    pub const fn with_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    /// Toggle debug-severity output
    pub const fn with_debug(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }

    /// Whether any message is emitted at all
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether debug-severity messages are emitted
    pub const fn is_debug_enabled(&self) -> bool {
        self.enabled && self.debug_enabled
    }

    /// The `log` target messages are tagged with
    pub const fn target(&self) -> &'static str {
        self.target
    }

    /// Whether a message of this severity would reach the logger
    pub fn would_emit(&self, level: Level) -> bool {
        match level {
            Level::Debug => self.is_debug_enabled(),
            _ => self.enabled,
        }
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.would_emit(level) {
            log::log!(target: self.target, level, "{}", args);
        }
    }

    /// Informational message
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    /// Fine-grained tracing message
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Trace, args);
    }

    /// Debug message, gated by `debug_enabled`
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    /// Recoverable problem
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    /// Failure returned to the caller
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    /// Unrecoverable failure; `log` has no fatal level so it is marked on an
    /// error record
    pub fn fatal(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, format_args!("[FATAL] {}", args));
    }
}
