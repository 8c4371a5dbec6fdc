//! Application state for the compensation rules engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::engine::{HandlerRegistry, builtin_handlers};

/// Shared application state.
///
/// Holds the loaded configuration and the custom handlers every evaluation
/// can call. Both are shared immutably across requests.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine configuration.
    config: Arc<ConfigLoader>,
    /// Custom handlers available to CUSTOM actions.
    handlers: HandlerRegistry,
}

impl AppState {
    /// Creates application state with the built-in custom handlers.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_handlers(config, builtin_handlers())
    }

    /// Creates application state with a caller-chosen handler registry.
    pub fn with_handlers(config: ConfigLoader, handlers: HandlerRegistry) -> Self {
        Self {
            config: Arc::new(config),
            handlers,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the custom handler registry.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }
}
