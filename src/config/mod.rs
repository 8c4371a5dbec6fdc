//! Configuration loading and management for the compensation rules engine.
//!
//! This module loads engine settings and rule sets from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use comp_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded {} v{}", config.settings().name, config.settings().version);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, EngineSettings};
