//! Configuration module for Dompet
//!
//! This module provides configuration management including:
//! - platform-aware path resolution
//! - user settings persistence

pub mod paths;
pub mod settings;

pub use paths::DompetPaths;
pub use settings::Settings;
