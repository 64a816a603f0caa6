//! Shared types, error model, and configuration for stylebuild.
//!
//! This crate is the foundation depended on by all other stylebuild crates.
//! It provides:
//! - [`StyleBuildError`]: the unified error type
//! - Domain types ([`SourceDocument`], [`OutputDocument`], [`BuildReport`])
//! - Configuration ([`BuildConfig`], [`ThemeConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    BuildConfig, CONFIG_FILE_NAME, ColorValue, DarkMode, PathsConfig, PostprocessConfig,
    ThemeConfig, ThemeScales, init_config, load_config, load_config_from, load_config_in,
};
pub use error::{Result, StyleBuildError};
pub use types::{BuildReport, OutputDocument, SourceDocument};
