//! Shared types, error model, and configuration for doclib.
//!
//! This crate is the foundation depended on by all other doclib crates.
//! It provides:
//! - [`DocLibError`], the unified error type
//! - Domain types ([`CorpusEntry`], [`Category`], [`CategoryCatalog`], [`LibraryManifest`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnalysisConfig, AnalysisCredentials, AppConfig, BuildConfig, BuildOverrides, CorpusConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from, load_credentials,
    parse_base_url,
};
pub use error::{DocLibError, Result};
pub use types::{
    CURRENT_SCHEMA_VERSION, Category, CategoryCatalog, CategoryInfo, CorpusEntry, EmittedFile,
    Frontmatter, FrontmatterValue, LibraryManifest, ManifestCategory,
};
