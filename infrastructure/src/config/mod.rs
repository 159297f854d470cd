//! Configuration file loading for ube
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `UBE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./ube.toml` or `./.ube.toml`
//! 4. Global: `$XDG_CONFIG_HOME/ube/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAuditConfig, FileBackendConfig, FileConfig, FileExecutionConfig,
    FileGovernanceConfig, FileLoggingConfig,
};
pub use loader::ConfigLoader;
