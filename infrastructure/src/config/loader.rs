//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order
const PROJECT_CONFIG_FILES: [&str; 2] = ["ube.toml", ".ube.toml"];

/// Prefix of environment overrides, e.g. `UBE_BACKEND__MODEL=gpt-4o`
const ENV_PREFIX: &str = "UBE_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `UBE_`-prefixed environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./ube.toml` or `./.ube.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/ube/config.toml` (or the platform equivalent)
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// The merged provider chain, before extraction.
    pub fn figment(config_path: Option<&PathBuf>) -> Figment {
        let mut figment = Self::file_figment(
            Self::global_config_path().filter(|p| p.exists()).as_deref(),
            Self::project_config_path().as_deref(),
            config_path.map(PathBuf::as_path),
        );

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        figment
    }

    /// Defaults overlaid by whichever of the given files are present.
    fn file_figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project, explicit].into_iter().flatten() {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ube").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");
        println!("  [ENV  ] {}* variables", ENV_PREFIX);

        if let Some(path) = config_path {
            let state = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", state, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./ube.toml or ./.ube.toml");
        }

        if let Some(path) = Self::global_config_path() {
            let state = if path.exists() { "FOUND" } else { "     " };
            println!("  [{}] Global:  {}", state, path.display());
        }

        println!("  [     ] Default: built-in defaults");
    }
}
