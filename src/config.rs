use crate::browser::StalePolicy;
use crate::constants::{API_BASE_URL_ENV, DEFAULT_API_BASE_URL};
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Resolved configuration with all values filled in (no Options).
///
/// Layers, lowest to highest priority: built-in defaults, an optional TOML file,
/// the `API_BASE_URL` environment variable (a `.env` file is honored), command-line
/// flags. All fields have concrete values, making it safe to access directly without
/// unwrapping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Origin of the auction API; `/api/subastas` and `/api/exportar` are resolved against it
    pub api_base_url: String,
    /// Directory exported spreadsheets are written to
    pub download_dir: PathBuf,
    /// Drop search responses that resolve after a newer one was applied.
    /// When false, the last response to arrive wins.
    pub discard_stale_searches: bool,
    /// Print map links instead of launching the system browser
    pub print_map_links: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            download_dir: PathBuf::from("."),
            discard_stale_searches: false,
            print_map_links: false,
        }
    }
}

impl ResolvedConfig {
    /// Loads configuration from a TOML file; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read, the TOML is malformed, unknown keys
    /// are present, or the resulting configuration does not validate.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: ResolvedConfig = toml::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the effective configuration from every layer.
    ///
    /// `env_base_url` is the value of `API_BASE_URL` (if set) and `flag_base_url` the
    /// `--api-base-url` flag; both are passed in so the layering stays testable.
    pub fn resolve(
        config_path: Option<&Path>,
        env_base_url: Option<String>,
        flag_base_url: Option<&str>,
    ) -> AppResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = env_base_url.filter(|u| !u.trim().is_empty()) {
            config.api_base_url = url;
        }
        if let Some(url) = flag_base_url {
            config.api_base_url = url.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reads `API_BASE_URL` after loading a `.env` file, if one exists.
    pub fn env_base_url() -> Option<String> {
        // A missing .env file is the common case
        let _ = dotenvy::dotenv();
        std::env::var(API_BASE_URL_ENV).ok()
    }

    /// Checks that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> AppResult<()> {
        let url = Url::parse(&self.api_base_url).map_err(|e| {
            AppError::Config(format!("Invalid api_base_url '{}': {e}", self.api_base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "api_base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }

    pub fn stale_policy(&self) -> StalePolicy {
        if self.discard_stale_searches {
            StalePolicy::DiscardStale
        } else {
            StalePolicy::LastResolvedWins
        }
    }
}
