//! Application configuration for doclib.
//!
//! User config lives at `~/.doclib/doclib.toml`.
//! CLI flags (and their env vars) override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocLibError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "doclib.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".doclib";

// ---------------------------------------------------------------------------
// Config structs (matching doclib.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Corpus input/output settings.
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Analysis service settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// `[corpus]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Root of the documentation source tree.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    /// Directory the library is written to (recreated on every build).
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Base URL source links are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            output_dir: default_output_dir(),
            base_url: default_base_url(),
        }
    }
}

fn default_docs_dir() -> String {
    "../mux.com/apps/web/app/docs".into()
}
fn default_output_dir() -> String {
    "docs-library".into()
}
fn default_base_url() -> String {
    "https://docs.mux.com".into()
}

/// `[analysis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Base endpoint of the analysis service.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Name of the env var holding the token id (never store the token itself).
    #[serde(default = "default_token_id_env")]
    pub token_id_env: String,

    /// Name of the env var holding the token secret.
    #[serde(default = "default_token_secret_env")]
    pub token_secret_env: String,

    /// Provider used when none is given on the command line.
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token_id_env: default_token_id_env(),
            token_secret_env: default_token_secret_env(),
            default_provider: default_provider(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:4100/v1".into()
}
fn default_token_id_env() -> String {
    "MUX_TOKEN_ID".into()
}
fn default_token_secret_env() -> String {
    "MUX_TOKEN_SECRET".into()
}
fn default_provider() -> String {
    "openai".into()
}
fn default_timeout_secs() -> u64 {
    120
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Values given on the command line or through env vars.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    pub docs_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

/// Runtime build configuration, validated and ready to use.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Existing documentation root.
    pub docs_dir: PathBuf,
    /// Library output directory.
    pub output_dir: PathBuf,
    /// Base URL, always ending in `/`.
    pub base_url: Url,
}

impl BuildConfig {
    /// Merge overrides over the config file and run the fatal checks.
    ///
    /// Fails before any processing if the docs directory is missing or the
    /// base URL cannot serve as a base for relative resolution.
    pub fn resolve(config: &AppConfig, overrides: BuildOverrides) -> Result<Self> {
        let docs_dir = overrides
            .docs_dir
            .unwrap_or_else(|| PathBuf::from(&config.corpus.docs_dir));
        let output_dir = overrides
            .output_dir
            .unwrap_or_else(|| PathBuf::from(&config.corpus.output_dir));
        let base_url = overrides
            .base_url
            .unwrap_or_else(|| config.corpus.base_url.clone());

        if !docs_dir.is_dir() {
            return Err(DocLibError::config(format!(
                "docs directory not found: {}\n\
                 Set DOCLIB_DOCS_DIR (or pass --docs-dir) to your local docs checkout.",
                docs_dir.display()
            )));
        }

        let base_url = parse_base_url(&base_url)?;
        tracing::debug!(docs_dir = %docs_dir.display(), %base_url, "build config resolved");

        Ok(Self {
            docs_dir,
            output_dir,
            base_url,
        })
    }
}

/// Parse a base URL, appending the trailing slash relative joins rely on.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&with_slash).map_err(|e| {
        DocLibError::config(format!(
            "invalid base URL '{raw}': {e}\nSet DOCLIB_BASE_URL to an absolute URL such as https://docs.example.com"
        ))
    })?;

    if url.cannot_be_a_base() {
        return Err(DocLibError::config(format!(
            "base URL '{raw}' cannot be used to resolve relative paths"
        )));
    }

    Ok(url)
}

// ---------------------------------------------------------------------------
// Analysis credentials
// ---------------------------------------------------------------------------

/// Token pair for the analysis service.
#[derive(Clone)]
pub struct AnalysisCredentials {
    pub token_id: String,
    pub token_secret: String,
}

impl std::fmt::Debug for AnalysisCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisCredentials")
            .field("token_id", &self.token_id)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

/// Read the analysis token pair from the env vars named in the config.
pub fn load_credentials(config: &AppConfig) -> Result<AnalysisCredentials> {
    let id_var = &config.analysis.token_id_env;
    let secret_var = &config.analysis.token_secret_env;

    match (std::env::var(id_var), std::env::var(secret_var)) {
        (Ok(token_id), Ok(token_secret)) if !token_id.is_empty() && !token_secret.is_empty() => {
            Ok(AnalysisCredentials {
                token_id,
                token_secret,
            })
        }
        _ => Err(DocLibError::config(format!(
            "analysis credentials not found. Set both {id_var} and {secret_var}."
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.doclib/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DocLibError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.doclib/doclib.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocLibError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocLibError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocLibError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocLibError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocLibError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
