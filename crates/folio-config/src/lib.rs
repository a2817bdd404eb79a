//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.origin`
//! - `backend.base_url`
//! - `server.host`
//! - `preview.client_id`
//! - `preview.client_secret`
//! - `preview.secret`

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override public origin used for localized links.
    pub origin: Option<String>,
    /// Override CMS base URL.
    pub base_url: Option<String>,
    /// Override static build output directory.
    pub output_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Environment variable holding the public origin of the front-end.
pub const ORIGIN_ENV: &str = "FOLIO_FRONTEND_URL";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide settings (locales, origin, revalidation).
    pub site: SiteConfig,
    /// Content backend connection.
    pub backend: BackendConfig,
    /// Preview credentials (optional section).
    pub preview: Option<PreviewConfig>,
    /// Content type routing.
    pub content: ContentConfig,
    /// Server configuration.
    pub server: ServerConfig,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,

    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    #[allow(clippy::derivable_impls)]
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site name used as the document title.
    pub name: String,
    /// Meta description.
    pub description: String,
    /// Public origin prepended to localized links (e.g. `https://www.example.com`).
    pub origin: String,
    /// Configured locales, in output order.
    pub locales: Vec<String>,
    /// Locale served without a URL prefix.
    pub default_locale: String,
    /// Seconds after which a generated page is stale.
    pub revalidate_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Folio".to_owned(),
            description: "Pages rendered from a headless CMS.".to_owned(),
            origin: format!("${{{ORIGIN_ENV}:-http://localhost:3000}}"),
            locales: vec!["en".to_owned()],
            default_locale: "en".to_owned(),
            revalidate_secs: 60,
        }
    }
}

impl SiteConfig {
    /// Whether more than one locale is configured.
    #[must_use]
    pub fn is_multilingual(&self) -> bool {
        self.locales.len() > 1
    }

    /// Revalidation interval.
    #[must_use]
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

/// Content backend configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// CMS base URL.
    pub base_url: String,
    /// JSON:API path prefix.
    pub api_prefix: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "${FOLIO_BACKEND_URL:-http://localhost:8080}".to_owned(),
            api_prefix: "jsonapi".to_owned(),
            timeout_secs: 30,
        }
    }
}

/// Preview configuration.
#[derive(Debug, Deserialize)]
pub struct PreviewConfig {
    /// OAuth client id for the client-credentials grant.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Shared secret editors pass to enter preview mode.
    pub secret: String,
}

impl PreviewConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.client_id, "preview.client_id")?;
        require_non_empty(&self.client_secret, "preview.client_secret")?;
        require_non_empty(&self.secret, "preview.secret")?;
        Ok(())
    }
}

/// Content type routing configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Alias prefixes tried in order when resolving a page. The first must be empty.
    pub type_prefixes: Vec<String>,
    /// Listing route linked from every page.
    pub listing_path: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            type_prefixes: vec![String::new(), "/pages".to_owned()],
            listing_path: "/pages".to_owned(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// Raw build configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    output_dir: Option<String>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug, Default)]
pub struct BuildConfig {
    /// Directory receiving generated HTML.
    pub output_dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`preview.client_secret`").
        field: String,
        /// Error message (e.g., "${`FOLIO_CLIENT_SECRET`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and expansion, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            let mut config = Self::default_with_cwd();
            config.expand_env_vars()?;
            config
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(origin) = &settings.origin {
            self.site.origin.clone_from(origin);
        }
        if let Some(base_url) = &settings.base_url {
            self.backend.base_url.clone_from(base_url);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
    }

    /// Get validated preview configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_preview(&self) -> Result<&PreviewConfig, ConfigError> {
        let preview = self.preview.as_ref().ok_or_else(|| {
            ConfigError::Validation("[preview] section required in config".into())
        })?;
        preview.validate()?;
        Ok(preview)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            backend: BackendConfig::default(),
            preview: None,
            content: ContentConfig::default(),
            server: ServerConfig::default(),
            build: BuildConfigRaw::default(),
            build_resolved: BuildConfig {
                output_dir: base.join("out"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`]. The `[preview]` section is
    /// validated lazily through [`Config::require_preview`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_backend()?;
        self.validate_content()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        let site = &self.site;
        require_non_empty(&site.origin, "site.origin")?;
        require_http_url(&site.origin, "site.origin")?;

        if site.locales.is_empty() {
            return Err(ConfigError::Validation(
                "site.locales must list at least one locale".to_owned(),
            ));
        }
        let mut seen = HashSet::new();
        for locale in &site.locales {
            require_non_empty(locale, "site.locales")?;
            if !seen.insert(locale.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "site.locales contains duplicate locale '{locale}'"
                )));
            }
        }
        if !site.locales.contains(&site.default_locale) {
            return Err(ConfigError::Validation(format!(
                "site.default_locale '{}' is not listed in site.locales",
                site.default_locale
            )));
        }
        if site.revalidate_secs == 0 {
            return Err(ConfigError::Validation(
                "site.revalidate_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_backend(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.backend.base_url, "backend.base_url")?;
        require_http_url(&self.backend.base_url, "backend.base_url")?;
        require_non_empty(&self.backend.api_prefix, "backend.api_prefix")?;
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "backend.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_content(&self) -> Result<(), ConfigError> {
        match self.content.type_prefixes.first() {
            Some(first) if first.is_empty() => {}
            _ => {
                return Err(ConfigError::Validation(
                    "content.type_prefixes must start with the empty prefix".to_owned(),
                ));
            }
        }
        for prefix in &self.content.type_prefixes[1..] {
            if !prefix.starts_with('/') || prefix.ends_with('/') {
                return Err(ConfigError::Validation(format!(
                    "content.type_prefixes entry '{prefix}' must start with '/' and not end with '/'"
                )));
            }
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.origin = expand::expand_env(&self.site.origin, "site.origin")?;
        self.backend.base_url = expand::expand_env(&self.backend.base_url, "backend.base_url")?;
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref mut preview) = self.preview {
            preview.client_id = expand::expand_env(&preview.client_id, "preview.client_id")?;
            preview.client_secret =
                expand::expand_env(&preview.client_secret, "preview.client_secret")?;
            preview.secret = expand::expand_env(&preview.secret, "preview.secret")?;
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.build_resolved = BuildConfig {
            output_dir: config_dir.join(self.build.output_dir.as_deref().unwrap_or("out")),
        };
    }
}
