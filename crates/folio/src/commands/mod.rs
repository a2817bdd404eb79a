//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod paths;
pub(crate) mod serve;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::{CandidatePaths, PageResolver, SiteSettings};
use folio_store::{ClientCredentials, ContentStore, JsonApiStore};

pub(crate) use build::BuildArgs;
pub(crate) use paths::PathsArgs;
pub(crate) use serve::ServeArgs;

use crate::error::CliError;

/// Options shared by every command.
#[derive(Args, Debug)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Public origin of the front-end, used for alternate links (overrides config).
    #[arg(long, env = "FOLIO_FRONTEND_URL")]
    pub origin: Option<String>,

    /// CMS base URL (overrides config).
    #[arg(long, env = "FOLIO_BACKEND_URL")]
    pub base_url: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load config with these options and `extra` applied.
    pub(crate) fn load_config(&self, extra: CliSettings) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            origin: self.origin.clone(),
            base_url: self.base_url.clone(),
            ..extra
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Resolver settings from config.
pub(crate) fn site_settings(config: &Config) -> SiteSettings {
    SiteSettings::new(config.site.locales.clone(), config.site.origin.clone())
        .with_revalidate(config.site.revalidate())
        .with_candidates(CandidatePaths::new(config.content.type_prefixes.iter().cloned()))
}

/// JSON:API store from config, with preview credentials when configured.
pub(crate) fn content_store(config: &Config) -> Result<JsonApiStore, CliError> {
    let mut store = JsonApiStore::new(&config.backend.base_url, config.site.default_locale.clone())
        .with_api_prefix(&config.backend.api_prefix)
        .with_timeout(Duration::from_secs(config.backend.timeout_secs))
        .with_cache_ttl(config.site.revalidate());

    if config.preview.is_some() {
        let preview = config.require_preview()?;
        store = store.with_credentials(ClientCredentials {
            client_id: preview.client_id.clone(),
            client_secret: preview.client_secret.clone(),
        });
    }

    Ok(store)
}

/// Page resolver backed by the configured CMS.
pub(crate) fn page_resolver(config: &Config) -> Result<PageResolver, CliError> {
    let store: Arc<dyn ContentStore> = Arc::new(content_store(config)?);
    Ok(PageResolver::new(store, site_settings(config)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_site_settings_from_config() {
        let mut config = Config::default();
        config.site.locales = vec!["en".to_owned(), "fr".to_owned()];
        config.site.origin = "https://www.example.com".to_owned();
        config.site.revalidate_secs = 120;
        config.content.type_prefixes = vec![String::new(), "/pages".to_owned(), "/landing".to_owned()];

        let settings = site_settings(&config);

        assert_eq!(settings.locales, vec!["en".to_owned(), "fr".to_owned()]);
        assert_eq!(settings.origin, "https://www.example.com");
        assert_eq!(settings.revalidate, Duration::from_secs(120));
        assert_eq!(
            settings.candidates.paths("en", "/x"),
            vec!["en/x".to_owned(), "en/pages/x".to_owned(), "en/landing/x".to_owned()]
        );
        assert!(settings.is_multilingual());
    }

    #[test]
    fn test_content_store_rejects_incomplete_preview() {
        let mut config = Config::default();
        config.preview = Some(folio_config::PreviewConfig {
            client_id: "client".to_owned(),
            client_secret: String::new(),
            secret: "s3cret".to_owned(),
        });

        assert!(matches!(content_store(&config), Err(CliError::Config(_))));
    }
}
