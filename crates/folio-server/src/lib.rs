//! HTTP server for Folio pages.
//!
//! Serves pages resolved from the content store as HTML:
//! - `GET /pages/{alias}` and `GET /{locale}/pages/{alias}` for every route
//!   enumerated at startup
//! - `GET /api/preview` and `GET /api/exit-preview` to toggle preview mode
//!
//! Published pages are cached and revalidated in the background once older
//! than the configured interval. Preview requests bypass the cache.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_server::{run_server, server_config_from_folio_config};
//! use folio_site::{PageResolver, SiteSettings};
//! use folio_store::JsonApiStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = folio_config::Config::load(None, None).unwrap();
//!     let store = Arc::new(JsonApiStore::new(&config.backend.base_url, "en"));
//!     let settings = SiteSettings::new(config.site.locales.clone(), config.site.origin.clone());
//!     let resolver = Arc::new(PageResolver::new(store, settings));
//!
//!     let server_config = server_config_from_folio_config(&config, "1.0.0".to_owned());
//!     run_server(server_config, resolver).await.unwrap();
//! }
//! ```

mod app;
mod cache;
mod error;
mod handlers;
mod middleware;
mod state;

use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use folio_render::SiteMeta;
use folio_site::PageResolver;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Locale of routes without a locale segment.
    pub default_locale: String,
    /// Secret required by `/api/preview` (`None` disables preview).
    pub preview_secret: Option<String>,
    /// Site data for the page template.
    pub site: SiteMeta,
    /// Application version (for `ETag`s).
    pub version: String,
}

/// Run the server.
///
/// Enumerates the static routes once, then serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(
    config: ServerConfig,
    resolver: Arc<PageResolver>,
) -> Result<(), Box<dyn std::error::Error>> {
    let known_paths = {
        let resolver = Arc::clone(&resolver);
        tokio::task::spawn_blocking(move || resolver.list_paths()).await?
    };
    let known_paths: HashSet<_> = match known_paths {
        Some(list) => list.paths.into_iter().collect(),
        None => {
            tracing::warn!("No static paths available, every published page will be a 404");
            HashSet::new()
        }
    };
    tracing::info!(pages = known_paths.len(), "Loaded static paths");

    let state = Arc::new(
        AppState::new(resolver, config.site, config.default_locale, known_paths)
            .with_preview_secret(config.preview_secret)
            .with_version(config.version),
    );

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Site template data from Folio config.
#[must_use]
pub fn site_meta_from_folio_config(config: &folio_config::Config) -> SiteMeta {
    SiteMeta {
        name: config.site.name.clone(),
        description: Some(config.site.description.clone()).filter(|d| !d.is_empty()),
        listing_path: config.content.listing_path.clone(),
        multilingual: config.site.is_multilingual(),
    }
}

/// Create server configuration from Folio config.
#[must_use]
pub fn server_config_from_folio_config(config: &folio_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        default_locale: config.site.default_locale.clone(),
        preview_secret: config.preview.as_ref().map(|preview| preview.secret.clone()),
        site: site_meta_from_folio_config(config),
        version,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_from_default_config() {
        let config = folio_config::Config::default();

        let server = server_config_from_folio_config(&config, "1.2.3".to_owned());

        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 3000);
        assert_eq!(server.default_locale, "en");
        assert!(server.preview_secret.is_none());
        assert_eq!(server.site.listing_path, "/pages");
        assert!(!server.site.multilingual);
        assert_eq!(server.version, "1.2.3");
    }
}
