//! Application state.
//!
//! Shared state for all request handlers.

use std::collections::HashSet;
use std::sync::Arc;

use folio_render::SiteMeta;
use folio_site::{PageResolver, StaticPath};

use crate::cache::RevalidatingCache;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Page resolver backed by the content store.
    pub(crate) resolver: Arc<PageResolver>,
    /// Site data for the page template.
    pub(crate) site: SiteMeta,
    /// Locale of routes without a locale segment.
    pub(crate) default_locale: String,
    /// Routes served in published mode; anything else is a 404.
    pub(crate) known_paths: HashSet<StaticPath>,
    /// Published pages.
    pub(crate) cache: RevalidatingCache,
    /// Secret required to enter preview mode (`None` disables preview).
    pub(crate) preview_secret: Option<String>,
    /// Application version for `ETag`s.
    pub(crate) version: String,
}

impl AppState {
    pub(crate) fn new(
        resolver: Arc<PageResolver>,
        site: SiteMeta,
        default_locale: String,
        known_paths: HashSet<StaticPath>,
    ) -> Self {
        let cache = RevalidatingCache::new(resolver.settings().revalidate);
        Self {
            resolver,
            site,
            default_locale,
            known_paths,
            cache,
            preview_secret: None,
            version: String::new(),
        }
    }

    #[must_use]
    pub(crate) fn with_preview_secret(mut self, secret: Option<String>) -> Self {
        self.preview_secret = secret;
        self
    }

    #[must_use]
    pub(crate) fn with_version(mut self, version: String) -> Self {
        self.version = version;
        self
    }

    /// Check if `locale` is configured.
    pub(crate) fn has_locale(&self, locale: &str) -> bool {
        self.resolver.settings().locales.iter().any(|l| l == locale)
    }
}
