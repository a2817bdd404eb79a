//! Page resolution.
//!
//! [`PageResolver`] is the entry point called by the render host: once per build
//! through [`PageResolver::list_paths`], then per page through
//! [`PageResolver::resolve_page`].
//!
//! # Resolution steps
//!
//! 1. Pick the scope: preview requests use the preview locale and authenticated
//!    store access, published requests use the route locale.
//! 2. Activate the preview session (preview only).
//! 3. Try each [`CandidatePaths`] form of the alias until one resolves.
//! 4. Fetch the footer menu.
//! 5. Fetch the page's variant in every configured locale concurrently and
//!    build the alternate links in configured order.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use folio_store::{ContentStore, ObjectName, ObjectQuery, PathQuery, Scope, StoreError};
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::alias::AliasPath;
use crate::candidates::CandidatePaths;
use crate::error::ResolveError;
use crate::page::{LocaleLink, Page, PageProps, PathAlias, PathList, StaticProps};
use crate::paths::{PathEnumerator, StorePathEnumerator};

/// Fields requested for the page object.
const PAGE_FIELDS: [&str; 4] = ["id", "title", "body", "path"];

/// Site-wide settings consumed by the resolver.
#[derive(Clone, Debug)]
pub struct SiteSettings {
    /// Configured locales, in output order.
    pub locales: Vec<String>,
    /// Public origin of the front-end.
    pub origin: String,
    /// Revalidation hint attached to every result.
    pub revalidate: Duration,
    /// Alias forms tried in order.
    pub candidates: CandidatePaths,
}

impl SiteSettings {
    #[must_use]
    pub fn new(locales: Vec<String>, origin: impl Into<String>) -> Self {
        Self {
            locales,
            origin: origin.into(),
            revalidate: Duration::from_secs(60),
            candidates: CandidatePaths::default(),
        }
    }

    #[must_use]
    pub fn with_revalidate(mut self, revalidate: Duration) -> Self {
        self.revalidate = revalidate;
        self
    }

    #[must_use]
    pub fn with_candidates(mut self, candidates: CandidatePaths) -> Self {
        self.candidates = candidates;
        self
    }

    /// Whether store paths carry a language prefix.
    #[must_use]
    pub fn is_multilingual(&self) -> bool {
        self.locales.len() > 1
    }
}

/// How a page is rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Published content, cacheable.
    Published,
    /// Editor preview in `locale`, bypassing caches.
    Preview { locale: String },
}

impl RenderMode {
    #[must_use]
    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview { .. })
    }

    /// Locale whose content is rendered: the preview locale when previewing.
    #[must_use]
    pub fn effective_locale<'a>(&'a self, route_locale: &'a str) -> &'a str {
        match self {
            Self::Published => route_locale,
            Self::Preview { locale } => locale,
        }
    }
}

/// One page resolution request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub segments: AliasPath,
    /// Route locale; must be configured.
    pub locale: String,
    pub mode: RenderMode,
}

/// Only the alias part of a page variant is needed for alternate links.
#[derive(Deserialize)]
struct Variant {
    path: PathAlias,
}

/// Resolves page aliases against a content store.
pub struct PageResolver {
    store: Arc<dyn ContentStore>,
    enumerator: Box<dyn PathEnumerator>,
    settings: SiteSettings,
}

impl PageResolver {
    /// Create a resolver enumerating static paths from the same store.
    #[must_use]
    pub fn new(store: Arc<dyn ContentStore>, settings: SiteSettings) -> Self {
        let type_prefix = settings
            .candidates
            .type_prefixes()
            .get(1)
            .cloned()
            .unwrap_or_default();
        let enumerator = StorePathEnumerator::new(Arc::clone(&store), ObjectName::page())
            .with_type_prefix(&type_prefix);
        Self {
            store,
            enumerator: Box::new(enumerator),
            settings,
        }
    }

    /// Replace the static path enumerator.
    #[must_use]
    pub fn with_enumerator(mut self, enumerator: Box<dyn PathEnumerator>) -> Self {
        self.enumerator = enumerator;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    /// Every static route for basic pages, without duplicates.
    ///
    /// Enumeration failures are logged and yield `None`; the caller renders no
    /// static paths instead of failing the build.
    pub fn list_paths(&self) -> Option<PathList> {
        match self.enumerator.enumerate(&self.settings.locales) {
            Ok(paths) => {
                let mut seen = HashSet::new();
                let paths: Vec<_> = paths.into_iter().filter(|p| seen.insert(p.clone())).collect();
                debug!(count = paths.len(), "Enumerated static paths");
                Some(PathList {
                    paths,
                    fallback: false,
                })
            }
            Err(err) => {
                error!(error = %err, "Failed to fetch paths for pages");
                None
            }
        }
    }

    /// Resolve one alias to page props.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the locale is unknown, preview activation
    /// fails, no candidate alias resolves, or the footer or any locale variant
    /// can't be fetched.
    pub fn resolve_page(&self, request: &PageRequest) -> Result<StaticProps, ResolveError> {
        self.require_locale(&request.locale)?;
        let preview = request.mode.is_preview();
        let locale = request.mode.effective_locale(&request.locale);
        self.require_locale(locale)?;

        let scope = Scope {
            locale: locale.to_owned(),
            authenticated: preview,
        };
        let alias = request.segments.join();

        if preview {
            self.store
                .activate_preview(&scope)
                .map_err(ResolveError::Preview)?;
        }

        let language_prefix = if self.settings.is_multilingual() {
            locale
        } else {
            ""
        };
        let page = self.fetch_page(&scope, language_prefix, &alias, preview)?;

        let footer_menu = self
            .store
            .object(&scope, &ObjectQuery::new(ObjectName::main_menu()))
            .map_err(ResolveError::FooterMenu)?;

        let href_lang = self.localized_links(&page, &alias, preview)?;

        Ok(StaticProps {
            props: PageProps {
                page,
                footer_menu,
                href_lang,
            },
            revalidate: self.settings.revalidate,
        })
    }

    fn require_locale(&self, locale: &str) -> Result<(), ResolveError> {
        if self.settings.locales.iter().any(|l| l == locale) {
            Ok(())
        } else {
            Err(ResolveError::UnknownLocale(locale.to_owned()))
        }
    }

    /// Try each candidate alias form in order, stopping at the first hit.
    fn fetch_page(
        &self,
        scope: &Scope,
        language_prefix: &str,
        alias: &str,
        refresh: bool,
    ) -> Result<Page, ResolveError> {
        let mut failure = None;

        for (attempt, path) in self
            .settings
            .candidates
            .paths(language_prefix, alias)
            .into_iter()
            .enumerate()
        {
            let query = PathQuery::new(ObjectName::page(), path.clone())
                .with_fields(PAGE_FIELDS)
                .with_refresh(refresh);
            match self.store.object_by_path(scope, &query) {
                Ok(object) => {
                    if attempt > 0 {
                        warn!(alias, path = %path, "Resolved page through fallback alias");
                    }
                    return Ok(serde_json::from_value(object)?);
                }
                Err(err) => {
                    debug!(path = %path, error = %err, "Alias candidate failed");
                    failure = Some((path, err));
                }
            }
        }

        let (path, source) =
            failure.unwrap_or_else(|| (alias.to_owned(), StoreError::not_found(alias)));
        Err(ResolveError::PageNotFound { path, source })
    }

    /// Alternate links for every configured locale, fetched concurrently.
    fn localized_links(
        &self,
        page: &Page,
        alias: &str,
        preview: bool,
    ) -> Result<Vec<LocaleLink>, ResolveError> {
        self.settings
            .locales
            .par_iter()
            .map(|locale| -> Result<LocaleLink, ResolveError> {
                let scope = Scope {
                    locale: locale.clone(),
                    authenticated: preview,
                };
                let query = ObjectQuery::by_id(ObjectName::page(), page.id.clone())
                    .with_fields(["path"])
                    .with_refresh(preview);
                let object = self.store.object(&scope, &query).map_err(|source| {
                    ResolveError::Translation {
                        locale: locale.clone(),
                        id: page.id.clone(),
                        source,
                    }
                })?;
                let variant: Variant = serde_json::from_value(object)?;
                let variant_alias = variant.path.alias.as_deref().unwrap_or(alias);
                Ok(LocaleLink::new(
                    locale,
                    &self.settings.origin,
                    &variant.path.langcode,
                    variant_alias,
                ))
            })
            .collect()
    }
}
