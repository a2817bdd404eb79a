//! Page resolution errors.

use folio_store::StoreError;

/// Error returned by [`PageResolver::resolve_page`](crate::PageResolver::resolve_page).
///
/// Resolution has no partial-result mode: any of these aborts the whole page.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Requested or preview locale is not configured.
    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    /// Preview session could not be activated.
    #[error("preview activation failed")]
    Preview(#[source] StoreError),

    /// Every candidate alias form failed. Carries the last attempt.
    #[error("page not found at {path}")]
    PageNotFound {
        /// Last store path tried.
        path: String,
        #[source]
        source: StoreError,
    },

    /// Footer menu could not be fetched.
    #[error("failed to load footer menu")]
    FooterMenu(#[source] StoreError),

    /// A locale's variant of the page could not be fetched.
    #[error("failed to load {locale} variant of page {id}")]
    Translation {
        locale: String,
        id: String,
        #[source]
        source: StoreError,
    },

    /// Store returned an object that is not a page.
    #[error("malformed page object: {0}")]
    InvalidPage(#[from] serde_json::Error),
}
