//! Content store trait, query descriptors and error types.
//!
//! Provides the core [`ContentStore`] trait for querying content objects,
//! along with [`StoreError`] for unified error handling across backends.
//!
//! # Scopes
//!
//! Every method takes a [`Scope`]. The scope selects the language variant of
//! the content and whether the request carries preview credentials:
//! - `Scope::public("en")` - published English content, cacheable
//! - `Scope::authenticated("fr")` - French content including unpublished revisions
//!
//! Query parameters never live on the store itself; each call receives an
//! immutable [`PathQuery`] or [`ObjectQuery`].

use crate::object::ObjectName;

/// A content object as returned by the store.
///
/// Resources are flattened: `id` and `type` sit next to the resource attributes
/// (e.g. `title`, `body`, `path`). Collections are JSON arrays of such objects.
pub type ContentObject = serde_json::Value;

/// Locale and authentication context of a store call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scope {
    /// Language code of the requested variant.
    pub locale: String,
    /// True for preview requests using editor credentials.
    pub authenticated: bool,
}

impl Scope {
    /// Scope for published content.
    #[must_use]
    pub fn public(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            authenticated: false,
        }
    }

    /// Scope for preview content.
    #[must_use]
    pub fn authenticated(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            authenticated: true,
        }
    }
}

/// Lookup of a single object by its URL alias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathQuery {
    /// Resource type the alias must resolve to.
    pub object_name: ObjectName,
    /// Alias path, optionally prefixed with a language code (e.g. `en/about`).
    pub path: String,
    /// Attributes to fetch. Empty fetches all attributes.
    pub fields: Vec<String>,
    /// Bypass any cached response.
    pub refresh: bool,
}

impl PathQuery {
    #[must_use]
    pub fn new(object_name: ObjectName, path: impl Into<String>) -> Self {
        Self {
            object_name,
            path: path.into(),
            fields: Vec::new(),
            refresh: false,
        }
    }

    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }
}

/// Lookup of an object by id, or of a whole resource collection when `id` is `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectQuery {
    /// Resource type.
    pub object_name: ObjectName,
    /// Stable object id. `None` returns every object of the type as an array.
    pub id: Option<String>,
    /// Attributes to fetch. Empty fetches all attributes.
    pub fields: Vec<String>,
    /// Bypass any cached response.
    pub refresh: bool,
}

impl ObjectQuery {
    /// Query for the whole resource collection.
    #[must_use]
    pub fn new(object_name: ObjectName) -> Self {
        Self {
            object_name,
            id: None,
            fields: Vec::new(),
            refresh: false,
        }
    }

    /// Query for a single object.
    #[must_use]
    pub fn by_id(object_name: ObjectName, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(object_name)
        }
    }

    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }
}

/// Semantic error categories (inspired by Object Store + `OpenDAL`).
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Object does not exist at the requested path or id.
    NotFound,
    /// Credentials missing or rejected.
    PermissionDenied,
    /// Malformed object name or response payload.
    InvalidObject,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Too many requests.
    RateLimited,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance (from `OpenDAL`).
#[derive(Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (config error, not found, invalid object).
    #[default]
    Permanent,
    /// Retry immediately (timeout, connection reset).
    Temporary,
    /// Retry with backoff (rate limited, service unavailable).
    Persistent,
}

/// Store error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Alias, id or URL the error relates to (if applicable).
    pub path: Option<String>,
    /// Backend identifier (e.g., "JsonApi", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound).with_path(path)
    }

    /// Create a store error from an HTTP error status.
    #[must_use]
    pub fn from_http_status(status: u16) -> Self {
        let (kind, retry) = match status {
            404 | 410 => (StoreErrorKind::NotFound, ErrorStatus::Permanent),
            401 | 403 => (StoreErrorKind::PermissionDenied, ErrorStatus::Permanent),
            408 | 504 => (StoreErrorKind::Timeout, ErrorStatus::Temporary),
            429 => (StoreErrorKind::RateLimited, ErrorStatus::Persistent),
            500..=599 => (StoreErrorKind::Unavailable, ErrorStatus::Persistent),
            _ => (StoreErrorKind::Other, ErrorStatus::Permanent),
        };
        Self::new(kind).with_status(retry)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::PermissionDenied => "Permission denied",
            StoreErrorKind::InvalidObject => "Invalid object",
            StoreErrorKind::Unavailable => "Unavailable",
            StoreErrorKind::RateLimited => "Rate limited",
            StoreErrorKind::Timeout => "Timeout",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {path})")?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Content store abstraction.
///
/// Implementations are stateless with respect to queries: everything a call
/// needs arrives through its arguments, so one instance may serve concurrent
/// requests for different locales.
pub trait ContentStore: Send + Sync {
    /// Resolve an alias to the object it points at.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the alias does not resolve to an object of
    /// `query.object_name`, or the backend fails.
    fn object_by_path(&self, scope: &Scope, query: &PathQuery)
    -> Result<ContentObject, StoreError>;

    /// Fetch an object by id, or the whole collection when `query.id` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the object doesn't exist or can't be fetched.
    fn object(&self, scope: &Scope, query: &ObjectQuery) -> Result<ContentObject, StoreError>;

    /// List every object of a resource type, following pagination.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any page of the listing can't be fetched.
    fn collection(
        &self,
        scope: &Scope,
        object_name: &ObjectName,
        fields: &[String],
    ) -> Result<Vec<ContentObject>, StoreError>;

    /// Validate or open a preview session before authenticated queries.
    ///
    /// Default implementation does nothing, for backends without preview support.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if preview credentials are missing or rejected.
    fn activate_preview(&self, _scope: &Scope) -> Result<(), StoreError> {
        Ok(())
    }
}
