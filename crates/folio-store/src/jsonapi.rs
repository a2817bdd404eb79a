//! Drupal JSON:API content store.
//!
//! Provides a sync HTTP client for JSON:API backends with the decoupled router
//! module installed. Aliases are resolved through `/router/translate-path`,
//! resources are fetched with sparse fieldsets and flattened into plain objects.
//!
//! Preview scopes authenticate with a bearer token obtained through the OAuth
//! client-credentials grant in [`ContentStore::activate_preview`].

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use ureq::Agent;

use crate::object::ObjectName;
use crate::store::{
    ContentObject, ContentStore, ErrorStatus, ObjectQuery, PathQuery, Scope, StoreError,
    StoreErrorKind,
};

/// Backend identifier used in errors.
const BACKEND: &str = "JsonApi";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Default lifetime of cached responses.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Tokens this close to expiry are renewed.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Characters escaped in query string components.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// OAuth client credentials used for preview sessions.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct RouterResponse {
    jsonapi: Option<RouterResource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouterResource {
    individual: String,
    resource_name: String,
}

struct CachedResponse {
    value: Value,
    fetched_at: Instant,
}

/// Error body returned by the backend with an error status.
#[derive(Debug, thiserror::Error)]
#[error("HTTP {status}: {body}")]
struct HttpStatusError {
    status: u16,
    body: String,
}

/// JSON:API content store.
pub struct JsonApiStore {
    agent: Agent,
    base_url: String,
    api_prefix: String,
    default_locale: String,
    credentials: Option<ClientCredentials>,
    token: RwLock<Option<AccessToken>>,
    cache_ttl: Duration,
    /// Responses keyed by (authenticated, url).
    responses: RwLock<HashMap<(bool, String), CachedResponse>>,
}

impl JsonApiStore {
    /// Create a store for the backend at `base_url`.
    ///
    /// Content in `default_locale` is served without a language prefix; every
    /// other locale is requested under `/{locale}`.
    #[must_use]
    pub fn new(base_url: &str, default_locale: impl Into<String>) -> Self {
        Self {
            agent: build_agent(Duration::from_secs(DEFAULT_TIMEOUT)),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_prefix: "jsonapi".to_owned(),
            default_locale: default_locale.into(),
            credentials: None,
            token: RwLock::new(None),
            cache_ttl: DEFAULT_CACHE_TTL,
            responses: RwLock::new(HashMap::new()),
        }
    }

    /// Set the JSON:API path prefix (default `jsonapi`).
    #[must_use]
    pub fn with_api_prefix(mut self, api_prefix: &str) -> Self {
        self.api_prefix = api_prefix.trim_matches('/').to_owned();
        self
    }

    /// Set the global HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    /// Set how long a response is reused before it is fetched again (default 60s).
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Enable preview sessions with the given OAuth client.
    #[must_use]
    pub fn with_credentials(mut self, credentials: ClientCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    fn locale_prefix(&self, scope: &Scope) -> String {
        if scope.locale == self.default_locale {
            String::new()
        } else {
            format!("/{}", scope.locale)
        }
    }

    /// URL of a resource collection, or of one resource when `id` is given.
    fn resource_url(
        &self,
        scope: &Scope,
        object_name: &ObjectName,
        id: Option<&str>,
        fields: &[String],
    ) -> String {
        let mut url = format!(
            "{}{}/{}/{}",
            self.base_url,
            self.locale_prefix(scope),
            self.api_prefix,
            object_name.resource_path()
        );
        if let Some(id) = id {
            url.push('/');
            url.push_str(&utf8_percent_encode(id, QUERY_COMPONENT).to_string());
        }
        with_fieldset(url, object_name, fields)
    }

    fn router_url(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };
        format!(
            "{}/router/translate-path?path={}&_format=json",
            self.base_url,
            utf8_percent_encode(&path, QUERY_COMPONENT)
        )
    }

    fn cached(&self, key: &(bool, String)) -> Option<Value> {
        let responses = self.responses.read().ok()?;
        let entry = responses.get(key)?;
        (entry.fetched_at.elapsed() < self.cache_ttl).then(|| entry.value.clone())
    }

    /// Cache a response, evicting every expired entry.
    fn remember(&self, key: (bool, String), value: Value) {
        let Ok(mut responses) = self.responses.write() else {
            return;
        };
        let ttl = self.cache_ttl;
        responses.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        responses.insert(
            key,
            CachedResponse {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    fn current_token(&self) -> Option<String> {
        let guard = self.token.read().ok()?;
        let token = guard.as_ref()?;
        (token.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN).then(|| token.value.clone())
    }

    /// GET a JSON document, consulting the response cache unless `refresh` is set.
    fn get_json(&self, scope: &Scope, url: &str, refresh: bool) -> Result<Value, StoreError> {
        let key = (scope.authenticated, url.to_owned());
        if !refresh && let Some(hit) = self.cached(&key) {
            debug!(url, "Response cache hit");
            return Ok(hit);
        }

        let mut request = self.agent.get(url).header("Accept", JSONAPI_MEDIA_TYPE);
        if scope.authenticated {
            let token = self.current_token().ok_or_else(|| {
                StoreError::new(StoreErrorKind::PermissionDenied)
                    .with_backend(BACKEND)
                    .with_path(url)
            })?;
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        debug!(url, refresh, authenticated = scope.authenticated, "Fetching");
        let response = request.call().map_err(|e| transport_error(e, url))?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(StoreError::from_http_status(status)
                .with_backend(BACKEND)
                .with_path(url)
                .with_source(HttpStatusError { status, body }));
        }

        let value: Value = body_reader.read_json().map_err(|e| {
            StoreError::new(StoreErrorKind::InvalidObject)
                .with_backend(BACKEND)
                .with_path(url)
                .with_source(e)
        })?;

        self.remember(key, value.clone());
        Ok(value)
    }
}

impl ContentStore for JsonApiStore {
    fn object_by_path(
        &self,
        scope: &Scope,
        query: &PathQuery,
    ) -> Result<ContentObject, StoreError> {
        let router_url = self.router_url(&query.path);
        let routed = self.get_json(scope, &router_url, query.refresh)?;

        let resource = serde_json::from_value::<RouterResponse>(routed)
            .ok()
            .and_then(|r| r.jsonapi)
            .filter(|r| r.resource_name == query.object_name.to_string())
            .ok_or_else(|| {
                StoreError::not_found(query.path.clone()).with_backend(BACKEND)
            })?;

        let url = with_fieldset(resource.individual, &query.object_name, &query.fields);
        let document = self.get_json(scope, &url, query.refresh)?;
        flatten_document(&document).map_err(|e| e.with_path(url))
    }

    fn object(&self, scope: &Scope, query: &ObjectQuery) -> Result<ContentObject, StoreError> {
        let url = self.resource_url(
            scope,
            &query.object_name,
            query.id.as_deref(),
            &query.fields,
        );
        let document = self.get_json(scope, &url, query.refresh)?;
        flatten_document(&document).map_err(|e| e.with_path(url))
    }

    fn collection(
        &self,
        scope: &Scope,
        object_name: &ObjectName,
        fields: &[String],
    ) -> Result<Vec<ContentObject>, StoreError> {
        let mut objects = Vec::new();
        let mut next = Some(self.resource_url(scope, object_name, None, fields));

        while let Some(url) = next {
            // Listings are always fetched fresh so newly published content appears.
            let document = self.get_json(scope, &url, true)?;
            match flatten_document(&document) {
                Ok(Value::Array(items)) => objects.extend(items),
                Ok(_) => {
                    return Err(StoreError::new(StoreErrorKind::InvalidObject)
                        .with_backend(BACKEND)
                        .with_path(url));
                }
                Err(err) => return Err(err.with_path(url)),
            }
            next = document
                .pointer("/links/next/href")
                .and_then(Value::as_str)
                .map(str::to_owned);
        }

        debug!(object_name = %object_name, count = objects.len(), "Listed collection");
        Ok(objects)
    }

    fn activate_preview(&self, scope: &Scope) -> Result<(), StoreError> {
        if !scope.authenticated || self.current_token().is_some() {
            return Ok(());
        }

        let url = format!("{}/oauth/token", self.base_url);
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            StoreError::new(StoreErrorKind::PermissionDenied)
                .with_backend(BACKEND)
                .with_path(url.clone())
        })?;

        debug!(locale = %scope.locale, "Requesting preview access token");
        let response = self
            .agent
            .post(&url)
            .send_form([
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .map_err(|e| transport_error(e, &url))?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(StoreError::from_http_status(status)
                .with_backend(BACKEND)
                .with_path(url)
                .with_source(HttpStatusError { status, body }));
        }

        let token: TokenResponse = body_reader.read_json().map_err(|e| {
            StoreError::new(StoreErrorKind::InvalidObject)
                .with_backend(BACKEND)
                .with_path(url.clone())
                .with_source(e)
        })?;

        if let Ok(mut slot) = self.token.write() {
            *slot = Some(AccessToken {
                value: token.access_token,
                expires_at: Instant::now() + Duration::from_secs(token.expires_in),
            });
        }
        Ok(())
    }
}

fn build_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Append a sparse fieldset parameter (`fields[node--page]=a,b`) to `url`.
fn with_fieldset(mut url: String, object_name: &ObjectName, fields: &[String]) -> String {
    if fields.is_empty() {
        return url;
    }
    let key = format!("fields[{object_name}]");
    let value = fields.join(",");
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(&utf8_percent_encode(&key, QUERY_COMPONENT).to_string());
    url.push('=');
    url.push_str(&utf8_percent_encode(&value, QUERY_COMPONENT).to_string());
    url
}

/// Flatten the primary data of a JSON:API document.
///
/// A single resource becomes an object, a collection becomes an array of objects.
fn flatten_document(document: &Value) -> Result<Value, StoreError> {
    match document.get("data") {
        Some(Value::Array(items)) => Ok(Value::Array(items.iter().map(flatten_resource).collect())),
        Some(resource @ Value::Object(_)) => Ok(flatten_resource(resource)),
        _ => Err(StoreError::new(StoreErrorKind::InvalidObject).with_backend(BACKEND)),
    }
}

/// Merge `id`, `type` and `attributes` of a resource object into one map.
fn flatten_resource(resource: &Value) -> Value {
    let mut flat = Map::new();
    for key in ["id", "type"] {
        if let Some(value) = resource.get(key) {
            flat.insert(key.to_owned(), value.clone());
        }
    }
    if let Some(Value::Object(attributes)) = resource.get("attributes") {
        for (key, value) in attributes {
            flat.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
    Value::Object(flat)
}

fn transport_error(err: ureq::Error, url: &str) -> StoreError {
    let (kind, status) = match &err {
        ureq::Error::Timeout(_) => (StoreErrorKind::Timeout, ErrorStatus::Temporary),
        ureq::Error::Io(_) => (StoreErrorKind::Unavailable, ErrorStatus::Temporary),
        _ => (StoreErrorKind::Other, ErrorStatus::Permanent),
    };
    StoreError::new(kind)
        .with_status(status)
        .with_backend(BACKEND)
        .with_path(url)
        .with_source(err)
}
