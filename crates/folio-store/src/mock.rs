//! Mock content store for testing.
//!
//! Provides [`MockStore`] for unit testing without a CMS.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::object::ObjectName;
use crate::store::{
    ContentObject, ContentStore, ErrorStatus, ObjectQuery, PathQuery, Scope, StoreError,
    StoreErrorKind,
};

/// A call received by [`MockStore`], in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    ObjectByPath {
        scope: Scope,
        path: String,
        refresh: bool,
    },
    Object {
        scope: Scope,
        object_name: ObjectName,
        id: Option<String>,
    },
    Collection {
        scope: Scope,
        object_name: ObjectName,
    },
    ActivatePreview {
        scope: Scope,
    },
}

/// Mock store for testing.
///
/// Stores objects in memory keyed by locale. Authenticated and public scopes
/// see the same content. Use the builder methods to configure the mock with
/// test data.
///
/// # Example
///
/// ```ignore
/// use serde_json::json;
/// use folio_store::{ContentStore, MockStore, ObjectName, PathQuery, Scope};
///
/// let store = MockStore::new()
///     .with_path_object("en", "en/about", json!({"id": "1", "title": "About"}));
///
/// let query = PathQuery::new(ObjectName::page(), "en/about");
/// let page = store.object_by_path(&Scope::public("en"), &query).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStore {
    by_path: RwLock<HashMap<(String, String), Value>>,
    by_id: RwLock<HashMap<(String, String), Value>>,
    resources: RwLock<HashMap<(String, ObjectName), Value>>,
    collections: RwLock<HashMap<(String, ObjectName), Vec<Value>>>,
    failing_collections: RwLock<HashSet<ObjectName>>,
    delays: RwLock<HashMap<String, Duration>>,
    preview_denied: RwLock<bool>,
    calls: Mutex<Vec<StoreCall>>,
}

impl MockStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `object` resolvable at alias `path` in `locale`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_path_object(
        self,
        locale: impl Into<String>,
        path: impl Into<String>,
        object: Value,
    ) -> Self {
        self.by_path
            .write()
            .unwrap()
            .insert((locale.into(), path.into()), object);
        self
    }

    /// Make `object` available by `id` in `locale`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_object(
        self,
        locale: impl Into<String>,
        id: impl Into<String>,
        object: Value,
    ) -> Self {
        self.by_id
            .write()
            .unwrap()
            .insert((locale.into(), id.into()), object);
        self
    }

    /// Set the value returned for an id-less [`ObjectQuery`] (e.g. a menu).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_resource(
        self,
        locale: impl Into<String>,
        object_name: ObjectName,
        value: Value,
    ) -> Self {
        self.resources
            .write()
            .unwrap()
            .insert((locale.into(), object_name), value);
        self
    }

    /// Set the listing returned by `collection()`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_collection(
        self,
        locale: impl Into<String>,
        object_name: ObjectName,
        objects: Vec<Value>,
    ) -> Self {
        self.collections
            .write()
            .unwrap()
            .insert((locale.into(), object_name), objects);
        self
    }

    /// Make every `collection()` call for `object_name` fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failing_collection(self, object_name: ObjectName) -> Self {
        self.failing_collections
            .write()
            .unwrap()
            .insert(object_name);
        self
    }

    /// Delay every `object()` call in `locale`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_delay(self, locale: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(locale.into(), delay);
        self
    }

    /// Reject preview activation.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_preview_denied(self) -> Self {
        *self.preview_denied.write().unwrap() = true;
        self
    }

    /// All calls received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Paths passed to `object_by_path()`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn path_queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::ObjectByPath { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn not_found(path: impl Into<String>) -> StoreError {
    StoreError::not_found(path).with_backend("Mock")
}

impl ContentStore for MockStore {
    fn object_by_path(
        &self,
        scope: &Scope,
        query: &PathQuery,
    ) -> Result<ContentObject, StoreError> {
        self.record(StoreCall::ObjectByPath {
            scope: scope.clone(),
            path: query.path.clone(),
            refresh: query.refresh,
        });
        self.by_path
            .read()
            .unwrap()
            .get(&(scope.locale.clone(), query.path.clone()))
            .cloned()
            .ok_or_else(|| not_found(query.path.clone()))
    }

    fn object(&self, scope: &Scope, query: &ObjectQuery) -> Result<ContentObject, StoreError> {
        self.record(StoreCall::Object {
            scope: scope.clone(),
            object_name: query.object_name.clone(),
            id: query.id.clone(),
        });

        let delay = self.delays.read().unwrap().get(&scope.locale).copied();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        match &query.id {
            Some(id) => self
                .by_id
                .read()
                .unwrap()
                .get(&(scope.locale.clone(), id.clone()))
                .cloned()
                .ok_or_else(|| not_found(id.clone())),
            None => self
                .resources
                .read()
                .unwrap()
                .get(&(scope.locale.clone(), query.object_name.clone()))
                .cloned()
                .ok_or_else(|| not_found(query.object_name.to_string())),
        }
    }

    fn collection(
        &self,
        scope: &Scope,
        object_name: &ObjectName,
        _fields: &[String],
    ) -> Result<Vec<ContentObject>, StoreError> {
        self.record(StoreCall::Collection {
            scope: scope.clone(),
            object_name: object_name.clone(),
        });

        if self.failing_collections.read().unwrap().contains(object_name) {
            return Err(StoreError::new(StoreErrorKind::Unavailable)
                .with_status(ErrorStatus::Persistent)
                .with_backend("Mock")
                .with_path(object_name.to_string()));
        }

        Ok(self
            .collections
            .read()
            .unwrap()
            .get(&(scope.locale.clone(), object_name.clone()))
            .cloned()
            .unwrap_or_default())
    }

    fn activate_preview(&self, scope: &Scope) -> Result<(), StoreError> {
        self.record(StoreCall::ActivatePreview {
            scope: scope.clone(),
        });
        if *self.preview_denied.read().unwrap() {
            return Err(StoreError::new(StoreErrorKind::PermissionDenied).with_backend("Mock"));
        }
        Ok(())
    }
}
