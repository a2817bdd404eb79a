//! Static path enumeration.

use std::sync::Arc;

use folio_store::{ContentStore, ObjectName, Scope, StoreError};
use serde_json::Value;
use tracing::debug;

use crate::alias::AliasPath;
use crate::page::StaticPath;

/// Lists every static route of a content type.
pub trait PathEnumerator: Send + Sync {
    /// Enumerate routes for all `locales`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the listing can't be fetched.
    fn enumerate(&self, locales: &[String]) -> Result<Vec<StaticPath>, StoreError>;
}

/// Enumerates routes from the store's published collection of a content type.
///
/// Each object's `path.alias` becomes a route. A leading type segment (`/pages`)
/// is stripped because the route itself lives under that segment.
pub struct StorePathEnumerator {
    store: Arc<dyn ContentStore>,
    object_name: ObjectName,
    type_prefix: String,
}

impl StorePathEnumerator {
    #[must_use]
    pub fn new(store: Arc<dyn ContentStore>, object_name: ObjectName) -> Self {
        Self {
            store,
            object_name,
            type_prefix: "/pages".to_owned(),
        }
    }

    /// Set the type segment stripped from aliases (default `/pages`).
    #[must_use]
    pub fn with_type_prefix(mut self, type_prefix: &str) -> Self {
        self.type_prefix = type_prefix.trim_end_matches('/').to_owned();
        self
    }

    /// Route segments for an alias, or `None` if it can't be routed.
    fn segments_for(&self, alias: &str) -> Option<AliasPath> {
        let routed = match alias.strip_prefix(&self.type_prefix) {
            Some(rest) if self.type_prefix.is_empty() || rest.is_empty() || rest.starts_with('/') => {
                rest
            }
            _ => alias,
        };
        AliasPath::parse(routed).ok()
    }
}

impl PathEnumerator for StorePathEnumerator {
    fn enumerate(&self, locales: &[String]) -> Result<Vec<StaticPath>, StoreError> {
        let fields = ["path".to_owned()];
        let mut paths = Vec::new();

        for locale in locales {
            let objects = self
                .store
                .collection(&Scope::public(locale.clone()), &self.object_name, &fields)?;

            for object in &objects {
                let Some(alias) = object.pointer("/path/alias").and_then(Value::as_str) else {
                    debug!(locale = %locale, id = ?object.get("id"), "Skipping object without alias");
                    continue;
                };
                match self.segments_for(alias) {
                    Some(segments) => paths.push(StaticPath {
                        segments,
                        locale: locale.clone(),
                    }),
                    None => debug!(locale = %locale, alias, "Skipping unroutable alias"),
                }
            }
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use folio_store::MockStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn page(alias: Option<&str>) -> Value {
        json!({"id": "x", "type": "node--page", "path": {"alias": alias, "langcode": "en"}})
    }

    fn enumerator(store: MockStore) -> StorePathEnumerator {
        StorePathEnumerator::new(Arc::new(store), ObjectName::page())
    }

    #[test]
    fn test_strips_type_prefix() {
        let e = enumerator(MockStore::new());
        assert_eq!(
            e.segments_for("/pages/featured/news").unwrap().segments(),
            ["featured", "news"]
        );
        assert_eq!(e.segments_for("/about").unwrap().segments(), ["about"]);
    }

    #[test]
    fn test_prefix_must_match_whole_segment() {
        let e = enumerator(MockStore::new());
        assert_eq!(
            e.segments_for("/pagesmith").unwrap().segments(),
            ["pagesmith"]
        );
    }

    #[test]
    fn test_listing_alias_is_unroutable() {
        let e = enumerator(MockStore::new());
        assert!(e.segments_for("/pages").is_none());
        assert!(e.segments_for("/").is_none());
    }

    #[test]
    fn test_enumerate_all_locales() {
        let store = MockStore::new()
            .with_collection(
                "en",
                ObjectName::page(),
                vec![page(Some("/pages/featured")), page(None), page(Some("/about"))],
            )
            .with_collection("fr", ObjectName::page(), vec![page(Some("/a-propos"))]);

        let paths = enumerator(store)
            .enumerate(&["en".to_owned(), "fr".to_owned()])
            .unwrap();

        let routes: Vec<(String, String)> = paths
            .iter()
            .map(|p| (p.locale.clone(), p.segments.join()))
            .collect();
        assert_eq!(
            routes,
            vec![
                ("en".to_owned(), "/featured".to_owned()),
                ("en".to_owned(), "/about".to_owned()),
                ("fr".to_owned(), "/a-propos".to_owned()),
            ]
        );
    }

    #[test]
    fn test_enumerate_propagates_store_error() {
        let store = MockStore::new().with_failing_collection(ObjectName::page());
        assert!(enumerator(store).enumerate(&["en".to_owned()]).is_err());
    }
}
