//! Rendered page cache with timed revalidation.
//!
//! An entry older than the revalidation interval is still served, but marks the
//! page for regeneration. At most one regeneration per page runs at a time.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use folio_site::StaticPath;
use md5::{Digest, Md5};

/// A rendered page ready to be served.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RenderedPage {
    pub(crate) html: String,
    pub(crate) etag: String,
}

impl RenderedPage {
    pub(crate) fn new(version: &str, html: String) -> Self {
        let etag = compute_etag(version, &html);
        Self { html, etag }
    }
}

/// Compute `ETag` from version and content.
///
/// MD5 truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

/// Result of a cache lookup.
#[derive(Debug)]
pub(crate) enum Lookup {
    Fresh(Arc<RenderedPage>),
    /// Servable, but older than the revalidation interval.
    Stale(Arc<RenderedPage>),
    Miss,
}

struct Entry {
    page: Arc<RenderedPage>,
    generated_at: Instant,
}

/// In-memory cache of published pages keyed by route.
pub(crate) struct RevalidatingCache {
    max_age: Duration,
    entries: RwLock<HashMap<StaticPath, Entry>>,
    refreshing: Mutex<HashSet<StaticPath>>,
}

impl RevalidatingCache {
    pub(crate) fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            entries: RwLock::new(HashMap::new()),
            refreshing: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn get(&self, path: &StaticPath) -> Lookup {
        self.get_at(path, Instant::now())
    }

    fn get_at(&self, path: &StaticPath, now: Instant) -> Lookup {
        let Ok(entries) = self.entries.read() else {
            return Lookup::Miss;
        };
        match entries.get(path) {
            Some(entry) if now.saturating_duration_since(entry.generated_at) >= self.max_age => {
                Lookup::Stale(Arc::clone(&entry.page))
            }
            Some(entry) => Lookup::Fresh(Arc::clone(&entry.page)),
            None => Lookup::Miss,
        }
    }

    pub(crate) fn insert(&self, path: StaticPath, page: Arc<RenderedPage>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                path,
                Entry {
                    page,
                    generated_at: Instant::now(),
                },
            );
        }
    }

    /// Claim regeneration of `path`. Returns `false` if one is already running.
    pub(crate) fn begin_refresh(&self, path: &StaticPath) -> bool {
        self.refreshing
            .lock()
            .is_ok_and(|mut refreshing| refreshing.insert(path.clone()))
    }

    pub(crate) fn end_refresh(&self, path: &StaticPath) {
        if let Ok(mut refreshing) = self.refreshing.lock() {
            refreshing.remove(path);
        }
    }
}
