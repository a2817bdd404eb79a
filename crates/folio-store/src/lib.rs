//! Content store abstraction for the Folio page resolver.
//!
//! This crate provides a [`ContentStore`] trait for querying content objects from a
//! headless CMS. Every call takes an explicit [`Scope`] (locale plus whether the
//! request is authenticated) and an immutable query descriptor, so a single client
//! serves every locale and both public and preview traffic without shared mutable
//! query state.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`ContentStore`] trait with `object_by_path()`, `object()`, `collection()` and
//!   `activate_preview()` methods
//! - [`JsonApiStore`] implementation for Drupal JSON:API backends
//! - [`MockStore`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use folio_store::{ContentStore, JsonApiStore, ObjectName, PathQuery, Scope};
//!
//! let store = JsonApiStore::new("https://cms.example.com", "en");
//! let query = PathQuery::new(ObjectName::new("node", "page"), "/about")
//!     .with_fields(["title", "body", "path"]);
//! let page = store.object_by_path(&Scope::public("en"), &query)?;
//! println!("{}", page["title"]);
//! ```

mod jsonapi;
#[cfg(feature = "mock")]
mod mock;
mod object;
mod store;

pub use jsonapi::{ClientCredentials, JsonApiStore};
#[cfg(feature = "mock")]
pub use mock::{MockStore, StoreCall};
pub use object::ObjectName;
pub use store::{
    ContentObject, ContentStore, ErrorStatus, ObjectQuery, PathQuery, Scope, StoreError,
    StoreErrorKind,
};
