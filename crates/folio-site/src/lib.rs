//! Page resolution and static path enumeration for Folio.
//!
//! This crate provides:
//! - [`PageResolver`]: resolves a nested alias to page props (page, footer menu,
//!   localized alternate links) and enumerates static paths
//! - [`AliasPath`]: validated sequence of URL segments
//! - [`CandidatePaths`]: ordered alias forms tried when resolving a page
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use folio_site::{AliasPath, PageRequest, PageResolver, RenderMode, SiteSettings};
//! use folio_store::JsonApiStore;
//!
//! let store = Arc::new(JsonApiStore::new("https://cms.example.com", "en"));
//! let settings = SiteSettings::new(vec!["en".to_owned(), "fr".to_owned()], "https://www.example.com");
//! let resolver = PageResolver::new(store, settings);
//!
//! let request = PageRequest {
//!     segments: AliasPath::parse("/featured")?,
//!     locale: "en".to_owned(),
//!     mode: RenderMode::Published,
//! };
//! let props = resolver.resolve_page(&request)?;
//! println!("{}", props.props.page.title);
//! # Ok(())
//! # }
//! ```

mod alias;
mod candidates;
mod error;
mod page;
mod paths;
mod resolver;

pub use alias::{AliasError, AliasPath};
pub use candidates::CandidatePaths;
pub use error::ResolveError;
pub use page::{LocaleLink, Page, PageBody, PageProps, PageView, PathAlias, PathList, StaticPath, StaticProps};
pub use paths::{PathEnumerator, StorePathEnumerator};
pub use resolver::{PageRequest, PageResolver, RenderMode, SiteSettings};
