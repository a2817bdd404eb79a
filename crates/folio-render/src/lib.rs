//! HTML rendering and static site generation for Folio.
//!
//! [`render_page`] turns resolved page props into a complete HTML document;
//! [`StaticSiteBuilder`] renders every enumerated route into an output
//! directory.

mod builder;
mod template;

pub use builder::{BuildConfig, BuildError, BuildReport, StaticSiteBuilder};
pub use template::{MenuLink, PageDocument, SiteMeta, menu_links, render_page};
