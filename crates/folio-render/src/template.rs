//! HTML page template.
//!
//! Produces the full document for one basic page: head metadata with
//! `hreflang` alternates, the page title and body, and the footer menu.

use std::fmt::Write;

use folio_site::{LocaleLink, PageProps};
use serde::Deserialize;
use serde_json::Value;

/// Site-wide data shared by every rendered page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteMeta {
    pub name: String,
    pub description: Option<String>,
    /// Path of the page listing (e.g. `/pages`), without language prefix.
    pub listing_path: String,
    /// Prefix links with the page language.
    pub multilingual: bool,
}

impl SiteMeta {
    /// Link to the listing in `lang`.
    #[must_use]
    pub fn listing_href(&self, lang: &str) -> String {
        if self.multilingual {
            format!("/{lang}{}", self.listing_path)
        } else {
            self.listing_path.clone()
        }
    }
}

/// Footer menu entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MenuLink {
    pub title: String,
    pub url: String,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

fn enabled_default() -> bool {
    true
}

/// Enabled entries of a menu collection.
///
/// The menu is opaque store data; entries that aren't `{title, url}` objects
/// are skipped.
#[must_use]
pub fn menu_links(menu: &Value) -> Vec<MenuLink> {
    let Some(items) = menu.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| MenuLink::deserialize(item).ok())
        .filter(|link| link.enabled)
        .collect()
}

/// All data needed to render a page.
pub struct PageDocument {
    /// Language of the page (`<html lang>`).
    pub lang: String,
    pub title: String,
    /// Trusted markup, written verbatim.
    pub body_html: String,
    pub alternates: Vec<LocaleLink>,
    pub footer: Vec<MenuLink>,
    /// Show the preview banner.
    pub preview: bool,
}

impl PageDocument {
    /// Document for resolved props in `lang`.
    #[must_use]
    pub fn from_props(props: &PageProps, lang: &str, preview: bool) -> Self {
        let view = props.view();
        Self {
            lang: lang.to_owned(),
            title: view.title,
            body_html: view.body_html,
            alternates: view.localized_links,
            footer: menu_links(&props.footer_menu),
            preview,
        }
    }
}

/// Render a complete HTML page.
pub fn render_page(site: &SiteMeta, page: &PageDocument) -> String {
    let mut html = String::with_capacity(4096 + page.body_html.len());

    let _ = writeln!(html, "<!DOCTYPE html>\n<html lang=\"{}\">", escape(&page.lang));
    html.push_str("<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(
        html,
        "<title>{} | {}</title>",
        escape(&page.title),
        escape(&site.name)
    );
    if let Some(description) = &site.description {
        let _ = writeln!(
            html,
            "<meta name=\"description\" content=\"{}\">",
            escape(description)
        );
    }
    if page.preview {
        html.push_str("<meta name=\"robots\" content=\"noindex\">\n");
    }
    for link in &page.alternates {
        let _ = writeln!(
            html,
            "<link rel=\"alternate\" hreflang=\"{}\" href=\"{}\">",
            escape(&link.language_tag),
            escape(&link.absolute_url)
        );
    }
    html.push_str("</head>\n<body>\n");

    if page.preview {
        html.push_str(
            "<div class=\"preview-banner\">Preview mode. \
             <a href=\"/api/exit-preview\">Exit preview</a></div>\n",
        );
    }

    html.push_str("<main>\n<article>\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape(&page.title));
    let _ = writeln!(
        html,
        "<p><a href=\"{}\">All pages</a></p>",
        escape(&site.listing_href(&page.lang))
    );
    html.push_str("<div class=\"body\">\n");
    html.push_str(&page.body_html);
    html.push_str("\n</div>\n</article>\n</main>\n");

    render_footer(&mut html, &page.footer);

    html.push_str("</body>\n</html>\n");
    html
}

fn render_footer(html: &mut String, links: &[MenuLink]) {
    if links.is_empty() {
        return;
    }
    html.push_str("<footer>\n<nav>\n<ul>\n");
    for link in links {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            escape(&link.url),
            escape(&link.title)
        );
    }
    html.push_str("</ul>\n</nav>\n</footer>\n");
}

/// Escape HTML special characters.
fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
