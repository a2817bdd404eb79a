//! Page data and view models.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::alias::AliasPath;

/// A basic page as returned by the content store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Stable id shared by every language variant.
    pub id: String,
    pub title: String,
    /// Body field; absent when the editor left it empty.
    #[serde(default)]
    pub body: Option<PageBody>,
    /// Canonical alias in the page's language.
    pub path: PathAlias,
}

impl Page {
    /// Body markup, or an empty string.
    #[must_use]
    pub fn body_html(&self) -> &str {
        self.body.as_ref().map_or("", |body| body.value.as_str())
    }
}

/// Formatted text field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageBody {
    /// Raw markup as entered (trusted).
    pub value: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub processed: Option<String>,
}

/// Alias and language of one page variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAlias {
    /// URL alias (e.g. `/featured`); `None` when no alias was set.
    #[serde(default)]
    pub alias: Option<String>,
    pub langcode: String,
}

/// Alternate-language link of a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleLink {
    #[serde(rename = "hrefLang")]
    pub language_tag: String,
    #[serde(rename = "href")]
    pub absolute_url: String,
}

impl LocaleLink {
    /// Link for `language_tag` pointing at `origin/{langcode}{alias}`.
    #[must_use]
    pub fn new(language_tag: &str, origin: &str, langcode: &str, alias: &str) -> Self {
        Self {
            language_tag: language_tag.to_owned(),
            absolute_url: format!("{}/{langcode}{alias}", origin.trim_end_matches('/')),
        }
    }
}

/// Props handed to the view layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProps {
    pub page: Page,
    /// Opaque menu structure, rendered by the layout.
    pub footer_menu: Value,
    /// One entry per configured locale, in configured order.
    pub href_lang: Vec<LocaleLink>,
}

impl PageProps {
    /// Flattened view model of the page.
    #[must_use]
    pub fn view(&self) -> PageView {
        PageView {
            id: self.page.id.clone(),
            title: self.page.title.clone(),
            body_html: self.page.body_html().to_owned(),
            localized_links: self.href_lang.clone(),
        }
    }
}

/// Result of resolving a page: props plus the revalidation hint.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticProps {
    pub props: PageProps,
    /// Age after which the generated output is stale.
    pub revalidate: Duration,
}

/// Fully-populated page view model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    pub id: String,
    pub title: String,
    pub body_html: String,
    pub localized_links: Vec<LocaleLink>,
}

/// One statically generated route.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct StaticPath {
    pub segments: AliasPath,
    pub locale: String,
}

/// Every static route for the page type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathList {
    pub paths: Vec<StaticPath>,
    /// Unlisted paths are not rendered on demand.
    pub fallback: bool,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_page_from_store_object() {
        let page: Page = serde_json::from_value(json!({
            "id": "p1",
            "type": "node--page",
            "title": "Featured",
            "body": {"value": "<p>Hello</p>", "format": "basic_html", "processed": "<p>Hello</p>"},
            "path": {"alias": "/featured", "langcode": "en", "pid": 7}
        }))
        .unwrap();

        assert_eq!(page.id, "p1");
        assert_eq!(page.body_html(), "<p>Hello</p>");
        assert_eq!(page.path.alias.as_deref(), Some("/featured"));
    }

    #[test]
    fn test_page_without_body_or_alias() {
        let page: Page = serde_json::from_value(json!({
            "id": "p2",
            "title": "Empty",
            "body": null,
            "path": {"alias": null, "langcode": "fr"}
        }))
        .unwrap();

        assert_eq!(page.body_html(), "");
        assert!(page.path.alias.is_none());
    }

    #[test]
    fn test_locale_link_url() {
        let link = LocaleLink::new("fr", "https://www.example.com/", "fr", "/a-la-une");
        assert_eq!(link.absolute_url, "https://www.example.com/fr/a-la-une");
        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            json!({"hrefLang": "fr", "href": "https://www.example.com/fr/a-la-une"})
        );
    }

    #[test]
    fn test_props_view() {
        let props = PageProps {
            page: Page {
                id: "p1".to_owned(),
                title: "Featured".to_owned(),
                body: Some(PageBody {
                    value: "<p>x</p>".to_owned(),
                    format: None,
                    processed: None,
                }),
                path: PathAlias {
                    alias: Some("/featured".to_owned()),
                    langcode: "en".to_owned(),
                },
            },
            footer_menu: json!([]),
            href_lang: vec![LocaleLink::new("en", "https://e.com", "en", "/featured")],
        };

        let view = props.view();

        assert_eq!(view.title, "Featured");
        assert_eq!(view.body_html, "<p>x</p>");
        assert_eq!(view.localized_links.len(), 1);
        assert_eq!(
            serde_json::to_value(&props).unwrap()["hrefLang"][0]["href"],
            "https://e.com/en/featured"
        );
    }
}
