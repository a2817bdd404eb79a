//! Static site builder.

use std::fs;
use std::path::{Component, Path, PathBuf};

use folio_site::{PageRequest, PageResolver, RenderMode, ResolveError, StaticPath};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::template::{PageDocument, SiteMeta, render_page};

/// Configuration for static site building.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Directory the site is written to.
    pub output_dir: PathBuf,
    pub site: SiteMeta,
}

/// Error returned by the static site builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("refusing to write outside the output directory: {0}")]
    UnsafePath(PathBuf),
    #[error("failed to resolve {locale} page {alias}")]
    Resolve {
        locale: String,
        alias: String,
        #[source]
        source: ResolveError,
    },
}

/// Outcome of a build.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Files written, in path-list order.
    pub written: Vec<PathBuf>,
}

/// Renders every listed page into an output directory.
pub struct StaticSiteBuilder<'a> {
    resolver: &'a PageResolver,
    config: BuildConfig,
}

impl<'a> StaticSiteBuilder<'a> {
    #[must_use]
    pub fn new(resolver: &'a PageResolver, config: BuildConfig) -> Self {
        Self { resolver, config }
    }

    /// Output file of a route, relative to the output directory.
    ///
    /// `{locale}/pages/{segments}/index.html`, without the locale directory on
    /// single-language sites.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnsafePath`] if the file would not be a plain
    /// relative path below the output directory.
    pub fn page_file(&self, path: &StaticPath) -> Result<PathBuf, BuildError> {
        let mut file = PathBuf::new();
        if self.config.site.multilingual {
            file.push(&path.locale);
        }
        file.push(self.config.site.listing_path.trim_start_matches('/'));
        for segment in path.segments.segments() {
            file.push(segment);
        }
        file.push("index.html");

        if file.components().all(|c| matches!(c, Component::Normal(_))) {
            Ok(file)
        } else {
            Err(BuildError::UnsafePath(file))
        }
    }

    /// Resolve and write every static path.
    ///
    /// Pages are resolved in parallel; nothing is written unless all of them
    /// resolve.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if any page fails to resolve or a file can't be
    /// written.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let Some(list) = self.resolver.list_paths() else {
            warn!("No static paths available, nothing to build");
            return Ok(BuildReport::default());
        };

        let rendered = list
            .paths
            .par_iter()
            .map(|path| -> Result<(PathBuf, String), BuildError> {
                Ok((self.page_file(path)?, self.render(path)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = BuildReport::default();
        for (relative, html) in rendered {
            let target = self.config.output_dir.join(&relative);
            write_file(&target, &html)?;
            tracing::debug!(path = %target.display(), "Wrote page");
            report.written.push(relative);
        }

        info!(
            pages = report.written.len(),
            output = %self.config.output_dir.display(),
            "Static build complete"
        );
        Ok(report)
    }

    fn render(&self, path: &StaticPath) -> Result<String, BuildError> {
        let request = PageRequest {
            segments: path.segments.clone(),
            locale: path.locale.clone(),
            mode: RenderMode::Published,
        };
        let props = self
            .resolver
            .resolve_page(&request)
            .map_err(|source| BuildError::Resolve {
                locale: path.locale.clone(),
                alias: path.segments.join(),
                source,
            })?;
        let document = PageDocument::from_props(&props.props, &path.locale, false);
        Ok(render_page(&self.config.site, &document))
    }
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use folio_site::{AliasPath, SiteSettings};
    use folio_store::{ContentStore, MockStore, ObjectName};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;

    fn page(id: &str, langcode: &str, alias: &str, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "body": {"value": format!("<p>{title}</p>")},
            "path": {"alias": alias, "langcode": langcode}
        })
    }

    fn listing(langcode: &str, alias: &str) -> Value {
        json!({"id": "p1", "path": {"alias": alias, "langcode": langcode}})
    }

    fn multilingual_store() -> MockStore {
        MockStore::new()
            .with_collection("en", ObjectName::page(), vec![listing("en", "/pages/featured")])
            .with_collection("fr", ObjectName::page(), vec![listing("fr", "/pages/a-la-une")])
            .with_path_object("en", "en/pages/featured", page("p1", "en", "/pages/featured", "Featured"))
            .with_path_object("fr", "fr/pages/a-la-une", page("p1", "fr", "/pages/a-la-une", "À la une"))
            .with_object("en", "p1", page("p1", "en", "/pages/featured", "Featured"))
            .with_object("fr", "p1", page("p1", "fr", "/pages/a-la-une", "À la une"))
            .with_resource("en", ObjectName::main_menu(), json!([]))
            .with_resource("fr", ObjectName::main_menu(), json!([]))
    }

    fn resolver(store: MockStore, locales: &[&str]) -> PageResolver {
        let store: Arc<dyn ContentStore> = Arc::new(store);
        PageResolver::new(
            store,
            SiteSettings::new(
                locales.iter().map(|l| (*l).to_owned()).collect(),
                "https://www.example.com",
            ),
        )
    }

    fn config(output_dir: &Path, multilingual: bool) -> BuildConfig {
        BuildConfig {
            output_dir: output_dir.to_path_buf(),
            site: SiteMeta {
                name: "Demo".to_owned(),
                description: None,
                listing_path: "/pages".to_owned(),
                multilingual,
            },
        }
    }

    #[test]
    fn test_build_writes_each_locale() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(multilingual_store(), &["en", "fr"]);

        let report = StaticSiteBuilder::new(&resolver, config(dir.path(), true))
            .build()
            .unwrap();

        assert_eq!(
            report.written,
            vec![
                PathBuf::from("en/pages/featured/index.html"),
                PathBuf::from("fr/pages/a-la-une/index.html"),
            ]
        );
        let html = fs::read_to_string(dir.path().join("fr/pages/a-la-une/index.html")).unwrap();
        assert!(html.contains("<h1>À la une</h1>"));
        assert!(html.contains("hreflang=\"en\" href=\"https://www.example.com/en/pages/featured\""));
    }

    #[test]
    fn test_single_locale_has_no_locale_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = MockStore::new()
            .with_collection("en", ObjectName::page(), vec![listing("en", "/about")])
            .with_path_object("en", "/about", page("p1", "en", "/about", "About"))
            .with_object("en", "p1", page("p1", "en", "/about", "About"))
            .with_resource("en", ObjectName::main_menu(), json!([]));
        let resolver = resolver(store, &["en"]);

        let report = StaticSiteBuilder::new(&resolver, config(dir.path(), false))
            .build()
            .unwrap();

        assert_eq!(report.written, vec![PathBuf::from("pages/about/index.html")]);
        assert!(dir.path().join("pages/about/index.html").is_file());
    }

    #[test]
    fn test_nested_segments_become_directories() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(MockStore::new(), &["en", "fr"]);
        let builder = StaticSiteBuilder::new(&resolver, config(dir.path(), true));

        let file = builder.page_file(&StaticPath {
            segments: AliasPath::new(["featured", "news"]).unwrap(),
            locale: "fr".to_owned(),
        });

        assert_eq!(file.unwrap(), PathBuf::from("fr/pages/featured/news/index.html"));
    }

    #[test]
    fn test_page_file_rejects_escaping_listing_path() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(MockStore::new(), &["en"]);
        let mut config = config(dir.path(), false);
        config.site.listing_path = "/../outside".to_owned();
        let builder = StaticSiteBuilder::new(&resolver, config);

        let err = builder
            .page_file(&StaticPath {
                segments: AliasPath::new(["about"]).unwrap(),
                locale: "en".to_owned(),
            })
            .unwrap_err();

        assert!(matches!(err, BuildError::UnsafePath(_)));
    }

    #[test]
    fn test_traversal_alias_stays_inside_output_dir() {
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("out");
        let store = MockStore::new()
            .with_collection(
                "en",
                ObjectName::page(),
                vec![listing("en", "/pages/../../../escaped"), listing("en", "/about")],
            )
            .with_path_object("en", "/about", page("p1", "en", "/about", "About"))
            .with_object("en", "p1", page("p1", "en", "/about", "About"))
            .with_resource("en", ObjectName::main_menu(), json!([]));
        let resolver = resolver(store, &["en"]);

        let report = StaticSiteBuilder::new(&resolver, config(&output, false))
            .build()
            .unwrap();

        assert_eq!(report.written, vec![PathBuf::from("pages/about/index.html")]);
        assert!(!root.path().join("escaped").exists());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_path_list_builds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(
            MockStore::new().with_failing_collection(ObjectName::page()),
            &["en"],
        );

        let report = StaticSiteBuilder::new(&resolver, config(dir.path(), false))
            .build()
            .unwrap();

        assert!(report.written.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_resolve_failure_aborts_build() {
        let dir = tempfile::tempdir().unwrap();
        let store = MockStore::new()
            .with_collection("en", ObjectName::page(), vec![listing("en", "/missing")]);
        let resolver = resolver(store, &["en"]);

        let err = StaticSiteBuilder::new(&resolver, config(dir.path(), false))
            .build()
            .unwrap_err();

        match err {
            BuildError::Resolve { locale, alias, .. } => {
                assert_eq!(locale, "en");
                assert_eq!(alias, "/missing");
            }
            other => panic!("expected Resolve, got {other:?}"),
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
