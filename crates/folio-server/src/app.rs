//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// Pages live under the listing path (`/pages/{alias}` for the default locale,
/// `/{locale}/pages/{alias}` for any configured locale).
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let listing = state.site.listing_path.trim_end_matches('/').to_owned();

    let router = Router::new()
        .route("/api/preview", get(handlers::preview::enter_preview))
        .route("/api/exit-preview", get(handlers::preview::exit_preview))
        .route(
            &format!("{listing}/{{*alias}}"),
            get(handlers::pages::get_page),
        )
        .route(
            &format!("/{{locale}}{listing}/{{*alias}}"),
            get(handlers::pages::get_localized_page),
        );

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer())
                .layer(security::referrer_policy_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use folio_render::SiteMeta;
    use folio_site::{AliasPath, PageResolver, SiteSettings, StaticPath};
    use folio_store::{ContentStore, MockStore, ObjectName, StoreCall};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    const SECRET: &str = "s3cret";

    fn page(langcode: &str, alias: &str, title: &str) -> Value {
        json!({
            "id": "p1",
            "title": title,
            "body": {"value": format!("<p>{title}</p>")},
            "path": {"alias": alias, "langcode": langcode}
        })
    }

    fn store() -> MockStore {
        MockStore::new()
            .with_path_object("en", "en/featured", page("en", "/featured", "Featured"))
            .with_path_object("fr", "fr/a-la-une", page("fr", "/a-la-une", "À la une"))
            .with_path_object("fr", "fr/draft", page("fr", "/draft", "Brouillon"))
            .with_object("en", "p1", page("en", "/featured", "Featured"))
            .with_object("fr", "p1", page("fr", "/a-la-une", "À la une"))
            .with_resource("en", ObjectName::main_menu(), json!([{"title": "Home", "url": "/"}]))
            .with_resource("fr", ObjectName::main_menu(), json!([]))
    }

    fn known(locale: &str, alias: &str) -> StaticPath {
        StaticPath {
            segments: AliasPath::parse(alias).unwrap(),
            locale: locale.to_owned(),
        }
    }

    fn app_with(store: MockStore, revalidate: Duration) -> (Arc<MockStore>, Router) {
        let store = Arc::new(store);
        let settings = SiteSettings::new(vec!["en".to_owned(), "fr".to_owned()], "https://www.example.com")
            .with_revalidate(revalidate);
        let resolver = Arc::new(PageResolver::new(
            Arc::clone(&store) as Arc<dyn ContentStore>,
            settings,
        ));
        let site = SiteMeta {
            name: "Demo".to_owned(),
            description: None,
            listing_path: "/pages".to_owned(),
            multilingual: true,
        };
        let known_paths = HashSet::from([
            known("en", "/featured"),
            known("fr", "/a-la-une"),
            known("en", "/broken"),
        ]);
        let state = AppState::new(resolver, site, "en".to_owned(), known_paths)
            .with_preview_secret(Some(SECRET.to_owned()))
            .with_version("1.0.0".to_owned());
        (store, create_router(Arc::new(state)))
    }

    fn app() -> (Arc<MockStore>, Router) {
        app_with(store(), Duration::from_secs(60))
    }

    async fn send(router: &Router, uri: &str, headers: &[(&str, &str)]) -> Response {
        let mut request = Request::builder().uri(uri);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn header_value(response: &Response, name: header::HeaderName) -> String {
        response
            .headers()
            .get(name)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned()
    }

    #[tokio::test]
    async fn test_localized_page() {
        let (_, router) = app();

        let response = send(&router, "/fr/pages/a-la-une", &[]).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_value(&response, header::CONTENT_TYPE).starts_with("text/html"));
        assert_eq!(
            header_value(&response, header::CACHE_CONTROL),
            "public, s-maxage=60, stale-while-revalidate"
        );
        let html = body(response).await;
        assert!(html.contains("<h1>À la une</h1>"));
        assert!(html.contains("<html lang=\"fr\">"));
        assert!(html.contains("hreflang=\"en\" href=\"https://www.example.com/en/featured\""));
    }

    #[tokio::test]
    async fn test_default_locale_route() {
        let (_, router) = app();

        let response = send(&router, "/pages/featured", &[]).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("<h1>Featured</h1>"));
    }

    #[tokio::test]
    async fn test_unknown_paths_are_not_found() {
        let (store, router) = app();

        for uri in ["/en/pages/missing", "/de/pages/featured", "/fr/pages/draft"] {
            let response = send(&router, uri, &[]).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_failure_is_server_error() {
        let (_, router) = app();

        let response = send(&router, "/en/pages/broken", &[]).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body(response).await.contains("500"));
    }

    #[tokio::test]
    async fn test_security_headers() {
        let (_, router) = app();

        let response = send(&router, "/en/pages/featured", &[]).await;

        assert_eq!(header_value(&response, header::X_FRAME_OPTIONS), "DENY");
        assert_eq!(header_value(&response, header::X_CONTENT_TYPE_OPTIONS), "nosniff");
        assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
    }

    #[tokio::test]
    async fn test_etag_not_modified() {
        let (_, router) = app();
        let response = send(&router, "/en/pages/featured", &[]).await;
        let etag = header_value(&response, header::ETAG);

        let response = send(&router, "/en/pages/featured", &[("if-none-match", etag.as_str())]).await;

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_fresh_page_served_from_cache() {
        let (store, router) = app();

        send(&router, "/en/pages/featured", &[]).await;
        send(&router, "/en/pages/featured", &[]).await;

        assert_eq!(store.path_queries(), vec!["en/featured".to_owned()]);
    }

    #[tokio::test]
    async fn test_stale_page_served_then_regenerated() {
        let (store, router) = app_with(store(), Duration::ZERO);
        let first = body(send(&router, "/en/pages/featured", &[]).await).await;

        let second = send(&router, "/en/pages/featured", &[]).await;

        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(body(second).await, first);
        for _ in 0..50 {
            if store.path_queries().len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(store.path_queries().len(), 2);
    }

    #[tokio::test]
    async fn test_enter_preview_sets_cookie() {
        let (_, router) = app();

        let response = send(
            &router,
            "/api/preview?secret=s3cret&locale=fr&path=/fr/pages/draft",
            &[],
        )
        .await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(header_value(&response, header::LOCATION), "/fr/pages/draft");
        assert!(header_value(&response, header::SET_COOKIE).starts_with("folio_preview=fr:"));
    }

    #[tokio::test]
    async fn test_preview_rejects_bad_secret_and_locale() {
        let (_, router) = app();

        let response = send(&router, "/api/preview?secret=wrong&locale=fr", &[]).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(&router, "/api/preview?secret=s3cret&locale=de", &[]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preview_renders_unlisted_page_fresh() {
        let (store, router) = app();
        let response = send(&router, "/api/preview?secret=s3cret&locale=fr", &[]).await;
        let cookie = header_value(&response, header::SET_COOKIE);
        let cookie = cookie.split(';').next().unwrap().to_owned();

        let response = send(&router, "/fr/pages/draft", &[("cookie", cookie.as_str())]).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_value(&response, header::CACHE_CONTROL), "private, no-store");
        let html = body(response).await;
        assert!(html.contains("<h1>Brouillon</h1>"));
        assert!(html.contains("preview-banner"));
        assert!(matches!(
            store.calls().first(),
            Some(StoreCall::ActivatePreview { scope }) if scope.locale == "fr" && scope.authenticated
        ));
    }

    #[tokio::test]
    async fn test_forged_preview_cookie_ignored() {
        let (store, router) = app();

        let response = send(
            &router,
            "/fr/pages/draft",
            &[("cookie", "folio_preview=fr:deadbeef")],
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_exit_preview_clears_cookie() {
        let (_, router) = app();

        let response = send(&router, "/api/exit-preview", &[]).await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert!(header_value(&response, header::SET_COOKIE).contains("Max-Age=0"));
    }
}
