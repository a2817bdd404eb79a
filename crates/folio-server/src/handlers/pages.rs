//! Page routes.
//!
//! Published pages come from the revalidating cache; a stale entry is served
//! while a background task regenerates it. Preview requests always render
//! fresh and are never cached.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use folio_render::{PageDocument, render_page};
use folio_site::{AliasPath, PageRequest, RenderMode, StaticPath};

use crate::cache::{Lookup, RenderedPage};
use crate::error::ServerError;
use crate::handlers::preview::preview_locale;
use crate::state::AppState;

/// Handle GET /pages/{alias} in the default locale.
pub(crate) async fn get_page(
    Path(alias): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let locale = state.default_locale.clone();
    serve_page(state, locale, &alias, &headers).await
}

/// Handle GET /{locale}/pages/{alias}.
pub(crate) async fn get_localized_page(
    Path((locale, alias)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    serve_page(state, locale, &alias, &headers).await
}

async fn serve_page(
    state: Arc<AppState>,
    locale: String,
    alias: &str,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let segments =
        AliasPath::parse(alias).map_err(|_| ServerError::PageNotFound(alias.to_owned()))?;
    if !state.has_locale(&locale) {
        return Err(ServerError::PageNotFound(format!("/{locale}{}", segments.join())));
    }
    let path = StaticPath { segments, locale };

    if let Some(preview) = preview_locale(&state, headers) {
        let page = render(&state, path, RenderMode::Preview { locale: preview }).await?;
        return Ok(page_response(&page, headers, "private, no-store"));
    }

    if !state.known_paths.contains(&path) {
        return Err(ServerError::PageNotFound(path.segments.join()));
    }

    let page = match state.cache.get(&path) {
        Lookup::Fresh(page) => page,
        Lookup::Stale(page) => {
            spawn_revalidation(Arc::clone(&state), path);
            page
        }
        Lookup::Miss => {
            let page = Arc::new(render(&state, path.clone(), RenderMode::Published).await?);
            state.cache.insert(path, Arc::clone(&page));
            page
        }
    };

    let cache_control = format!(
        "public, s-maxage={}, stale-while-revalidate",
        state.resolver.settings().revalidate.as_secs()
    );
    Ok(page_response(&page, headers, &cache_control))
}

/// Resolve and render a page on the blocking pool.
async fn render(
    state: &Arc<AppState>,
    path: StaticPath,
    mode: RenderMode,
) -> Result<RenderedPage, ServerError> {
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || -> Result<RenderedPage, ServerError> {
        let preview = mode.is_preview();
        let lang = mode.effective_locale(&path.locale).to_owned();
        let request = PageRequest {
            segments: path.segments,
            locale: path.locale,
            mode,
        };
        let props = state.resolver.resolve_page(&request)?;
        let document = PageDocument::from_props(&props.props, &lang, preview);
        let html = render_page(&state.site, &document);
        Ok(RenderedPage::new(&state.version, html))
    })
    .await?
}

/// Regenerate a stale page in the background, keeping the stale copy on failure.
fn spawn_revalidation(state: Arc<AppState>, path: StaticPath) {
    if !state.cache.begin_refresh(&path) {
        return;
    }
    tokio::spawn(async move {
        tracing::debug!(path = %path.segments, locale = %path.locale, "Regenerating stale page");
        match render(&state, path.clone(), RenderMode::Published).await {
            Ok(page) => state.cache.insert(path.clone(), Arc::new(page)),
            Err(err) => {
                tracing::warn!(
                    path = %path.segments,
                    locale = %path.locale,
                    error = %err,
                    "Revalidation failed, serving stale page"
                );
            }
        }
        state.cache.end_refresh(&path);
    });
}

fn page_response(page: &RenderedPage, headers: &HeaderMap, cache_control: &str) -> Response {
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == page.etag.as_bytes()
    {
        return StatusCode::NOT_MODIFIED.into_response();
    }

    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_owned()),
            (header::ETAG, page.etag.clone()),
            (header::CACHE_CONTROL, cache_control.to_owned()),
        ],
        page.html.clone(),
    )
        .into_response()
}
