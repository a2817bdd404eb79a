//! Preview mode endpoints.
//!
//! `GET /api/preview?secret=..&locale=..&path=..` checks the shared secret,
//! stores the preview locale in the `folio_preview` cookie and redirects to
//! `path`. `GET /api/exit-preview` clears the cookie.
//!
//! The cookie value is `{locale}:{token}`, where the token is the hex
//! HMAC-SHA256 of the locale keyed by the secret.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Redirect, Response};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::ServerError;
use crate::state::AppState;

pub(crate) const PREVIEW_COOKIE: &str = "folio_preview";

type PreviewMac = Hmac<Sha256>;

/// Query parameters of `/api/preview`.
#[derive(Debug, Deserialize)]
pub(crate) struct PreviewParams {
    secret: Option<String>,
    locale: Option<String>,
    path: Option<String>,
}

/// Handle GET /api/preview.
pub(crate) async fn enter_preview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PreviewParams>,
) -> Result<Response, ServerError> {
    let Some(secret) = state.preview_secret.as_deref() else {
        return Err(ServerError::InvalidPreviewSecret);
    };
    if params.secret.as_deref() != Some(secret) {
        return Err(ServerError::InvalidPreviewSecret);
    }

    let locale = params
        .locale
        .unwrap_or_else(|| state.default_locale.clone());
    if !state.has_locale(&locale) {
        return Err(ServerError::BadRequest(format!("Unknown locale: {locale}")));
    }

    let location = redirect_target(params.path.as_deref());
    tracing::info!(locale = %locale, path = %location, "Entering preview mode");

    let token = preview_token(secret, &locale).ok_or(ServerError::InvalidPreviewSecret)?;
    let cookie = format!("{PREVIEW_COOKIE}={locale}:{token}; Path=/; HttpOnly; SameSite=Lax");
    Ok(([(header::SET_COOKIE, cookie)], Redirect::temporary(location)).into_response())
}

/// Handle GET /api/exit-preview.
pub(crate) async fn exit_preview() -> Response {
    let cookie = format!("{PREVIEW_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    ([(header::SET_COOKIE, cookie)], Redirect::temporary("/")).into_response()
}

/// Preview locale carried by a valid preview cookie.
pub(crate) fn preview_locale(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let secret = state.preview_secret.as_deref()?;
    let value = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|pair| pair.trim().strip_prefix(PREVIEW_COOKIE)?.strip_prefix('='))?;

    let (locale, token) = value.split_once(':')?;
    (state.has_locale(locale) && verify_preview_token(secret, locale, token))
        .then(|| locale.to_owned())
}

fn preview_mac(secret: &str, locale: &str) -> Option<PreviewMac> {
    let mut mac = PreviewMac::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(locale.as_bytes());
    Some(mac)
}

fn preview_token(secret: &str, locale: &str) -> Option<String> {
    Some(hex::encode(preview_mac(secret, locale)?.finalize().into_bytes()))
}

/// Constant-time check of a cookie token.
fn verify_preview_token(secret: &str, locale: &str, token: &str) -> bool {
    let Ok(bytes) = hex::decode(token) else {
        return false;
    };
    preview_mac(secret, locale).is_some_and(|mac| mac.verify_slice(&bytes).is_ok())
}

/// Local path to redirect to; anything else falls back to `/`.
fn redirect_target(path: Option<&str>) -> &str {
    match path {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}
