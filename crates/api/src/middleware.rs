//! Guard middleware: the HTTP face of [`Gateway`].
//!
//! - [`api_guard`] renders denials as fixed JSON status responses.
//! - [`page_guard`] redirects to a sign-in page and additionally requires the
//!   session's subject to still exist in the identity store with the role the
//!   session claims.
//!
//! Both are installed with `route_layer` on a whole method router, so every
//! verb registered on a route goes through the same check.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use axum_extra::extract::cookie::CookieJar;

use storefront_auth::{Denial, EntryPoint, Gateway};
use storefront_infra::store::IdentityStore;

use crate::app::errors;
use crate::context::{CurrentUser, SessionContext};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "storefront_session";

#[derive(Clone)]
pub struct ApiGuard {
    pub gateway: Gateway,
    pub entry: EntryPoint,
}

impl ApiGuard {
    pub fn new(gateway: Gateway, entry: EntryPoint) -> Self {
        Self { gateway, entry }
    }
}

pub async fn api_guard(
    State(guard): State<ApiGuard>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let credential = extract_credential(req.headers());

    let outcome = guard
        .gateway
        .guard(&guard.entry, credential.as_deref(), move |session| async move {
            let mut req = req;
            req.extensions_mut().insert(SessionContext::from(&session));
            next.run(req).await
        })
        .await;

    match outcome {
        Ok(response) => response,
        Err(denial) => errors::denial_to_response(denial),
    }
}

#[derive(Clone)]
pub struct PageGuard {
    pub gateway: Gateway,
    pub entry: EntryPoint,
    /// Where denied navigation is sent.
    pub sign_in: &'static str,
    pub identities: Arc<dyn IdentityStore>,
}

pub async fn page_guard(
    State(guard): State<PageGuard>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let credential = extract_credential(req.headers());
    let identities = guard.identities.clone();
    let entry = guard.entry.name;

    let outcome = guard
        .gateway
        .guard(&guard.entry, credential.as_deref(), move |session| async move {
            match identities.get(session.subject_id).await {
                Ok(Some(user)) if user.role != session.role => {
                    tracing::info!(entry, subject_id = %session.subject_id, "session role no longer matches the record");
                    Err(Denial::BackingRecordMissing)
                }
                Ok(Some(user)) => {
                    let mut req = req;
                    req.extensions_mut().insert(SessionContext::from(&session));
                    req.extensions_mut().insert(CurrentUser(user));
                    Ok(next.run(req).await)
                }
                Ok(None) => {
                    tracing::info!(entry, subject_id = %session.subject_id, "session subject no longer exists");
                    Err(Denial::BackingRecordMissing)
                }
                Err(e) => {
                    tracing::warn!(entry, error = %e, "identity lookup failed");
                    Err(Denial::BackingRecordMissing)
                }
            }
        })
        .await
        .and_then(|inner| inner);

    match outcome {
        Ok(response) => response,
        Err(_) => Redirect::to(guard.sign_in).into_response(),
    }
}

/// Pull the session token from the request.
///
/// The session cookie wins over an `Authorization: Bearer` header. Empty
/// values count as absent.
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    session_cookie(headers).or_else(|| bearer_token(headers))
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    let value = jar.get(SESSION_COOKIE)?.value_trimmed().to_string();
    (!value.is_empty()).then_some(value)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
