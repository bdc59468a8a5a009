//! Sign-in, sign-up and sign-out actions.
//!
//! Every sign-in failure (malformed body, unknown email, bad password, role
//! not accepted by this action) produces the same `401 {"message":"Unauthorized"}`
//! and no cookie.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use serde_json::json;

use storefront_auth::{
    PasswordError, Role, RoleRequirement, SubjectId, User, hash_password, normalize_email, verify_decoy, verify_password,
};

use crate::app::dto::{self, SignInRequest, SignUpRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::middleware::SESSION_COOKIE;

pub async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Response {
    sign_in_as(&services, "signin", &RoleRequirement::any_of(Role::ALL), body).await
}

/// Admin panel sign-in: valid credentials of a non-admin are refused.
pub async fn admin_sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Response {
    sign_in_as(&services, "admin.signin", &RoleRequirement::only(Role::Admin), body).await
}

async fn sign_in_as(
    services: &AppServices,
    action: &'static str,
    accepted: &RoleRequirement,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        burn_decoy("").await;
        tracing::info!(action, reason = "malformed_body", "sign-in rejected");
        return errors::sign_in_failed();
    };

    let user = match authenticate(services, &body).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::info!(action, reason = "bad_credentials", "sign-in rejected");
            return errors::sign_in_failed();
        }
        Err(response) => return response,
    };

    if !accepted.accepts(user.role) {
        tracing::info!(action, subject_id = %user.id, reason = "role_not_accepted", "sign-in rejected");
        return errors::sign_in_failed();
    }

    match start_session(services, &user) {
        Ok((token, cookie)) => {
            tracing::info!(action, subject_id = %user.id, role = %user.role, "signed in");
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(json!({
                    "message": "Signed in",
                    "token": token,
                    "subject_id": user.id.to_string(),
                    "role": user.role.as_str(),
                })),
            )
                .into_response()
        }
        Err(response) => response,
    }
}

/// `Ok(None)` for any credential mismatch; `Err` only for storage faults.
///
/// Every mismatch costs one argon2 verification, whether or not the email
/// belongs to an account.
async fn authenticate(services: &AppServices, body: &SignInRequest) -> Result<Option<User>, Response> {
    let user = match normalize_email(&body.email) {
        Ok(email) => services
            .identities
            .find_by_email(&email)
            .await
            .map_err(errors::store_error_to_response)?,
        Err(_) => None,
    };

    let Some(user) = user else {
        burn_decoy(&body.password).await;
        return Ok(None);
    };

    if check_password(&user.password_hash, &body.password).await {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Register a `user` identity and sign it in.
pub async fn sign_up(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<SignUpRequest>,
) -> Result<Response, Response> {
    let email = normalize_email(&body.email).map_err(errors::domain_error_to_response)?;
    if services
        .identities
        .find_by_email(&email)
        .await
        .map_err(errors::store_error_to_response)?
        .is_some()
    {
        return Err(errors::json_error(StatusCode::CONFLICT, "conflict", "email already registered"));
    }

    let hash = hash_secret(body.password).await.map_err(errors::password_error_to_response)?;
    let user = User::new(SubjectId::new(), &email, &body.name, Role::User, hash, Utc::now())
        .map_err(errors::domain_error_to_response)?;
    services
        .identities
        .insert(user.clone())
        .await
        .map_err(errors::store_error_to_response)?;
    tracing::info!(subject_id = %user.id, "user signed up");

    let (token, cookie) = start_session(&services, &user)?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "message": "Signed up",
            "token": token,
            "user": dto::user_to_json(&user),
        })),
    )
        .into_response())
}

pub async fn sign_out(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let cookie = expired_cookie(services.secure_cookies);
    match HeaderValue::from_str(&cookie) {
        Ok(value) => (
            StatusCode::OK,
            [(header::SET_COOKIE, value)],
            Json(json!({ "message": "Signed out" })),
        )
            .into_response(),
        Err(_) => errors::internal_error(),
    }
}

fn start_session(services: &AppServices, user: &User) -> Result<(String, HeaderValue), Response> {
    let token = services
        .tokens
        .issue(user.id, user.role, services.session_ttl)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to issue session token");
            errors::internal_error()
        })?;
    let cookie = session_cookie(&token, services.session_ttl.num_seconds(), services.secure_cookies);
    let value = HeaderValue::from_str(&cookie).map_err(|_| errors::internal_error())?;
    Ok((token, value))
}

pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .secure(secure)
        .build()
        .to_string()
}

pub fn expired_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Argon2 is CPU bound; keep it off the async workers.
pub(crate) async fn hash_secret(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
}

pub(crate) async fn check_password(hash: &str, password: &str) -> bool {
    let (hash, password) = (hash.to_string(), password.to_string());
    tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .unwrap_or(false)
}

async fn burn_decoy(password: &str) {
    let password = password.to_string();
    let _ = tokio::task::spawn_blocking(move || verify_decoy(&password)).await;
}
