//! `/api/admin/users`: identity management, admin only.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use storefront_auth::{SubjectId, User, UserPatch};

use crate::app::dto::{self, CreateUserRequest, IdQuery, PatchUserRequest, ReplaceUserRequest};
use crate::app::errors;
use crate::app::routes::auth::hash_secret;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<IdQuery>,
) -> Result<Response, Response> {
    if let Some(raw) = query.id {
        let user = load(&services, dto::parse_id(&raw)?).await?;
        return Ok(Json(dto::user_to_json(&user)).into_response());
    }

    let items = services
        .identities
        .list()
        .await
        .map_err(errors::store_error_to_response)?
        .iter()
        .map(dto::user_to_json)
        .collect::<Vec<_>>();
    Ok(Json(serde_json::json!({ "items": items })).into_response())
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<SessionContext>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Response, Response> {
    let hash = hash_secret(body.password).await.map_err(errors::password_error_to_response)?;
    let user = User::new(SubjectId::new(), &body.email, &body.name, body.role, hash, Utc::now())
        .map_err(errors::domain_error_to_response)?;
    services
        .identities
        .insert(user.clone())
        .await
        .map_err(errors::store_error_to_response)?;

    tracing::info!(subject_id = %user.id, role = %user.role, by = %caller.subject_id(), "user created");
    Ok((StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response())
}

pub async fn replace(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ReplaceUserRequest>,
) -> Result<Response, Response> {
    let user = load(&services, dto::parse_id(&body.id)?).await?;
    let patch = UserPatch {
        email: Some(body.email),
        name: Some(body.name),
        role: Some(body.role),
        password_hash: None,
    };
    apply(&services, user, patch, body.password).await
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<PatchUserRequest>,
) -> Result<Response, Response> {
    let user = load(&services, dto::parse_id(&body.id)?).await?;
    let patch = UserPatch {
        email: body.email,
        name: body.name,
        role: body.role,
        password_hash: None,
    };
    apply(&services, user, patch, body.password).await
}

pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<SessionContext>,
    Query(query): Query<IdQuery>,
) -> Result<Response, Response> {
    let raw = query.id.ok_or_else(|| errors::bad_request("id query parameter is required"))?;
    let id: SubjectId = dto::parse_id(&raw)?;

    if !services.identities.delete(id).await.map_err(errors::store_error_to_response)? {
        return Err(errors::not_found());
    }
    tracing::info!(subject_id = %id, by = %caller.subject_id(), "user deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Hash a new password if one was given, apply the patch and persist.
pub(crate) async fn apply(
    services: &AppServices,
    mut user: User,
    mut patch: UserPatch,
    password: Option<String>,
) -> Result<Response, Response> {
    if let Some(password) = password {
        patch.password_hash = Some(hash_secret(password).await.map_err(errors::password_error_to_response)?);
    }
    user.apply_patch(patch, Utc::now()).map_err(errors::domain_error_to_response)?;
    services
        .identities
        .update(user.clone())
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(Json(dto::user_to_json(&user)).into_response())
}

pub(crate) async fn load(services: &AppServices, id: SubjectId) -> Result<User, Response> {
    services
        .identities
        .get(id)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(errors::not_found)
}
