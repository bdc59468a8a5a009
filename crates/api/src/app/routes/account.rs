//! `/api/account`: the caller's own identity record.

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    response::{IntoResponse, Response},
};

use storefront_auth::UserPatch;

use crate::app::dto::{self, AccountPatchRequest};
use crate::app::routes::admin_users;
use crate::app::services::AppServices;
use crate::context::SessionContext;

/// A valid session whose subject was deleted answers 404.
pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<SessionContext>,
) -> Result<Response, Response> {
    let user = admin_users::load(&services, caller.subject_id()).await?;
    Ok(Json(dto::user_to_json(&user)).into_response())
}

pub async fn update_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<SessionContext>,
    Json(body): Json<AccountPatchRequest>,
) -> Result<Response, Response> {
    let user = admin_users::load(&services, caller.subject_id()).await?;
    let patch = UserPatch {
        email: body.email,
        name: body.name,
        ..UserPatch::default()
    };
    admin_users::apply(&services, user, patch, body.password).await
}
