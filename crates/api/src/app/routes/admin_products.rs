//! `/api/admin/products`: catalog management, admin only.
//!
//! Handlers assume the guard already ran; none of them re-check the role.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use storefront_catalog::{NewProduct, Product};
use storefront_core::ProductId;

use crate::app::dto::{self, IdQuery, PatchProductRequest, ReplaceProductRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<IdQuery>,
) -> Result<Response, Response> {
    if let Some(raw) = query.id {
        let product = load(&services, dto::parse_id(&raw)?).await?;
        return Ok(Json(dto::product_to_json(&product)).into_response());
    }

    let items = services
        .products
        .list()
        .await
        .map_err(errors::store_error_to_response)?
        .iter()
        .map(dto::product_to_json)
        .collect::<Vec<_>>();
    Ok(Json(serde_json::json!({ "items": items })).into_response())
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<SessionContext>,
    Json(body): Json<NewProduct>,
) -> Result<Response, Response> {
    let product = Product::create(ProductId::new(), body, Utc::now()).map_err(errors::domain_error_to_response)?;
    services
        .products
        .insert(product.clone())
        .await
        .map_err(errors::store_error_to_response)?;

    tracing::info!(product_id = %product.id, by = %caller.subject_id(), "product created");
    Ok((StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response())
}

pub async fn replace(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ReplaceProductRequest>,
) -> Result<Response, Response> {
    let mut product = load(&services, dto::parse_id(&body.id)?).await?;
    product
        .replace(body.product, Utc::now())
        .map_err(errors::domain_error_to_response)?;
    save(&services, &product).await?;
    Ok(Json(dto::product_to_json(&product)).into_response())
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<PatchProductRequest>,
) -> Result<Response, Response> {
    let mut product = load(&services, dto::parse_id(&body.id)?).await?;
    product
        .apply_patch(body.patch, Utc::now())
        .map_err(errors::domain_error_to_response)?;
    save(&services, &product).await?;
    Ok(Json(dto::product_to_json(&product)).into_response())
}

pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<SessionContext>,
    Query(query): Query<IdQuery>,
) -> Result<Response, Response> {
    let raw = query.id.ok_or_else(|| errors::bad_request("id query parameter is required"))?;
    let id: ProductId = dto::parse_id(&raw)?;

    if !services.products.delete(id).await.map_err(errors::store_error_to_response)? {
        return Err(errors::not_found());
    }
    tracing::info!(product_id = %id, by = %caller.subject_id(), "product deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn load(services: &AppServices, id: ProductId) -> Result<Product, Response> {
    services
        .products
        .get(id)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(errors::not_found)
}

async fn save(services: &AppServices, product: &Product) -> Result<(), Response> {
    services
        .products
        .update(product.clone())
        .await
        .map_err(errors::store_error_to_response)
}
