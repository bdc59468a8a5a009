//! Public catalog: no session required, only listed products are visible.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    response::{IntoResponse, Response},
};

use storefront_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, Response> {
    let items = services
        .products
        .list()
        .await
        .map_err(errors::store_error_to_response)?
        .iter()
        .filter(|p| p.is_listed())
        .map(dto::product_to_json)
        .collect::<Vec<_>>();
    Ok(Json(serde_json::json!({ "items": items })).into_response())
}

/// Unlisted products answer 404, same as missing ones.
pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id: ProductId = dto::parse_id(&id)?;
    match services.products.get(id).await.map_err(errors::store_error_to_response)? {
        Some(product) if product.is_listed() => Ok(Json(dto::product_to_json(&product)).into_response()),
        _ => Err(errors::not_found()),
    }
}
