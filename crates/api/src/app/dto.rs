use core::str::FromStr;

use axum::response::Response;
use serde::Deserialize;
use serde_json::{Value, json};

use storefront_auth::{Role, User};
use storefront_catalog::{NewProduct, Product, ProductPatch};
use storefront_core::DomainError;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// `?id=` selector used by single-route resources.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

/// Full replacement. A missing password keeps the current one.
#[derive(Debug, Deserialize)]
pub struct ReplaceUserRequest {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatchUserRequest {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

/// Self-service profile update; the role is not editable here.
#[derive(Debug, Deserialize)]
pub struct AccountPatchRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceProductRequest {
    pub id: String,
    #[serde(flatten)]
    pub product: NewProduct,
}

#[derive(Debug, Deserialize)]
pub struct PatchProductRequest {
    pub id: String,
    #[serde(flatten)]
    pub patch: ProductPatch,
}

// -------------------------
// Response mapping
// -------------------------

pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id.to_string(),
        "email": user.email,
        "name": user.name,
        "role": user.role.as_str(),
        "created_at": user.created_at,
        "updated_at": user.updated_at,
    })
}

pub fn product_to_json(product: &Product) -> Value {
    json!({
        "id": product.id.to_string(),
        "name": product.name,
        "description": product.description,
        "price_cents": product.price_cents,
        "currency": product.currency,
        "image_url": product.image_url,
        "status": product.status.as_str(),
        "created_at": product.created_at,
        "updated_at": product.updated_at,
    })
}

pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(errors::domain_error_to_response)
}
