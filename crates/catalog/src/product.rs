use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ProductId};

const MAX_NAME_LEN: usize = 200;
const DEFAULT_CURRENCY: &str = "USD";

/// Product status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }
}

impl core::str::FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProductStatus::Draft),
            "active" => Ok(ProductStatus::Active),
            "archived" => Ok(ProductStatus::Archived),
            other => Err(DomainError::validation(format!("unknown product status '{other}'"))),
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Price in the smallest currency unit (e.g. cents).
    pub price_cents: i64,
    /// ISO 4217 code, e.g. "USD".
    pub currency: String,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full product contents, used for create and replace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
}

/// Partial update. `None` leaves the field unchanged; an empty `image_url`
/// clears the image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<ProductStatus>,
}

impl Product {
    pub fn create(id: ProductId, input: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        let fields = Fields::validate(input)?;
        Ok(Self {
            id,
            name: fields.name,
            description: fields.description,
            price_cents: fields.price_cents,
            currency: fields.currency,
            image_url: fields.image_url,
            status: fields.status,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace every editable field (PUT semantics). Identity and creation
    /// time are kept.
    pub fn replace(&mut self, input: NewProduct, now: DateTime<Utc>) -> DomainResult<()> {
        let fields = Fields::validate(input)?;
        self.name = fields.name;
        self.description = fields.description;
        self.price_cents = fields.price_cents;
        self.currency = fields.currency;
        self.image_url = fields.image_url;
        self.status = fields.status;
        self.updated_at = now;
        Ok(())
    }

    /// Apply a partial update (PATCH semantics). Nothing changes on error.
    pub fn apply_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let merged = NewProduct {
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            description: patch.description.unwrap_or_else(|| self.description.clone()),
            price_cents: patch.price_cents.unwrap_or(self.price_cents),
            currency: Some(patch.currency.unwrap_or_else(|| self.currency.clone())),
            image_url: match patch.image_url {
                Some(url) => Some(url),
                None => self.image_url.clone(),
            },
            status: patch.status.unwrap_or(self.status),
        };
        self.replace(merged, now)
    }

    /// Whether the public storefront shows this product.
    pub fn is_listed(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

struct Fields {
    name: String,
    description: String,
    price_cents: i64,
    currency: String,
    image_url: Option<String>,
    status: ProductStatus,
}

impl Fields {
    fn validate(input: NewProduct) -> DomainResult<Self> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!("name must be at most {MAX_NAME_LEN} characters")));
        }

        if input.price_cents < 0 {
            return Err(DomainError::validation("price_cents must be >= 0"));
        }

        let currency = input
            .currency
            .map(|c| c.trim().to_string())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(DomainError::validation("currency must be a three-letter ISO code"));
        }

        let image_url = input
            .image_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        Ok(Self {
            name,
            description: input.description.trim().to_string(),
            price_cents: input.price_cents,
            currency,
            image_url,
            status: input.status,
        })
    }
}
