//! Catalog domain module.
//!
//! Products and their validation rules, implemented as plain domain logic
//! (no IO, no HTTP, no storage).

pub mod product;

pub use product::{NewProduct, Product, ProductPatch, ProductStatus};
