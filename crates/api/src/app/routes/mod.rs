use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use storefront_auth::{EntryPoint, Role, RoleRequirement};

use crate::app::resource::{Crud, guarded, guarded_page};
use crate::app::services::AppServices;
use crate::middleware::{ApiGuard, PageGuard};

pub mod account;
pub mod admin_products;
pub mod admin_users;
pub mod auth;
pub mod pages;
pub mod storefront;
pub mod system;

/// Admin sign-in page; denied admin navigation lands here.
pub const ADMIN_SIGN_IN_PATH: &str = "/admin";
/// General sign-in page; denied account navigation lands here.
pub const SIGN_IN_PATH: &str = "/signin";

fn any_signed_in() -> RoleRequirement {
    RoleRequirement::any_of([Role::Admin, Role::User])
}

/// Every route of the application. Each guarded route names its entry point
/// and requirement here and nowhere else.
pub fn router(services: &AppServices) -> Router {
    let api = |name: &'static str, requirement: RoleRequirement| {
        ApiGuard::new(services.gateway.clone(), EntryPoint::new(name, requirement))
    };
    let page = |name: &'static str, requirement: RoleRequirement, sign_in: &'static str| PageGuard {
        gateway: services.gateway.clone(),
        entry: EntryPoint::new(name, requirement),
        sign_in,
        identities: Arc::clone(&services.identities),
    };

    let admin_products = Crud {
        list: admin_products::list,
        create: admin_products::create,
        replace: admin_products::replace,
        update: admin_products::update,
        delete: admin_products::delete,
    }
    .into_router(api("api.admin.products", Role::Admin.into()));

    let admin_users = Crud {
        list: admin_users::list,
        create: admin_users::create,
        replace: admin_users::replace,
        update: admin_users::update,
        delete: admin_users::delete,
    }
    .into_router(api("api.admin.users", Role::Admin.into()));

    let account_api = guarded(
        get(account::get_account).patch(account::update_account),
        api("api.account", any_signed_in()),
    );

    Router::new()
        .route("/health", get(system::health))
        // Public storefront.
        .route("/api/products", get(storefront::list_products))
        .route("/api/products/:id", get(storefront::get_product))
        // Protected API.
        .route("/api/admin/products", admin_products)
        .route("/api/admin/users", admin_users)
        .route("/api/account", account_api)
        // Sign-in actions and pages.
        .route(ADMIN_SIGN_IN_PATH, get(pages::admin_sign_in_page))
        .route("/admin/signin", post(auth::admin_sign_in))
        .route(SIGN_IN_PATH, get(pages::sign_in_page).post(auth::sign_in))
        .route("/signup", post(auth::sign_up))
        .route("/signout", post(auth::sign_out))
        // Guarded pages.
        .route(
            "/admin/dashboard",
            guarded_page(
                get(pages::admin_dashboard),
                page("page.admin.dashboard", Role::Admin.into(), ADMIN_SIGN_IN_PATH),
            ),
        )
        .route(
            "/admin/products",
            guarded_page(
                get(pages::admin_products),
                page("page.admin.products", Role::Admin.into(), ADMIN_SIGN_IN_PATH),
            ),
        )
        .route(
            "/account",
            guarded_page(
                get(pages::account),
                page("page.account", any_signed_in(), SIGN_IN_PATH),
            ),
        )
}
