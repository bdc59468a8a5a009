//! Router-level tests: requests are driven through the real `Router` with
//! `oneshot`, no sockets involved.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use axum::routing::{MethodRouter, get};
use axum::Router;
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceExt;

use storefront_auth::{
    AuthorizationDecision, EntryPoint, Gateway, ResolveError, Role, Session, SessionResolver, SessionTokens,
    SubjectId, TokenSessionResolver, User, hash_password,
};
use storefront_catalog::{NewProduct, Product, ProductStatus};
use storefront_core::ProductId;
use storefront_infra::store::{IdentityStore, InMemoryProductStore, StoreError};

use crate::app::resource::{Crud, guarded_page};
use crate::app::{AppServices, build_app};
use crate::middleware::{ApiGuard, PageGuard};

const SECRET: &[u8] = b"router-test-secret-0123456789abcdef";
const VERBS: [Method; 5] = [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

fn services() -> AppServices {
    AppServices::in_memory(SECRET)
}

async fn seed_user(services: &AppServices, email: &str, role: Role, password_hash: String) -> User {
    let user = User::new(SubjectId::new(), email, "Test", role, password_hash, Utc::now()).unwrap();
    services.identities.insert(user.clone()).await.unwrap();
    user
}

fn token_for(services: &AppServices, user: &User) -> String {
    services.tokens.issue(user.id, user.role, chrono::Duration::minutes(10)).unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Spy resource: one counter per verb, guarded like the real admin resources.
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Spies {
    calls: [AtomicUsize; 5],
}

impl Spies {
    fn total(&self) -> usize {
        self.calls.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    fn count(&self, verb: usize) -> usize {
        self.calls[verb].load(Ordering::SeqCst)
    }
}

fn spy(spies: &Arc<Spies>, verb: usize) -> impl Fn() -> std::future::Ready<(StatusCode, String)> + Clone + Send + Sync + 'static {
    let spies = Arc::clone(spies);
    move || {
        spies.calls[verb].fetch_add(1, Ordering::SeqCst);
        std::future::ready((StatusCode::IM_A_TEAPOT, format!("inner-{verb}")))
    }
}

fn spy_router(gateway: Gateway, spies: &Arc<Spies>) -> Router {
    let resource: MethodRouter = Crud {
        list: spy(spies, 0),
        create: spy(spies, 1),
        replace: spy(spies, 2),
        update: spy(spies, 3),
        delete: spy(spies, 4),
    }
    .into_router(ApiGuard::new(gateway, EntryPoint::new("test.spy", Role::Admin)));
    Router::new().route("/spy", resource)
}

#[tokio::test]
async fn no_session_is_401_on_every_verb_and_handler_never_runs() {
    let services = services();
    let spies = Arc::new(Spies::default());
    let app = spy_router(services.gateway.clone(), &spies);

    for verb in VERBS {
        let response = app.clone().oneshot(request(verb.clone(), "/spy", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{verb}");
        assert_eq!(body_json(response).await, json!({ "message": "unauthenticated" }));
    }
    assert_eq!(spies.total(), 0);
}

#[tokio::test]
async fn invalid_session_is_401_on_every_verb() {
    let services = services();
    let spies = Arc::new(Spies::default());
    let app = spy_router(services.gateway.clone(), &spies);

    for verb in VERBS {
        let response = app
            .clone()
            .oneshot(request(verb.clone(), "/spy", Some("not-a-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{verb}");
    }
    assert_eq!(spies.total(), 0);
}

#[tokio::test]
async fn wrong_role_is_403_and_handler_never_runs() {
    let services = services();
    let user = seed_user(&services, "shopper@example.com", Role::User, "unused".into()).await;
    let token = token_for(&services, &user);
    let spies = Arc::new(Spies::default());
    let app = spy_router(services.gateway.clone(), &spies);

    for verb in VERBS {
        let response = app.clone().oneshot(request(verb.clone(), "/spy", Some(token.as_str()), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{verb}");
        assert_eq!(body_json(response).await, json!({ "message": "unauthorized" }));
    }
    assert_eq!(spies.total(), 0);
}

#[tokio::test]
async fn accepted_role_runs_handler_once_and_response_passes_through() {
    let services = services();
    let admin = seed_user(&services, "admin@example.com", Role::Admin, "unused".into()).await;
    let token = token_for(&services, &admin);
    let spies = Arc::new(Spies::default());
    let app = spy_router(services.gateway.clone(), &spies);

    for (i, verb) in VERBS.into_iter().enumerate() {
        let response = app.clone().oneshot(request(verb, "/spy", Some(token.as_str()), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(body_text(response).await, format!("inner-{i}"));
        assert_eq!(spies.count(i), 1);
    }
    assert_eq!(spies.total(), 5);
}

#[tokio::test]
async fn identical_requests_get_identical_decisions() {
    let services = services();
    let user = seed_user(&services, "shopper@example.com", Role::User, "unused".into()).await;
    let token = token_for(&services, &user);
    let spies = Arc::new(Spies::default());
    let app = spy_router(services.gateway.clone(), &spies);

    for credential in [None, Some("garbage"), Some(token.as_str())] {
        let first = app
            .clone()
            .oneshot(request(Method::DELETE, "/spy", credential, None))
            .await
            .unwrap()
            .status();
        for _ in 0..3 {
            let again = app
                .clone()
                .oneshot(request(Method::DELETE, "/spy", credential, None))
                .await
                .unwrap()
                .status();
            assert_eq!(again, first);
        }
    }
    assert_eq!(spies.total(), 0);
}

struct StalledResolver;

#[async_trait]
impl SessionResolver for StalledResolver {
    async fn resolve(&self, _credential: &str) -> Result<Option<Session>, ResolveError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Some(Session::new(SubjectId::new(), Role::Admin, Utc::now() + chrono::Duration::minutes(5))))
    }
}

struct BrokenResolver;

#[async_trait]
impl SessionResolver for BrokenResolver {
    async fn resolve(&self, _credential: &str) -> Result<Option<Session>, ResolveError> {
        Err(ResolveError::Unavailable("verifier offline".into()))
    }
}

#[tokio::test]
async fn resolver_timeout_or_failure_fails_closed_with_401() {
    let spies = Arc::new(Spies::default());
    let gateways = [
        Gateway::new(Arc::new(StalledResolver)).with_resolve_timeout(Duration::from_millis(50)),
        Gateway::new(Arc::new(BrokenResolver)),
    ];

    for gateway in gateways {
        let app = spy_router(gateway, &spies);
        let response = app.oneshot(request(Method::GET, "/spy", Some("anything"), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(spies.total(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Full application
// ─────────────────────────────────────────────────────────────────────────────

fn new_product(name: &str, status: ProductStatus) -> Product {
    Product::create(
        ProductId::new(),
        NewProduct {
            name: name.into(),
            description: String::new(),
            price_cents: 1500,
            currency: None,
            image_url: None,
            status,
        },
        Utc::now(),
    )
    .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = build_app(Arc::new(services()));
    let response = app.oneshot(request(Method::GET, "/health", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_listing_passes_through() {
    let services = services();
    let admin = seed_user(&services, "admin@example.com", Role::Admin, "unused".into()).await;
    services.products.insert(new_product("Mug", ProductStatus::Draft)).await.unwrap();
    let token = token_for(&services, &admin);
    let app = build_app(Arc::new(services));

    let response = app
        .oneshot(request(Method::GET, "/api/admin/products", Some(token.as_str()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["name"], "Mug");
}

#[tokio::test]
async fn user_cannot_create_products() {
    let services = Arc::new(services());
    let user = seed_user(&services, "shopper@example.com", Role::User, "unused".into()).await;
    let token = token_for(&services, &user);
    let app = build_app(services.clone());

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/admin/products",
            Some(token.as_str()),
            Some(json!({ "name": "Sneaky", "price_cents": 1 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await, json!({ "message": "unauthorized" }));
    assert!(services.products.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn admin_product_lifecycle_on_a_single_route() {
    let services = services();
    let admin = seed_user(&services, "admin@example.com", Role::Admin, "unused".into()).await;
    let token = token_for(&services, &admin);
    let app = build_app(Arc::new(services));

    let created = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/admin/products",
            Some(token.as_str()),
            Some(json!({ "name": "Mug", "price_cents": 900 })),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let id = body_json(created).await["id"].as_str().unwrap().to_string();

    let patched = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            "/api/admin/products",
            Some(token.as_str()),
            Some(json!({ "id": id, "status": "active" })),
        ))
        .await
        .unwrap();
    assert_eq!(patched.status(), StatusCode::OK);
    assert_eq!(body_json(patched).await["status"], "active");

    let replaced = app
        .clone()
        .oneshot(request(
            Method::PUT,
            "/api/admin/products",
            Some(token.as_str()),
            Some(json!({ "id": id, "name": "Cup", "price_cents": 700, "status": "active" })),
        ))
        .await
        .unwrap();
    assert_eq!(replaced.status(), StatusCode::OK);
    assert_eq!(body_json(replaced).await["name"], "Cup");

    let public = app
        .clone()
        .oneshot(request(Method::GET, &format!("/api/products/{id}"), None, None))
        .await
        .unwrap();
    assert_eq!(public.status(), StatusCode::OK);

    let deleted = app
        .clone()
        .oneshot(request(Method::DELETE, &format!("/api/admin/products?id={id}"), Some(token.as_str()), None))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = app
        .oneshot(request(Method::GET, &format!("/api/admin/products?id={id}"), Some(token.as_str()), None))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_product_is_rejected_without_storing() {
    let services = Arc::new(services());
    let admin = seed_user(&services, "admin@example.com", Role::Admin, "unused".into()).await;
    let token = token_for(&services, &admin);
    let app = build_app(services.clone());

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/admin/products",
            Some(token.as_str()),
            Some(json!({ "name": "Mug", "price_cents": -1 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(services.products.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn storefront_lists_only_active_products() {
    let services = services();
    let draft = new_product("Draft", ProductStatus::Draft);
    services.products.insert(draft.clone()).await.unwrap();
    services.products.insert(new_product("Live", ProductStatus::Active)).await.unwrap();
    let app = build_app(Arc::new(services));

    let listing = app.clone().oneshot(request(Method::GET, "/api/products", None, None)).await.unwrap();
    let body = body_json(listing).await;
    let names: Vec<_> = body["items"].as_array().unwrap().iter().map(|p| p["name"].clone()).collect();
    assert_eq!(names, vec![json!("Live")]);

    let hidden = app
        .oneshot(request(Method::GET, &format!("/api/products/{}", draft.id), None, None))
        .await
        .unwrap();
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_sign_in_refuses_valid_non_admin_credentials() {
    let services = services();
    seed_user(&services, "shopper@example.com", Role::User, hash_password("correct horse").unwrap()).await;
    let app = build_app(Arc::new(services));

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/admin/signin",
            None,
            Some(json!({ "email": "shopper@example.com", "password": "correct horse" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(response).await, json!({ "message": "Unauthorized" }));

    // Same credentials work on the general sign-in.
    let response = app
        .oneshot(request(
            Method::POST,
            "/signin",
            None,
            Some(json!({ "email": "shopper@example.com", "password": "correct horse" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(cookie.starts_with("storefront_session="));
    assert_eq!(body_json(response).await["role"], "user");
}

#[tokio::test]
async fn sign_in_failures_are_indistinguishable() {
    let services = services();
    seed_user(&services, "admin@example.com", Role::Admin, hash_password("correct horse").unwrap()).await;
    let app = build_app(Arc::new(services));

    let attempts = [
        json!({ "email": "admin@example.com", "password": "wrong password" }),
        json!({ "email": "nobody@example.com", "password": "correct horse" }),
        json!({ "email": "not-an-email", "password": "correct horse" }),
        json!({ "unexpected": true }),
    ];
    for attempt in attempts {
        let response = app
            .clone()
            .oneshot(request(Method::POST, "/admin/signin", None, Some(attempt)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(response).await, json!({ "message": "Unauthorized" }));
    }
}

#[tokio::test]
async fn deleted_identity_is_redirected_even_though_session_is_allowed() {
    let services = services();
    let admin = seed_user(&services, "admin@example.com", Role::Admin, "unused".into()).await;
    let token = token_for(&services, &admin);
    services.identities.delete(admin.id).await.unwrap();

    let entry = EntryPoint::new("page.admin.dashboard", Role::Admin);
    assert!(matches!(
        services.gateway.authorize(&entry, Some(token.as_str())).await,
        AuthorizationDecision::Allowed { .. }
    ));

    let app = build_app(Arc::new(services));
    let response = app
        .oneshot(request(Method::GET, "/admin/dashboard", Some(token.as_str()), None))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/admin");
}

#[tokio::test]
async fn pages_redirect_to_their_sign_in() {
    let services = services();
    let user = seed_user(&services, "shopper@example.com", Role::User, "unused".into()).await;
    let token = token_for(&services, &user);
    let app = build_app(Arc::new(services));

    let cases = [
        ("/admin/dashboard", None, Some("/admin")),
        ("/admin/products", Some(token.as_str()), Some("/admin")),
        ("/account", None, Some("/signin")),
        ("/account", Some(token.as_str()), None),
    ];
    for (uri, credential, redirect) in cases {
        let response = app.clone().oneshot(request(Method::GET, uri, credential, None)).await.unwrap();
        match redirect {
            Some(location) => {
                assert!(response.status().is_redirection(), "{uri}");
                assert_eq!(response.headers().get(header::LOCATION).unwrap(), location);
            }
            None => assert_eq!(response.status(), StatusCode::OK, "{uri}"),
        }
    }
}

#[tokio::test]
async fn account_api_reports_missing_record_as_404() {
    let services = services();
    let user = seed_user(&services, "shopper@example.com", Role::User, "unused".into()).await;
    let token = token_for(&services, &user);
    let app = build_app(Arc::new(services.clone()));

    let ok = app
        .clone()
        .oneshot(request(Method::GET, "/api/account", Some(token.as_str()), None))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(body_json(ok).await["email"], "shopper@example.com");

    services.identities.delete(user.id).await.unwrap();
    let missing = app
        .oneshot(request(Method::GET, "/api/account", Some(token.as_str()), None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// ─────────────────────────────────────────────────────────────────────────────
// Sign-in timing
// ─────────────────────────────────────────────────────────────────────────────

async fn fastest_sign_in(app: &Router, email: &str, runs: usize) -> Duration {
    let mut fastest = Duration::MAX;
    for _ in 0..runs {
        let started = Instant::now();
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/admin/signin",
                None,
                Some(json!({ "email": email, "password": "wrong password" })),
            ))
            .await
            .unwrap();
        let elapsed = started.elapsed();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        fastest = fastest.min(elapsed);
    }
    fastest
}

#[tokio::test]
async fn unknown_email_costs_as_much_as_a_wrong_password() {
    let services = services();
    seed_user(&services, "admin@example.com", Role::Admin, hash_password("correct horse").unwrap()).await;
    let app = build_app(Arc::new(services));

    // Warm the decoy hash so its one-off construction is not measured.
    fastest_sign_in(&app, "nobody@example.com", 1).await;

    let known = fastest_sign_in(&app, "admin@example.com", 3).await;
    let unknown = fastest_sign_in(&app, "nobody@example.com", 3).await;
    let malformed = fastest_sign_in(&app, "not-an-email", 3).await;

    for other in [unknown, malformed] {
        assert!(other * 4 >= known, "known={known:?} other={other:?}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Role changes
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn demoted_admin_loses_admin_access_immediately() {
    let services = Arc::new(services());
    let owner = seed_user(&services, "owner@example.com", Role::Admin, "unused".into()).await;
    let deputy = seed_user(&services, "deputy@example.com", Role::Admin, "unused".into()).await;
    let owner_token = token_for(&services, &owner);
    let deputy_token = token_for(&services, &deputy);
    let app = build_app(services.clone());

    let demoted = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            "/api/admin/users",
            Some(owner_token.as_str()),
            Some(json!({ "id": deputy.id.to_string(), "role": "user" })),
        ))
        .await
        .unwrap();
    assert_eq!(demoted.status(), StatusCode::OK);

    let create = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/admin/products",
            Some(deputy_token.as_str()),
            Some(json!({ "name": "Mug", "price_cents": 900 })),
        ))
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);
    assert!(services.products.list().await.unwrap().is_empty());

    let page = app
        .oneshot(request(Method::GET, "/admin/dashboard", Some(deputy_token.as_str()), None))
        .await
        .unwrap();
    assert!(page.status().is_redirection());
    assert_eq!(page.headers().get(header::LOCATION).unwrap(), "/admin");
}

#[tokio::test]
async fn page_guard_rejects_a_role_the_record_no_longer_has() {
    // Token-only gateway: the page guard's own record check is the last line.
    let base = services();
    let gateway = Gateway::new(Arc::new(TokenSessionResolver::new(base.tokens.clone())));
    let services = base.with_gateway(gateway);
    let mut admin = seed_user(&services, "admin@example.com", Role::Admin, "unused".into()).await;
    let token = token_for(&services, &admin);
    admin.role = Role::User;
    services.identities.update(admin).await.unwrap();

    let app = build_app(Arc::new(services));
    let response = app
        .oneshot(request(Method::GET, "/admin/dashboard", Some(token.as_str()), None))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/admin");
}

// ─────────────────────────────────────────────────────────────────────────────
// Backing-record lookup failures
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct OfflineIdentities {
    lookups: AtomicUsize,
}

impl OfflineIdentities {
    fn offline() -> StoreError {
        StoreError::Unavailable("identity store offline".into())
    }
}

#[async_trait]
impl IdentityStore for OfflineIdentities {
    async fn get(&self, _id: SubjectId) -> Result<Option<User>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(Self::offline())
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Err(Self::offline())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Err(Self::offline())
    }

    async fn insert(&self, _user: User) -> Result<(), StoreError> {
        Err(Self::offline())
    }

    async fn update(&self, _user: User) -> Result<(), StoreError> {
        Err(Self::offline())
    }

    async fn delete(&self, _id: SubjectId) -> Result<bool, StoreError> {
        Err(Self::offline())
    }
}

fn spy_page(gateway: Gateway, identities: Arc<OfflineIdentities>, spies: &Arc<Spies>) -> Router {
    let guard = PageGuard {
        gateway,
        entry: EntryPoint::new("test.page", Role::Admin),
        sign_in: "/admin",
        identities,
    };
    Router::new().route("/page", guarded_page(get(spy(spies, 0)), guard))
}

#[tokio::test]
async fn failed_record_lookup_redirects_once_without_rendering() {
    let tokens = SessionTokens::new(SECRET);
    let token = tokens.issue(SubjectId::new(), Role::Admin, chrono::Duration::minutes(5)).unwrap();

    // Page guard's own lookup fails.
    let identities = Arc::new(OfflineIdentities::default());
    let spies = Arc::new(Spies::default());
    let gateway = Gateway::new(Arc::new(TokenSessionResolver::new(tokens.clone())));
    let app = spy_page(gateway, identities.clone(), &spies);

    let response = app.oneshot(request(Method::GET, "/page", Some(token.as_str()), None)).await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/admin");
    assert_eq!(spies.total(), 0);
    assert_eq!(identities.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_lookup_during_resolution_fails_closed_on_pages_and_api() {
    let tokens = SessionTokens::new(SECRET);
    let identities = Arc::new(OfflineIdentities::default());
    let services = AppServices::new(tokens.clone(), identities.clone(), Arc::new(InMemoryProductStore::new()));
    let token = tokens.issue(SubjectId::new(), Role::Admin, chrono::Duration::minutes(5)).unwrap();
    let app = build_app(Arc::new(services));

    let page = app
        .clone()
        .oneshot(request(Method::GET, "/admin/dashboard", Some(token.as_str()), None))
        .await
        .unwrap();
    assert!(page.status().is_redirection());
    assert_eq!(page.headers().get(header::LOCATION).unwrap(), "/admin");
    assert_eq!(identities.lookups.load(Ordering::SeqCst), 1);

    let api = app
        .oneshot(request(Method::GET, "/api/admin/products", Some(token.as_str()), None))
        .await
        .unwrap();
    assert_eq!(api.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(identities.lookups.load(Ordering::SeqCst), 2);
}

