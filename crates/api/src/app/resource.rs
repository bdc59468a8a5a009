//! Single-route protected resources.
//!
//! A resource is one path with GET/POST/PUT/PATCH/DELETE handlers. The guard
//! is attached to the assembled method router rather than to each handler, so
//! a verb cannot be registered without it.

use axum::handler::Handler;
use axum::routing::{MethodRouter, get};

use crate::middleware::{ApiGuard, PageGuard, api_guard, page_guard};

/// Handlers for the five verbs of a resource.
pub struct Crud<L, C, R, U, D> {
    pub list: L,
    pub create: C,
    pub replace: R,
    pub update: U,
    pub delete: D,
}

impl<L, C, R, U, D> Crud<L, C, R, U, D> {
    pub fn into_router<TL, TC, TR, TU, TD>(self, guard: ApiGuard) -> MethodRouter
    where
        L: Handler<TL, ()>,
        C: Handler<TC, ()>,
        R: Handler<TR, ()>,
        U: Handler<TU, ()>,
        D: Handler<TD, ()>,
        TL: 'static,
        TC: 'static,
        TR: 'static,
        TU: 'static,
        TD: 'static,
    {
        guarded(
            get(self.list)
                .post(self.create)
                .put(self.replace)
                .patch(self.update)
                .delete(self.delete),
            guard,
        )
    }
}

/// Put every verb of `routes` behind the API guard.
pub fn guarded(routes: MethodRouter, guard: ApiGuard) -> MethodRouter {
    routes.route_layer(axum::middleware::from_fn_with_state(guard, api_guard))
}

/// Put every verb of `routes` behind a page guard.
pub fn guarded_page(routes: MethodRouter, guard: PageGuard) -> MethodRouter {
    routes.route_layer(axum::middleware::from_fn_with_state(guard, page_guard))
}
