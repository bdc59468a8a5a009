//! Server-rendered pages.
//!
//! Guarded pages run behind [`page_guard`](crate::middleware::page_guard), so
//! `CurrentUser` is always present when their handlers execute.

use std::sync::Arc;

use axum::{
    extract::Extension,
    response::{Html, IntoResponse, Response},
};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub async fn admin_sign_in_page() -> Html<String> {
    Html(sign_in_form("Admin sign in", "/admin/signin", "/admin/dashboard"))
}

pub async fn sign_in_page() -> Html<String> {
    Html(sign_in_form("Sign in", "/signin", "/account"))
}

pub async fn admin_dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Html<String>, Response> {
    let products = services.products.list().await.map_err(errors::store_error_to_response)?;
    let users = services.identities.list().await.map_err(errors::store_error_to_response)?;
    let listed = products.iter().filter(|p| p.is_listed()).count();

    let body = format!(
        "<h1>Dashboard</h1>\
         <p>Signed in as {name}</p>\
         <ul><li>Products: {total} ({listed} listed)</li><li>Users: {users}</li></ul>\
         <p><a href=\"/admin/products\">Manage products</a></p>",
        name = escape_html(&user.name),
        total = products.len(),
        users = users.len(),
    );
    Ok(Html(layout("Dashboard", &body)))
}

pub async fn admin_products(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let products = match services.products.list().await {
        Ok(products) => products,
        Err(e) => return errors::store_error_to_response(e),
    };

    let rows: String = products
        .iter()
        .map(|p| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.2} {}</td><td>{}</td></tr>",
                escape_html(&p.name),
                p.id,
                p.price_cents as f64 / 100.0,
                escape_html(&p.currency),
                p.status.as_str(),
            )
        })
        .collect();

    let body = format!(
        "<h1>Products</h1>\
         <table><thead><tr><th>Name</th><th>Id</th><th>Price</th><th>Status</th></tr></thead>\
         <tbody>{rows}</tbody></table>"
    );
    Html(layout("Products", &body)).into_response()
}

pub async fn account(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    let body = format!(
        "<h1>Your account</h1><dl><dt>Name</dt><dd>{}</dd><dt>Email</dt><dd>{}</dd><dt>Role</dt><dd>{}</dd></dl>\
         <form method=\"post\" action=\"/signout\"><button>Sign out</button></form>",
        escape_html(&user.name),
        escape_html(&user.email),
        user.role,
    );
    Html(layout("Account", &body))
}

fn sign_in_form(title: &str, action: &str, next: &str) -> String {
    let body = format!(
        r#"<h1>{title}</h1>
<form id="signin" data-action="{action}" data-next="{next}">
  <label>Email <input name="email" type="email" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Sign in</button>
  <p id="error" hidden>Unauthorized</p>
</form>
<script>
document.getElementById("signin").addEventListener("submit", async (e) => {{
  e.preventDefault();
  const form = e.target;
  const res = await fetch(form.dataset.action, {{
    method: "POST",
    headers: {{ "content-type": "application/json" }},
    body: JSON.stringify({{ email: form.email.value, password: form.password.value }}),
  }});
  if (res.ok) {{ window.location = form.dataset.next; }} else {{ document.getElementById("error").hidden = false; }}
}});
</script>"#
    );
    layout(title, &body)
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{body}</body></html>",
        escape_html(title)
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
