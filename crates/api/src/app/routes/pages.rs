//! Minimal server-rendered pages the gate redirects to.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use landspice_auth::{Role, local_callback};

use crate::app::AppState;
use crate::context::CurrentSession;

#[derive(Debug, Deserialize)]
pub struct SignInPageQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorPageQuery {
    pub reason: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/auth/signin", get(sign_in_page))
        .route("/auth/error", get(error_page))
        .route("/unauthorized", get(unauthorized_page))
        .route("/dashboard", get(dashboard_alias))
        .route("/:area/dashboard", get(dashboard))
        .fallback(not_found)
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><title>{title} | LandSpice</title></head><body><h1>{title}</h1>{body}</body></html>"
    ))
}

/// Minimal escaping for text placed into HTML.
fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub async fn home() -> Html<String> {
    page("Welcome", r#"<p><a href="/dashboard">Go to your dashboard</a></p>"#)
}

pub async fn sign_in_page(Query(q): Query<SignInPageQuery>) -> Html<String> {
    let callback = local_callback(q.callback_url.as_deref()).unwrap_or("/dashboard");
    page(
        "Sign in",
        &format!(
            r#"<form method="post" action="/api/auth/signin"><input name="username"><input name="password" type="password"><input type="hidden" name="callbackUrl" value="{}"><button>Sign in</button></form>"#,
            escape(callback)
        ),
    )
}

fn reason_text(reason: &str) -> &'static str {
    match reason {
        "AccountDeactivated" => "Your account is not active. Contact an administrator.",
        "CredentialsSignin" => "Invalid username or password.",
        "AccessDenied" => "You do not have access to that page.",
        "SessionRequired" => "Please sign in to continue.",
        _ => "Sign-in is currently unavailable.",
    }
}

pub async fn error_page(Query(q): Query<ErrorPageQuery>) -> Response {
    let text = reason_text(q.reason.as_deref().unwrap_or(""));
    (StatusCode::OK, page("Sign-in problem", &format!("<p>{text}</p>"))).into_response()
}

pub async fn unauthorized_page() -> Response {
    (
        StatusCode::FORBIDDEN,
        page("Unauthorized", "<p>You do not have access to that page.</p>"),
    )
        .into_response()
}

/// Reached only when the gate found no landing page for the role.
pub async fn dashboard_alias() -> Response {
    (StatusCode::NOT_FOUND, page("Not found", "<p>No dashboard for this account.</p>")).into_response()
}

/// GET /:area/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Path(area): Path<String>,
) -> Response {
    let path = format!("/{area}/dashboard");
    let known = Role::ALL
        .iter()
        .any(|role| state.routes.landing_for(*role) == Some(path.as_str()));
    if !known {
        return not_found().await;
    }

    let identity = session.identity();
    if !state.routes.role_may_access(identity.role, &path) {
        return unauthorized_page().await;
    }

    page(
        "Dashboard",
        &format!(
            "<p>Signed in as {} ({})</p>",
            escape(&identity.display_name),
            identity.role
        ),
    )
    .into_response()
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, page("Not found", "<p>Nothing here.</p>")).into_response()
}
