//! Sign-in, sign-out and session inspection.

use axum::{
    async_trait,
    extract::{Extension, Form, FromRequest, Request, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use landspice_auth::{AccountStatus, AuthFailure, GateDecision, Identity, Role, local_callback};
use landspice_core::{RestaurantId, UserId};

use crate::app::{AppState, errors};
use crate::context::CurrentSession;
use crate::cookies;

#[derive(Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
    #[serde(default, rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// Sign-in body: JSON from API clients, form-urlencoded from the sign-in page.
pub enum SignInBody {
    Json(SignInRequest),
    Form(SignInRequest),
}

impl SignInBody {
    fn into_parts(self) -> (SignInRequest, bool) {
        match self {
            SignInBody::Json(req) => (req, false),
            SignInBody::Form(req) => (req, true),
        }
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

#[async_trait]
impl<S> FromRequest<S> for SignInBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(body) = Form::<SignInRequest>::from_request(req, state)
                .await
                .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, e.body_text()))?;
            Ok(SignInBody::Form(body))
        } else {
            let Json(body) = Json::<SignInRequest>::from_request(req, state)
                .await
                .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, e.body_text()))?;
            Ok(SignInBody::Json(body))
        }
    }
}

/// Public view of an identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub status: AccountStatus,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<RestaurantId>,
}

impl From<&Identity> for SessionUser {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id,
            username: identity.username.clone(),
            role: identity.role,
            status: identity.status,
            display_name: identity.display_name.clone(),
            restaurant_id: identity.restaurant_id,
        }
    }
}

fn failure_status(failure: &AuthFailure) -> StatusCode {
    match failure {
        AuthFailure::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AuthFailure::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthFailure::AccountNotActive(_) => StatusCode::FORBIDDEN,
        AuthFailure::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// POST /api/auth/signin
///
/// JSON callers get a JSON answer; form posts are redirected to the
/// destination or to the error page.
pub async fn sign_in(State(state): State<AppState>, body: SignInBody) -> Response {
    let (req, from_form) = body.into_parts();

    let identity = match state.verifier.authenticate(&req.username, &req.password).await {
        Ok(identity) => identity,
        Err(failure) if from_form => {
            let decision = GateDecision::RedirectToError(failure.reason());
            return match state.routes.location(&decision) {
                Some(location) => Redirect::to(&location).into_response(),
                None => errors::internal_error(),
            };
        }
        Err(failure) => {
            return (
                failure_status(&failure),
                Json(serde_json::json!({
                    "error": failure.to_string(),
                    "reason": failure.reason().as_str(),
                })),
            )
                .into_response();
        }
    };

    let token = match state.sessions.issue(&identity) {
        Ok(token) => token,
        Err(e) => {
            state.reporter.internal_error("session_issue", &e);
            return errors::internal_error();
        }
    };

    let redirect = local_callback(req.callback_url.as_deref())
        .or_else(|| state.routes.landing_for(identity.role))
        .unwrap_or("/")
        .to_string();

    let cookie = cookies::session_cookie(&token, state.sessions.ttl().num_seconds(), state.secure_cookies);
    if from_form {
        return with_cookie(Redirect::to(&redirect).into_response(), &cookie);
    }
    let body = Json(serde_json::json!({
        "user": SessionUser::from(&identity),
        "redirect": redirect,
    }));
    with_cookie((StatusCode::OK, body).into_response(), &cookie)
}

/// POST /api/auth/signout
pub async fn sign_out(State(state): State<AppState>) -> Response {
    with_cookie(
        StatusCode::NO_CONTENT.into_response(),
        &cookies::clear_cookie(state.secure_cookies),
    )
}

/// GET /api/auth/session
pub async fn session(session: Option<Extension<CurrentSession>>) -> impl IntoResponse {
    match session {
        Some(Extension(session)) => Json(serde_json::json!({
            "authenticated": true,
            "user": SessionUser::from(session.identity()),
        })),
        None => Json(serde_json::json!({ "authenticated": false })),
    }
}
