//! Route gate: runs before every handler.
//!
//! Reads the session once, asks [`RouteTable::decide`], and either lets the
//! request through (with a [`CurrentSession`] extension) or answers with a
//! redirect for pages and a JSON status for `/api` paths.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use landspice_auth::{ErrorReason, GateDecision, Identity, SessionError, canonical_path};

use crate::app::{AppState, errors};
use crate::context::CurrentSession;
use crate::cookies::{self, TokenSource};

const API_PREFIX: &str = "/api";

fn is_api_path(path: &str) -> bool {
    path == API_PREFIX || path.starts_with("/api/")
}

/// Session identity, or `None` for any failure to read it.
fn read_session(state: &AppState, token: Option<&str>) -> Option<Identity> {
    match state.sessions.read(token) {
        Ok(identity) => Some(identity),
        Err(SessionError::Missing) => None,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unusable session token");
            None
        }
    }
}

pub async fn route_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = canonical_path(req.uri().path());
    let query = req.uri().query().map(str::to_string);

    let token = cookies::session_token(req.headers());
    let from_cookie = matches!(token, Some((_, TokenSource::Cookie)));
    let identity = read_session(&state, token.map(|(t, _)| t));

    let decision = state.routes.decide(&path, query.as_deref(), identity.as_ref());

    if decision != GateDecision::Allow {
        return deny(&state, &path, &decision, identity.as_ref());
    }

    let refresh = identity.as_ref().filter(|i| from_cookie && i.is_active()).cloned();
    if let Some(identity) = identity {
        req.extensions_mut().insert(CurrentSession::new(identity));
    }

    let mut response = next.run(req).await;

    if let Some(identity) = refresh {
        if !cookies::sets_session_cookie(response.headers()) {
            refresh_cookie(&state, &identity, &mut response);
        }
    }

    response
}

/// Re-issue the session cookie so the expiry slides with activity.
fn refresh_cookie(state: &AppState, identity: &Identity, response: &mut Response) {
    let token = match state.sessions.issue(identity) {
        Ok(token) => token,
        Err(e) => {
            state.reporter.internal_error("session_refresh", &e);
            return;
        }
    };
    let cookie = cookies::session_cookie(
        &token,
        state.sessions.ttl().num_seconds(),
        state.secure_cookies,
    );
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}

fn deny(state: &AppState, path: &str, decision: &GateDecision, identity: Option<&Identity>) -> Response {
    let reason = match decision {
        GateDecision::Allow => "allow",
        GateDecision::RedirectToSignIn { .. } => ErrorReason::SessionRequired.as_str(),
        GateDecision::RedirectToError(reason) => reason.as_str(),
        GateDecision::RedirectToUnauthorized => ErrorReason::AccessDenied.as_str(),
        GateDecision::RedirectTo(_) => "redirect",
    };
    let user_id = identity.map(|i| i.user_id);
    let is_alias = matches!(decision, GateDecision::RedirectTo(_));

    if !is_alias {
        state.reporter.access_denied(user_id, path, reason);
    }

    if is_api_path(path) && !is_alias {
        return match decision {
            GateDecision::RedirectToSignIn { .. } => errors::unauthenticated(),
            GateDecision::RedirectToError(ErrorReason::AccountDeactivated) => {
                errors::json_error(StatusCode::FORBIDDEN, "account is not active")
            }
            _ => errors::json_error(StatusCode::FORBIDDEN, "forbidden"),
        };
    }

    match state.routes.location(decision) {
        Some(location) => Redirect::temporary(&location).into_response(),
        None => errors::internal_error(),
    }
}
