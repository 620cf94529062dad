//! Routing gate: the per-request interception point in front of the app.
//!
//! Classifies the path against a static table, resolves the session cookie,
//! and either forwards the request (identity attached as trusted headers,
//! renewal cookie applied) or redirects. The gate performs at most one
//! token decode and one re-encode per request and never touches the store;
//! role and org id ride in the token itself. Its only outcomes are a
//! forward or a 3xx; auth failures never surface here as error bodies.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::middleware::AppState;
use crate::auth::policy;
use crate::session::{
    apply_renewal, read_session_token, resolve, Identity, Resolution,
};

/// Paths reachable without a session. Exact matches only; everything under
/// the app prefix is protected, everything else passes through untouched.
const PUBLIC_PATHS: &[&str] = &["/", "/login", "/signup", "/invite", "/setup-chapter"];

const PROTECTED_PREFIX: &str = "/app";
const ADMIN_PREFIX: &str = "/app/admin";

/// Identity headers the gate forwards to downstream handlers. Trusted only
/// because the gate strips any client-supplied values before setting them.
pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_ORG_ID: &str = "x-org-id";
pub const HEADER_ROLE: &str = "x-role";

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

fn is_protected(path: &str) -> bool {
    path == PROTECTED_PREFIX || path.starts_with("/app/")
}

fn is_admin_area(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with("/app/admin/")
}

fn login_redirect(original_path: &str) -> Response {
    let next = urlencoding::encode(original_path);
    Redirect::to(&format!("/login?next={}", next)).into_response()
}

fn app_home_redirect() -> Response {
    Redirect::to(PROTECTED_PREFIX).into_response()
}

/// Replace any inbound identity headers with the gate-verified values.
fn attach_identity(request: &mut Request, identity: &Identity) {
    let headers = request.headers_mut();
    for name in [HEADER_USER_ID, HEADER_ORG_ID, HEADER_ROLE] {
        headers.remove(name);
    }

    let pairs = [
        (HEADER_USER_ID, identity.user_id.as_str()),
        (HEADER_ORG_ID, identity.org_id.as_str()),
        (HEADER_ROLE, identity.role.as_str()),
    ];
    for (name, value) in pairs {
        if let (Ok(name), Ok(value)) = (
            name.parse::<HeaderName>(),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
}

/// Axum middleware implementing the gate state machine.
pub async fn routing_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if is_public(&path) {
        let raw = read_session_token(&state.config, request.headers());
        return match resolve(&state.codec, raw.as_deref()) {
            // A logged-in user never sees login/signup; send them home and
            // still honor the renewal side effect.
            Resolution::Authenticated { renewed, .. } => {
                let mut response = app_home_redirect();
                apply_renewal(&mut response, &state.config, renewed);
                response
            }
            Resolution::Anonymous => next.run(request).await,
        };
    }

    if is_protected(&path) {
        let raw = read_session_token(&state.config, request.headers());
        return match resolve(&state.codec, raw.as_deref()) {
            Resolution::Anonymous => login_redirect(&path),
            Resolution::Authenticated { identity, renewed } => {
                if is_admin_area(&path) && !policy::can_access_admin(identity.role) {
                    // Denial is a silent redirect to a safe default, not an
                    // error page.
                    tracing::debug!(user_id = %identity.user_id, role = %identity.role, path = %path, "admin area denied");
                    return app_home_redirect();
                }

                attach_identity(&mut request, &identity);
                let mut response = next.run(request).await;
                apply_renewal(&mut response, &state.config, renewed);
                response
            }
        };
    }

    // Everything else (API, static assets) authorizes downstream.
    next.run(request).await
}
