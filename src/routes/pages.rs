//! Minimal page handlers.
//!
//! Presentation is rendered elsewhere; these handlers exist so the routing
//! gate has something to forward to. The app pages echo the identity
//! headers the gate attached, which is exactly the contract downstream
//! handlers rely on: trust the headers, skip the token decode.

use axum::{http::HeaderMap, response::IntoResponse, Json};
use serde_json::json;

use crate::gate::{HEADER_ORG_ID, HEADER_ROLE, HEADER_USER_ID};

fn forwarded(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn landing() -> impl IntoResponse {
    "fratapp"
}

pub async fn login() -> impl IntoResponse {
    "login"
}

pub async fn signup() -> impl IntoResponse {
    "signup"
}

pub async fn invite() -> impl IntoResponse {
    "invite"
}

pub async fn setup_chapter() -> impl IntoResponse {
    "setup-chapter"
}

/// Application home; identity arrives via gate-attached headers.
pub async fn app_home(headers: HeaderMap) -> impl IntoResponse {
    Json(json!({
        "userId": forwarded(&headers, HEADER_USER_ID),
        "orgId": forwarded(&headers, HEADER_ORG_ID),
        "role": forwarded(&headers, HEADER_ROLE),
    }))
}

/// Admin area home; only reachable for roles passing `can_access_admin`.
pub async fn admin_home(headers: HeaderMap) -> impl IntoResponse {
    Json(json!({
        "admin": true,
        "userId": forwarded(&headers, HEADER_USER_ID),
        "orgId": forwarded(&headers, HEADER_ORG_ID),
        "role": forwarded(&headers, HEADER_ROLE),
    }))
}
