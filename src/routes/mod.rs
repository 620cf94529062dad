//! Route handlers and router assembly.

pub mod auth;
pub mod org;
pub mod pages;

use crate::auth::middleware::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

/// Build the application router: page routes (gated upstream by
/// `gate::routing_gate`) plus the JSON API.
pub fn router() -> Router<AppState> {
    Router::new()
        // Pages; the routing gate classifies and guards these
        .route("/", get(pages::landing))
        .route("/login", get(pages::login))
        .route("/signup", get(pages::signup))
        .route("/invite", get(pages::invite))
        .route("/setup-chapter", get(pages::setup_chapter))
        .route("/app", get(pages::app_home))
        .route("/app/receipts", get(pages::app_home))
        .route("/app/admin", get(pages::admin_home))
        .route("/app/admin/org", get(pages::admin_home))
        // Auth endpoints
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/logout", get(auth::logout).post(auth::logout))
        .route("/api/auth/invite", get(auth::validate_invite))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        // Chapter + org endpoints
        .route("/api/chapters", post(org::create_chapter))
        .route(
            "/api/org/invite-codes",
            get(org::list_invite_codes).post(org::create_invite_code),
        )
        .route("/api/org/invite-codes/revoke", delete(org::revoke_invite_code))
}
