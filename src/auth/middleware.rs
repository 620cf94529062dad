//! Axum extractors for authentication and rate limiting.
//!
//! API handlers under `/api` run outside the routing gate, so these
//! extractors verify the session cookie themselves instead of trusting
//! forwarded identity headers (which only the gate may set).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::clock::now_unix;
use crate::config::Config;
use crate::email::Mailer;
use crate::error::AppError;
use crate::models::Role;
use crate::session::{read_session_token, resolve, Resolution, TokenCodec};
use crate::storage::Store;
use crate::{auth::policy, session::Identity};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<Config>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// Authenticated session extractor.
///
/// Verifies the session cookie and yields the identity carried by the token.
/// Returns 401 Unauthorized if the cookie is missing or invalid.
pub struct AuthSession {
    pub user_id: String,
    pub role: Role,
    pub org_id: String,
}

impl From<Identity> for AuthSession {
    fn from(identity: Identity) -> Self {
        AuthSession {
            user_id: identity.user_id,
            role: identity.role,
            org_id: identity.org_id,
        }
    }
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = read_session_token(&state.config, &parts.headers);

        match resolve(&state.codec, raw.as_deref()) {
            Resolution::Authenticated { identity, .. } => Ok(identity.into()),
            Resolution::Anonymous => {
                Err(AppError::Unauthorized("Authentication required".to_string()))
            }
        }
    }
}

/// Session extractor requiring org-settings rights (exec or admin).
///
/// Returns 403 Forbidden for members and treasurers.
pub struct ExecSession(pub AuthSession);

impl FromRequestParts<AppState> for ExecSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;

        if !policy::can_manage_org_settings(session.role) {
            return Err(AppError::Forbidden("Exec access required".to_string()));
        }

        Ok(ExecSession(session))
    }
}

/// Admin-only session extractor.
pub struct AdminSession(pub AuthSession);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;

        if session.role != Role::Admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(AdminSession(session))
    }
}

/// Per-key window state: start, hit count, window length.
struct Window {
    start: u64,
    hits: u32,
    window_secs: u64,
}

/// Fixed-window in-process rate limiter keyed by arbitrary strings
/// (e.g. `"auth:127.0.0.1"`).
///
/// Lapsed windows are dropped by [`RateLimiter::evict_lapsed`], which the
/// periodic cleanup job calls so the map does not accumulate one entry per
/// client address forever.
#[derive(Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a hit against `key`. Returns true while under `max` hits per
    /// `window_secs` window.
    pub fn check(&self, key: &str, max: u32, window_secs: u64) -> bool {
        let now = now_unix();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        let entry = windows.entry(key.to_string()).or_insert(Window {
            start: now,
            hits: 0,
            window_secs,
        });
        if now.saturating_sub(entry.start) >= entry.window_secs {
            entry.start = now;
            entry.hits = 0;
        }
        entry.window_secs = window_secs;
        entry.hits += 1;
        entry.hits <= max
    }

    /// Drop every window that has already lapsed. Returns the number of
    /// entries removed.
    pub fn evict_lapsed(&self) -> usize {
        let now = now_unix();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let before = windows.len();
        windows.retain(|_, w| now.saturating_sub(w.start) < w.window_secs);
        before - windows.len()
    }
}
