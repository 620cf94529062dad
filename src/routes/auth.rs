//! Auth API endpoints: login, signup, logout, invite validation, and the
//! password-reset flow.

use axum::{
    extract::{ConnectInfo, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;

use crate::auth::middleware::AppState;
use crate::auth::{generate_reset_token, hash_password, hash_reset_token, verify_password};
use crate::clock::now_unix;
use crate::error::AppError;
use crate::models::{
    ForgotPasswordRequest, InviteCodeQuery, LoginRequest, NewUser, ResetPasswordRequest,
    ResetTokenRecord, Role, SignupRequest,
};
use crate::session::{apply_cookie, clear_session_cookie, session_cookie};

/// The forgot-password endpoint must answer identically whether or not the
/// account exists (and when rate-limited), so nothing discloses membership.
const RESET_NEUTRAL_MESSAGE: &str = "If that email exists, we sent a reset link.";

/// Check the per-IP auth rate limit, logging a hashed IP on rejection.
fn check_auth_rate_limit(
    state: &AppState,
    addr: &SocketAddr,
    endpoint: &'static str,
) -> Result<(), AppError> {
    let key = format!("auth:{}", addr.ip());
    let allowed = state
        .rate_limiter
        .check(&key, state.config.rate_limit_auth_per_min, 60);

    if !allowed {
        let mut hasher = std::hash::DefaultHasher::new();
        addr.ip().hash(&mut hasher);
        let ip_hash = format!("{:x}", hasher.finish());
        tracing::warn!(action = "rate_limited", endpoint = endpoint, ip_hash = %ip_hash, "Rate limit exceeded");
        return Err(AppError::RateLimited);
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if email.len() < 3 || !email.contains('@') {
        return Err(AppError::BadRequest("Invalid input.".to_string()));
    }
    Ok(email)
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters.".to_string(),
        ));
    }
    Ok(())
}

/// Mint a session token for `user` and build a JSON response that sets the
/// session cookie.
fn session_response(
    state: &AppState,
    user_id: &str,
    role: Role,
    org_id: &str,
    body: serde_json::Value,
) -> Result<Response, AppError> {
    let token = state
        .codec
        .encode(user_id, role, org_id)
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

    let mut response = Json(body).into_response();
    apply_cookie(&mut response, &session_cookie(&state.config, token));
    Ok(response)
}

/// POST /api/auth/login: verify credentials, set session cookie
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    check_auth_rate_limit(&state, &addr, "auth/login")?;

    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;

    // Unknown email and wrong password produce the same answer.
    let user = state
        .store
        .find_user_by_email(&email)
        .await
        .map_err(|e| AppError::Internal(format!("Store error: {}", e)))?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials.".to_string()))?;

    let valid = verify_password(&req.password, &user.password_hash)?;
    if !valid {
        tracing::warn!(action = "login_failed", user_id = %user.id, "Invalid password");
        return Err(AppError::Unauthorized("Invalid credentials.".to_string()));
    }

    tracing::info!(action = "login", user_id = %user.id, org_id = %user.org_id, role = %user.role, "User logged in");

    session_response(&state, &user.id, user.role, &user.org_id, json!({ "ok": true }))
}

/// POST /api/auth/signup: consume an invite code, create the user, log in
pub async fn signup(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<SignupRequest>,
) -> Result<Response, AppError> {
    check_auth_rate_limit(&state, &addr, "auth/signup")?;

    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;

    let first_name = req.first_name.trim().to_string();
    let last_name = req.last_name.trim().to_string();
    if first_name.is_empty() || last_name.is_empty() || req.code.len() < 3 {
        return Err(AppError::BadRequest("Invalid input.".to_string()));
    }

    let new_user = NewUser {
        email,
        password_hash: hash_password(&req.password)?,
        first_name,
        last_name,
    };

    // Code validation, email uniqueness, user creation, and the use-counter
    // increment are one transactional unit in the store.
    let user = state
        .store
        .signup_with_invite(new_user, &req.code, now_unix())
        .await
        .map_err(|e| {
            tracing::info!(action = "signup_rejected", code = %req.code, error = %e, "Signup rejected");
            AppError::from(e)
        })?;

    tracing::info!(action = "signup", user_id = %user.id, org_id = %user.org_id, role = %user.role, "User signed up via invite code");

    session_response(
        &state,
        &user.id,
        user.role,
        &user.org_id,
        json!({ "ok": true, "redirectUrl": "/app" }),
    )
}

/// GET|POST /api/auth/logout: clear the session cookie, back to login
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut response = Redirect::to("/login").into_response();
    apply_cookie(&mut response, &clear_session_cookie(&state.config));
    response
}

/// GET /api/auth/invite?code= : public pre-signup invite validation
pub async fn validate_invite(
    State(state): State<AppState>,
    Query(query): Query<InviteCodeQuery>,
) -> Result<Response, AppError> {
    let Some(code) = query.code else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "valid": false, "error": "Missing code." })),
        )
            .into_response());
    };

    let invite = state
        .store
        .invite_code(&code)
        .await
        .map_err(|e| AppError::Internal(format!("Store error: {}", e)))?;

    let Some(invite) = invite else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "valid": false, "error": "Invalid code." })),
        )
            .into_response());
    };

    if invite.is_expired(now_unix()) {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "valid": false, "error": "Expired code." })),
        )
            .into_response());
    }

    if invite.is_exhausted() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "valid": false, "error": "No remaining uses." })),
        )
            .into_response());
    }

    let org = state
        .store
        .find_org(&invite.org_id)
        .await
        .map_err(|e| AppError::Internal(format!("Store error: {}", e)))?
        .ok_or_else(|| AppError::Internal(format!("Invite {} references missing org", code)))?;

    Ok(Json(json!({
        "valid": true,
        "orgName": org.name,
        "role": invite.role,
        "orgId": invite.org_id,
    }))
    .into_response())
}

/// POST /api/auth/forgot-password: issue a reset link (rate-limited,
/// non-disclosing)
pub async fn forgot_password(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Response, AppError> {
    check_auth_rate_limit(&state, &addr, "auth/forgot-password")?;

    let email = validate_email(&req.email)?;
    let neutral = Json(json!({ "message": RESET_NEUTRAL_MESSAGE })).into_response();

    let Some(user) = state
        .store
        .find_user_by_email(&email)
        .await
        .map_err(|e| AppError::Internal(format!("Store error: {}", e)))?
    else {
        return Ok(neutral);
    };

    // Per-account issuance cap within the rolling window; over the cap the
    // answer is indistinguishable from success.
    let now = now_unix();
    let since = now.saturating_sub(state.config.reset_rate_limit_window_secs);
    let recent = state
        .store
        .count_recent_reset_tokens(&user.id, since)
        .await
        .map_err(|e| AppError::Internal(format!("Store error: {}", e)))?;

    if recent >= state.config.reset_rate_limit_max as usize {
        tracing::warn!(action = "reset_rate_limited", user_id = %user.id, "Reset issuance capped");
        return Ok(neutral);
    }

    let raw_token = generate_reset_token();
    state
        .store
        .create_reset_token(ResetTokenRecord {
            token_hash: hash_reset_token(&raw_token),
            user_id: user.id.clone(),
            expires_at: now + state.config.reset_token_ttl_secs,
            created_at: now,
        })
        .await
        .map_err(|e| AppError::Internal(format!("Store error: {}", e)))?;

    let reset_url = format!("{}/reset-password?token={}", state.config.base_url, raw_token);
    let sent = state.mailer.send_password_reset(&email, &reset_url).await;
    if !sent {
        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to send email. Please try again later." })),
        )
            .into_response());
    }

    tracing::info!(action = "reset_issued", user_id = %user.id, "Password reset link issued");
    Ok(neutral)
}

/// POST /api/auth/reset-password: spend the token, set the new password,
/// log the user in
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Response, AppError> {
    if req.token.is_empty() {
        return Err(AppError::BadRequest("Invalid input.".to_string()));
    }
    validate_password(&req.password)?;

    let new_hash = hash_password(&req.password)?;

    // Verify-and-invalidate is one store transaction: the token cannot be
    // spent twice and cannot survive a crash between the two steps.
    let user = state
        .store
        .consume_reset_token(&hash_reset_token(&req.token), now_unix(), &new_hash)
        .await
        .map_err(|e| {
            tracing::info!(action = "reset_rejected", error = %e, "Reset token rejected");
            AppError::from(e)
        })?;

    tracing::info!(action = "password_reset", user_id = %user.id, "Password reset completed");

    session_response(
        &state,
        &user.id,
        user.role,
        &user.org_id,
        json!({ "ok": true, "redirectUrl": "/app" }),
    )
}
