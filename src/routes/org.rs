//! Chapter creation and org invite-code management.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use rand::Rng;
use serde_json::json;

use crate::auth::middleware::{AdminSession, AppState, ExecSession};
use crate::clock::now_unix;
use crate::error::AppError;
use crate::models::{
    CreateChapterRequest, CreateInviteCodeRequest, InviteCodeInfo, InviteCodeQuery,
    InviteCodeRecord, Role,
};
use crate::storage::StoreError;

/// Unambiguous code alphabet: no 0/O, no 1/I.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 8;

/// Collision retries before giving up on code generation.
const CODE_ATTEMPTS: usize = 5;

/// Generate an invite code like `INV-K7Q2M9XP` or `CH-...`.
fn generate_invite_code(prefix: &str) -> String {
    let mut rng = rand::rng();
    let mut code = String::with_capacity(prefix.len() + CODE_LEN);
    code.push_str(prefix);
    for _ in 0..CODE_LEN {
        let idx = rng.random_range(0..CODE_ALPHABET.len());
        code.push(CODE_ALPHABET[idx] as char);
    }
    code
}

/// Insert a fresh code, retrying on collision.
async fn create_code_with_retry(
    state: &AppState,
    prefix: &str,
    org_id: &str,
    role: Role,
    max_uses: u32,
    expires_at: Option<u64>,
) -> Result<String, AppError> {
    for _ in 0..CODE_ATTEMPTS {
        let code = generate_invite_code(prefix);
        match state
            .store
            .create_invite_code(InviteCodeRecord {
                code: code.clone(),
                org_id: org_id.to_string(),
                role,
                max_uses,
                uses: 0,
                expires_at,
                created_at: now_unix(),
            })
            .await
        {
            Ok(()) => return Ok(code),
            Err(StoreError::DuplicateInviteCode) => continue,
            Err(e) => return Err(AppError::Internal(format!("Store error: {}", e))),
        }
    }
    Err(AppError::Internal(
        "Failed to generate a unique invite code".to_string(),
    ))
}

/// POST /api/chapters: create an organization and its first admin invite
pub async fn create_chapter(
    State(state): State<AppState>,
    Json(req): Json<CreateChapterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = req.name.trim();
    if name.is_empty() || name.len() > 100 {
        return Err(AppError::BadRequest(
            "Chapter name must be 1-100 characters.".to_string(),
        ));
    }

    let org = state
        .store
        .create_org(name)
        .await
        .map_err(|e| AppError::Internal(format!("Store error: {}", e)))?;

    // Bootstrap code admits the founding admins.
    let code = create_code_with_retry(&state, "CH-", &org.id, Role::Admin, 10, None).await?;

    tracing::info!(action = "chapter_created", org_id = %org.id, name = %org.name, "Chapter created");

    Ok(Json(json!({
        "inviteCode": code,
        "redirectUrl": format!("/signup?code={}", urlencoding::encode(&code)),
    })))
}

/// GET /api/org/invite-codes: list codes for the caller's org
pub async fn list_invite_codes(
    ExecSession(session): ExecSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let codes = state
        .store
        .list_invite_codes(&session.org_id)
        .await
        .map_err(|e| AppError::Internal(format!("Store error: {}", e)))?;

    let infos: Vec<InviteCodeInfo> = codes.into_iter().map(InviteCodeInfo::from).collect();
    Ok(Json(json!({ "inviteCodes": infos })))
}

/// POST /api/org/invite-codes: create a code for the caller's org
pub async fn create_invite_code(
    ExecSession(session): ExecSession,
    State(state): State<AppState>,
    Json(req): Json<CreateInviteCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.max_uses < 1 || req.max_uses > 1000 {
        return Err(AppError::BadRequest("Invalid input.".to_string()));
    }
    if matches!(req.expires_at, Some(exp) if exp <= now_unix()) {
        return Err(AppError::BadRequest(
            "Expiry must be in the future.".to_string(),
        ));
    }

    let code = create_code_with_retry(
        &state,
        "INV-",
        &session.org_id,
        req.role,
        req.max_uses,
        req.expires_at,
    )
    .await?;

    tracing::info!(action = "invite_created", org_id = %session.org_id, code = %code, role = %req.role, "Invite code created");

    Ok(Json(json!({
        "code": code,
        "role": req.role,
        "maxUses": req.max_uses,
        "expiresAt": req.expires_at,
    })))
}

/// DELETE /api/org/invite-codes/revoke?code= : revoke a code (admin only)
pub async fn revoke_invite_code(
    AdminSession(session): AdminSession,
    State(state): State<AppState>,
    Query(query): Query<InviteCodeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let code = query
        .code
        .ok_or_else(|| AppError::BadRequest("Missing code.".to_string()))?;

    // Scoped to the caller's org: a code from another tenant reads as absent.
    let deleted = state
        .store
        .delete_invite_code(&session.org_id, &code)
        .await
        .map_err(|e| AppError::Internal(format!("Store error: {}", e)))?;

    if !deleted {
        return Err(AppError::NotFound("Not found.".to_string()));
    }

    tracing::info!(action = "invite_revoked", org_id = %session.org_id, code = %code, "Invite code revoked");

    Ok(Json(json!({ "ok": true })))
}
