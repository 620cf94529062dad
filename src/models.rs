//! Request, response, and storage models.
//!
//! All models use serde for serialization/deserialization. Stored records
//! describe the shape the backing store persists; request/response models
//! are the JSON boundary of the API handlers.

use serde::{Deserialize, Serialize};

// ============================================================================
// Roles
// ============================================================================

/// Organization role, ordered by privilege.
///
/// The derived `Ord` is the role hierarchy: member < treasurer < exec < admin.
/// `auth::policy` builds every capability check on this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Treasurer,
    Exec,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Treasurer => "treasurer",
            Role::Exec => "exec",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "treasurer" => Ok(Role::Treasurer),
            "exec" => Ok(Role::Exec),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// ============================================================================
// Auth Models
// ============================================================================

/// Request to log in with email and password.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request to sign up with an invite code.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Request to start a password reset.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request to complete a password reset.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Query string for public invite-code validation.
#[derive(Debug, Deserialize)]
pub struct InviteCodeQuery {
    pub code: Option<String>,
}

// ============================================================================
// Org Models
// ============================================================================

/// Request to create a chapter (organization).
#[derive(Debug, Deserialize)]
pub struct CreateChapterRequest {
    pub name: String,
}

/// Request to create an invite code for the caller's org.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteCodeRequest {
    pub role: Role,
    #[serde(default = "default_max_uses")]
    pub max_uses: u32,
    /// Unix-seconds expiry; omitted means the code never expires.
    pub expires_at: Option<u64>,
}

fn default_max_uses() -> u32 {
    50
}

/// Invite code as returned to org admins.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCodeInfo {
    pub code: String,
    pub role: Role,
    pub max_uses: u32,
    pub uses: u32,
    pub expires_at: Option<u64>,
    pub created_at: u64,
}

impl From<InviteCodeRecord> for InviteCodeInfo {
    fn from(rec: InviteCodeRecord) -> Self {
        InviteCodeInfo {
            code: rec.code,
            role: rec.role,
            max_uses: rec.max_uses,
            uses: rec.uses,
            expires_at: rec.expires_at,
            created_at: rec.created_at,
        }
    }
}

// ============================================================================
// Storage Records
// ============================================================================

/// Organization (chapter): the tenant boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgRecord {
    pub id: String,
    pub name: String,
    pub created_at: u64,
}

/// User with their org membership and role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub org_id: String,
    pub role: Role,
    pub created_at: u64,
}

/// Fields needed to create a user from a signup.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Invite code granting `role` within `org_id` on signup.
///
/// `uses <= max_uses` always holds; the store increments `uses`
/// transactionally with user creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCodeRecord {
    pub code: String,
    pub org_id: String,
    pub role: Role,
    pub max_uses: u32,
    pub uses: u32,
    pub expires_at: Option<u64>,
    pub created_at: u64,
}

impl InviteCodeRecord {
    pub fn is_expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(exp) if exp < now)
    }

    pub fn is_exhausted(&self) -> bool {
        self.uses >= self.max_uses
    }
}

/// Password-reset token record. Only the SHA-256 hash of the raw token is
/// persisted; the raw token travels once, in the emailed reset link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetTokenRecord {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: u64,
    pub created_at: u64,
}
