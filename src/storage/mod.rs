//! Backing-store interface for users, orgs, invite codes, and reset tokens.
//!
//! The relational store is an external collaborator; this trait is the exact
//! surface the session and onboarding core needs from it. Compound
//! operations (`signup_with_invite`, `consume_reset_token`) are specified as
//! single atomic units: implementations must make them all-or-nothing so an
//! invite code's last use cannot be double-consumed and a reset token cannot
//! be spent twice.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::models::{
    InviteCodeRecord, NewUser, OrgRecord, ResetTokenRecord, Role, UserRecord,
};

/// Store-level failures, distinct internally for logging even where the API
/// boundary reports them with one non-revealing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("invite code does not exist")]
    InvalidInviteCode,

    #[error("invite code has expired")]
    ExpiredInviteCode,

    #[error("invite code has no remaining uses")]
    ExhaustedInviteCode,

    #[error("email already registered")]
    EmailExists,

    #[error("invite code already exists")]
    DuplicateInviteCode,

    #[error("reset token unknown, expired, or already consumed")]
    ResetTokenInvalid,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Organizations
    async fn create_org(&self, name: &str) -> Result<OrgRecord, StoreError>;
    async fn find_org(&self, org_id: &str) -> Result<Option<OrgRecord>, StoreError>;

    // Users
    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Consume one use of `code` and create the user it admits, atomically.
    ///
    /// Validates the code (exists, unexpired, uses < max_uses) and rejects a
    /// duplicate email, then creates the user with the code's org and role
    /// and increments the use counter. With max_uses - uses == 1 remaining,
    /// exactly one of any number of concurrent callers succeeds.
    async fn signup_with_invite(
        &self,
        new_user: NewUser,
        code: &str,
        now: u64,
    ) -> Result<UserRecord, StoreError>;

    // Invite codes
    async fn invite_code(&self, code: &str) -> Result<Option<InviteCodeRecord>, StoreError>;
    async fn create_invite_code(&self, record: InviteCodeRecord) -> Result<(), StoreError>;
    async fn list_invite_codes(&self, org_id: &str) -> Result<Vec<InviteCodeRecord>, StoreError>;

    /// Revoke a code belonging to `org_id`. Returns false when no such code
    /// exists (revoking twice is not an error).
    async fn delete_invite_code(&self, org_id: &str, code: &str) -> Result<bool, StoreError>;

    // Password reset tokens
    async fn create_reset_token(&self, record: ResetTokenRecord) -> Result<(), StoreError>;
    async fn count_recent_reset_tokens(
        &self,
        user_id: &str,
        since: u64,
    ) -> Result<usize, StoreError>;

    /// Delete reset tokens whose expiry has passed. Returns how many were
    /// removed. Tokens die either here or in `consume_reset_token`, never
    /// linger.
    async fn purge_expired_reset_tokens(&self, now: u64) -> Result<usize, StoreError>;

    /// Spend a reset token and update the password it authorizes, atomically.
    ///
    /// Looks up by token hash, requires `expires_at > now`, writes the new
    /// password hash, and deletes the token, all-or-nothing. A second
    /// consumption of the same token fails with `ResetTokenInvalid`.
    async fn consume_reset_token(
        &self,
        token_hash: &str,
        now: u64,
        new_password_hash: &str,
    ) -> Result<UserRecord, StoreError>;
}

impl NewUser {
    /// Finish a signup: the store supplies the id plus the org and role the
    /// invite code granted.
    pub fn into_record(self, id: String, org_id: String, role: Role, now: u64) -> UserRecord {
        UserRecord {
            id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            org_id,
            role,
            created_at: now,
        }
    }
}
