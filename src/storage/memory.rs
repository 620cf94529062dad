//! In-memory store.
//!
//! All maps live behind one mutex; the compound operations hold the lock for
//! their whole read-check-write sequence, which is what makes
//! `signup_with_invite` and `consume_reset_token` atomic. No await happens
//! while the lock is held.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::clock::now_unix;
use crate::models::{InviteCodeRecord, NewUser, OrgRecord, ResetTokenRecord, UserRecord};
use crate::storage::{Store, StoreError};

#[derive(Default)]
struct Inner {
    orgs: HashMap<String, OrgRecord>,
    users: HashMap<String, UserRecord>,
    /// email -> user id
    emails: HashMap<String, String>,
    invite_codes: HashMap<String, InviteCodeRecord>,
    /// token hash -> record
    reset_tokens: HashMap<String, ResetTokenRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Recover from poison: the maps are still consistent because every
        // section is a plain insert/remove sequence.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_org(&self, name: &str) -> Result<OrgRecord, StoreError> {
        let org = OrgRecord {
            id: nanoid::nanoid!(12),
            name: name.to_string(),
            created_at: now_unix(),
        };

        self.lock().orgs.insert(org.id.clone(), org.clone());
        Ok(org)
    }

    async fn find_org(&self, org_id: &str) -> Result<Option<OrgRecord>, StoreError> {
        Ok(self.lock().orgs.get(org_id).cloned())
    }

    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .emails
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn signup_with_invite(
        &self,
        new_user: NewUser,
        code: &str,
        now: u64,
    ) -> Result<UserRecord, StoreError> {
        let mut inner = self.lock();

        // Validate the code under the lock so the uses check and the
        // increment are one unit.
        let invite = inner
            .invite_codes
            .get(code)
            .ok_or(StoreError::InvalidInviteCode)?;

        if invite.is_expired(now) {
            return Err(StoreError::ExpiredInviteCode);
        }
        if invite.is_exhausted() {
            return Err(StoreError::ExhaustedInviteCode);
        }

        if inner.emails.contains_key(&new_user.email) {
            return Err(StoreError::EmailExists);
        }

        let (org_id, role) = (invite.org_id.clone(), invite.role);

        let user = new_user.into_record(nanoid::nanoid!(12), org_id, role, now);
        inner.emails.insert(user.email.clone(), user.id.clone());
        inner.users.insert(user.id.clone(), user.clone());

        // Checked above; the entry cannot have vanished under the lock.
        if let Some(invite) = inner.invite_codes.get_mut(code) {
            invite.uses += 1;
        }

        Ok(user)
    }

    async fn invite_code(&self, code: &str) -> Result<Option<InviteCodeRecord>, StoreError> {
        Ok(self.lock().invite_codes.get(code).cloned())
    }

    async fn create_invite_code(&self, record: InviteCodeRecord) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.invite_codes.contains_key(&record.code) {
            return Err(StoreError::DuplicateInviteCode);
        }
        inner.invite_codes.insert(record.code.clone(), record);
        Ok(())
    }

    async fn list_invite_codes(&self, org_id: &str) -> Result<Vec<InviteCodeRecord>, StoreError> {
        let inner = self.lock();
        let mut codes: Vec<InviteCodeRecord> = inner
            .invite_codes
            .values()
            .filter(|c| c.org_id == org_id)
            .cloned()
            .collect();
        codes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(codes)
    }

    async fn delete_invite_code(&self, org_id: &str, code: &str) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        match inner.invite_codes.get(code) {
            Some(record) if record.org_id == org_id => {
                inner.invite_codes.remove(code);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn create_reset_token(&self, record: ResetTokenRecord) -> Result<(), StoreError> {
        self.lock()
            .reset_tokens
            .insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn count_recent_reset_tokens(
        &self,
        user_id: &str,
        since: u64,
    ) -> Result<usize, StoreError> {
        let inner = self.lock();
        Ok(inner
            .reset_tokens
            .values()
            .filter(|t| t.user_id == user_id && t.created_at >= since)
            .count())
    }

    async fn purge_expired_reset_tokens(&self, now: u64) -> Result<usize, StoreError> {
        let mut inner = self.lock();
        let before = inner.reset_tokens.len();
        inner.reset_tokens.retain(|_, t| t.expires_at > now);
        Ok(before - inner.reset_tokens.len())
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        now: u64,
        new_password_hash: &str,
    ) -> Result<UserRecord, StoreError> {
        let mut inner = self.lock();

        let token = inner
            .reset_tokens
            .get(token_hash)
            .ok_or(StoreError::ResetTokenInvalid)?;

        if token.expires_at <= now {
            return Err(StoreError::ResetTokenInvalid);
        }

        let user_id = token.user_id.clone();
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::ResetTokenInvalid)?;

        // Password update and token deletion happen under the same lock:
        // all-or-nothing, and the token is gone before anyone else can see it.
        user.password_hash = new_password_hash.to_string();
        let user = user.clone();
        inner.reset_tokens.remove(token_hash);

        Ok(user)
    }
}
