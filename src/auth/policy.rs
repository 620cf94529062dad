//! Role-based permissions for org-level access.
//!
//! member: upload, view own receipts
//! treasurer: view all receipts, approve/reject/mark paid
//! exec: treasurer + org settings and invite codes
//! admin: same as exec
//!
//! Pure predicates over [`Role`]; no request context, no side effects.

use crate::models::Role;

/// Role hierarchy comparison: member < treasurer < exec < admin.
pub fn is_at_least(role: Role, threshold: Role) -> bool {
    role >= threshold
}

pub fn can_view_all_receipts(role: Role) -> bool {
    is_at_least(role, Role::Treasurer)
}

pub fn can_approve_receipts(role: Role) -> bool {
    is_at_least(role, Role::Treasurer)
}

/// Narrower than approval rights: not every approver may edit chapter-wide
/// settings or invite codes.
pub fn can_manage_org_settings(role: Role) -> bool {
    is_at_least(role, Role::Exec)
}

pub fn can_access_admin(role: Role) -> bool {
    can_approve_receipts(role)
}
