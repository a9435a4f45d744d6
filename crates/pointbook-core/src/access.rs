//! Access capability
//!
//! Deciding who the caller is happens outside this crate. Given a resolved
//! caller, an [`AccessPolicy`] answers whether they may see a member's points.

use crate::member::{Member, MemberId, Permission};

pub trait AccessPolicy {
    fn can_view_points(&self, caller: &Member, target: &MemberId) -> bool;
}

/// Members may view their own points; officers may view anyone's
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionPolicy;

impl AccessPolicy for PermissionPolicy {
    fn can_view_points(&self, caller: &Member, target: &MemberId) -> bool {
        &caller.id == target || caller.has_permission(Permission::Officer)
    }
}

impl<F> AccessPolicy for F
where
    F: Fn(&Member, &MemberId) -> bool,
{
    fn can_view_points(&self, caller: &Member, target: &MemberId) -> bool {
        self(caller, target)
    }
}
