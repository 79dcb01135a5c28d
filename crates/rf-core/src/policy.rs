//! # Authorization Policy
//!
//! The owner-or-admin rule gating every mutating operation. Lookups happen
//! before these checks, so a missing resource reports NotFound rather
//! than Forbidden.

use uuid::Uuid;
use crate::error::{AppError, Result};
use crate::models::Actor;

/// True iff the actor owns the resource or carries the admin claim.
pub fn can_mutate(actor: &Actor, owner_id: Uuid) -> bool {
    actor.id == owner_id || actor.is_admin
}

/// Owner-or-admin gate used for posts.
pub fn authorize_mutation(actor: &Actor, owner_id: Uuid) -> Result<()> {
    if can_mutate(actor, owner_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "only the owner or an admin may modify this resource".to_string(),
        ))
    }
}

/// Strict self-only gate used for user accounts: no admin override for
/// profile update/delete.
pub fn authorize_self(actor: &Actor, user_id: Uuid) -> Result<()> {
    if actor.id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "accounts are self-service only".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(is_admin: bool) -> Actor {
        Actor { id: Uuid::now_v7(), is_admin }
    }

    #[test]
    fn owner_may_mutate() {
        let a = actor(false);
        assert!(can_mutate(&a, a.id));
        assert!(authorize_mutation(&a, a.id).is_ok());
    }

    #[test]
    fn admin_may_mutate_foreign_resource() {
        let a = actor(true);
        assert!(can_mutate(&a, Uuid::now_v7()));
    }

    #[test]
    fn stranger_is_forbidden() {
        let a = actor(false);
        let err = authorize_mutation(&a, Uuid::now_v7()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn admin_gets_no_override_on_accounts() {
        let a = actor(true);
        let err = authorize_self(&a, Uuid::now_v7()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
