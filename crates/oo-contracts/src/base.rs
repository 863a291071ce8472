//! Base contract system

use oo_core::error::{OoError, ValidationErrors};
use oo_core::result::OoResult;
use oo_core::traits::Id;
use oo_core::types::Role;
use validator::Validate;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// The acting user, passed explicitly into every service call
pub trait UserContext: Send + Sync {
    fn id(&self) -> Id;
    fn display_name(&self) -> &str;
    fn role(&self) -> Role;

    fn is_admin(&self) -> bool {
        self.role().is_admin()
    }

    /// GA staff and admins evaluate work
    fn is_evaluator(&self) -> bool {
        self.role().is_evaluator()
    }

    /// e.g. "Dina (GA)"
    fn checker_display(&self) -> String {
        format!("{} ({})", self.display_name(), self.role().label())
    }
}

/// Base contract trait
pub trait Contract<T: ?Sized>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Runs the `validator` derive rules of an input struct
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributesContract;

impl<T: Validate> Contract<T> for AttributesContract {
    fn validate(&self, entity: &T) -> ValidationResult {
        entity.validate().map_err(ValidationErrors::from)
    }
}

/// Validates attributes and lifts the failure into an `OoError`
pub fn validate_attributes<T: Validate>(input: &T) -> OoResult<()> {
    AttributesContract.validate(input).map_err(OoError::from)
}

/// Evaluator-only operations
pub fn require_evaluator(user: &dyn UserContext, action: &str) -> OoResult<()> {
    if user.is_evaluator() {
        Ok(())
    } else {
        Err(OoError::forbidden(format!(
            "Only GA or admin users may {}",
            action
        )))
    }
}

/// Owner-only records: strangers get `NotFound` so ids are not probed
pub fn require_owner(
    user: &dyn UserContext,
    owner_id: Id,
    entity: &'static str,
    id: Id,
) -> OoResult<()> {
    if user.id() == owner_id {
        Ok(())
    } else {
        Err(OoError::not_found(entity, id))
    }
}

/// Owner or admin, otherwise `Forbidden`
pub fn require_owner_or_admin(user: &dyn UserContext, owner_id: Id, action: &str) -> OoResult<()> {
    if user.id() == owner_id || user.is_admin() {
        Ok(())
    } else {
        Err(OoError::forbidden(format!(
            "Only the organizer or an admin may {}",
            action
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct MockUser {
        id: Id,
        role: Role,
    }

    impl UserContext for MockUser {
        fn id(&self) -> Id {
            self.id
        }
        fn display_name(&self) -> &str {
            "Dina"
        }
        fn role(&self) -> Role {
            self.role
        }
    }

    #[test]
    fn test_checker_display() {
        let ga = MockUser { id: 2, role: Role::Ga };
        assert_eq!(ga.checker_display(), "Dina (GA)");
    }

    #[test]
    fn test_require_evaluator() {
        let user = MockUser { id: 1, role: Role::User };
        let err = require_evaluator(&user, "evaluate todos").unwrap_err();
        assert_eq!(err.status_code(), 403);

        let admin = MockUser { id: 1, role: Role::Admin };
        assert!(require_evaluator(&admin, "evaluate todos").is_ok());
    }

    #[test]
    fn test_require_owner_hides_foreign_records() {
        let user = MockUser { id: 1, role: Role::Admin };
        let err = require_owner(&user, 9, "Todo", 4).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_owner_or_admin() {
        let admin = MockUser { id: 1, role: Role::Admin };
        assert!(require_owner_or_admin(&admin, 9, "end this meeting").is_ok());

        let ga = MockUser { id: 1, role: Role::Ga };
        assert!(require_owner_or_admin(&ga, 9, "end this meeting").is_err());
        assert!(require_owner_or_admin(&ga, 1, "end this meeting").is_ok());
    }
}
