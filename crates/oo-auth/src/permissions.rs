//! The authenticated actor

use oo_contracts::UserContext;
use oo_core::{Id, Role};
use serde::Serialize;

use crate::jwt::{Claims, JwtError};

/// Actor of a request, built from validated token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: Id,
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(id: Id, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    pub fn from_claims(claims: &Claims) -> Result<Self, JwtError> {
        Ok(Self::new(claims.user_id()?, claims.name.clone(), claims.role))
    }
}

impl UserContext for CurrentUser {
    fn id(&self) -> Id {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> Role {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_context() {
        let ga = CurrentUser::new(2, "Dina", Role::Ga);
        assert!(ga.is_evaluator());
        assert!(!ga.is_admin());
        assert_eq!(ga.checker_display(), "Dina (GA)");

        let user = CurrentUser::new(7, "Budi", Role::User);
        assert!(!user.is_evaluator());
    }
}
