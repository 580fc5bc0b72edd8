//! Authenticated request context

use uuid::Uuid;

use super::user::Role;
use crate::error::DomainError;

/// Roles allowed to manage the catalogue, guests and members.
pub const LIBRARY_STAFF: &[Role] = &[Role::SuperAdmin, Role::Staff];
pub const SUPER_ADMIN_ONLY: &[Role] = &[Role::SuperAdmin];

/// Who is calling, as resolved by the session gate before a service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn require_any(&self, allowed: &[Role]) -> Result<(), DomainError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "Role '{}' is not allowed to perform this action",
                self.role.as_str()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_any() {
        let staff = Caller::new(Uuid::new_v4(), Role::Staff);
        assert!(staff.require_any(LIBRARY_STAFF).is_ok());
        assert!(staff.require_any(SUPER_ADMIN_ONLY).is_err());

        let student = Caller::new(Uuid::new_v4(), Role::Student);
        assert!(matches!(student.require_any(LIBRARY_STAFF), Err(DomainError::Forbidden(_))));
    }
}
