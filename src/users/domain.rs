use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use crate::core::library::{LibraryError, LibraryResult, Permission};

pub(crate) const NULL_USER: &str = "Null User Found";

pub fn has_permission(granted: &HashSet<Permission>, permission: Permission) -> bool {
    granted.contains(&permission)
}

// User of the catalog with the set of permissions granted to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub permissions: HashSet<Permission>,
}

impl User {
    pub fn new(username: &str, permissions: &[Permission]) -> Self {
        Self {
            username: username.to_string(),
            permissions: permissions.iter().copied().collect(),
        }
    }

    pub fn is_authorized(&self, permission: Permission) -> bool {
        has_permission(&self.permissions, permission)
    }
}

// Checks that a user is present and holds the permission, failing with the given message
// otherwise.
pub(crate) fn authorize<'a>(user: Option<&'a User>, permission: Permission,
                            denied_message: &str) -> LibraryResult<&'a User> {
    let user = user.ok_or_else(|| LibraryError::access_denied(NULL_USER, None))?;
    if !user.is_authorized(permission) {
        return Err(LibraryError::access_denied(denied_message, Some(permission.to_string())));
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use crate::core::library::{LibraryError, Permission};
    use crate::users::domain::{authorize, has_permission, User};

    #[tokio::test]
    async fn test_should_check_permission_membership() {
        let granted = HashSet::from([Permission::BorrowBook, Permission::ReturnBook]);
        assert!(has_permission(&granted, Permission::BorrowBook));
        assert!(!has_permission(&granted, Permission::AddBook));
        assert!(!has_permission(&HashSet::new(), Permission::RemoveBook));
    }

    #[tokio::test]
    async fn test_should_authorize_user() {
        let user = User::new("rbrajbharath", &[Permission::BorrowBook, Permission::ReturnBook]);
        assert!(user.is_authorized(Permission::ReturnBook));
        assert!(!user.is_authorized(Permission::AddBook));
        let authorized = authorize(Some(&user), Permission::BorrowBook, "denied").expect("should authorize");
        assert_eq!("rbrajbharath", authorized.username.as_str());
    }

    #[tokio::test]
    async fn test_should_reject_missing_or_unauthorized_user() {
        let user = User::new("reader", &[]);
        let err = authorize(None, Permission::AddBook, "denied").expect_err("should reject");
        assert_eq!(LibraryError::access_denied("Null User Found", None), err);
        let err = authorize(Some(&user), Permission::AddBook, "denied").expect_err("should reject");
        assert_eq!("denied", err.message());
    }
}
