//! Well-known role name constants.
//!
//! Roles are issued by the identity provider inside the JWT `role` claim.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Whether the given role grants administrative access to every survey.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}
