//! Role names carried in access-token claims.

pub const ROLE_ADMIN: &str = "admin";

/// Role assumed when a token carries none.
pub const ROLE_USER: &str = "user";
