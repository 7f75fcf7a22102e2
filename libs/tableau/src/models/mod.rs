//! Tableau client models

pub mod role;
pub mod session;
pub mod user;

// Re-export for convenience
pub use role::{DEFAULT_SITE_ROLE, RoleAssignment, roles_match};
pub use session::{Credentials, Session};
pub use user::{DEFAULT_AUTH_SETTING, Pagination, User};
