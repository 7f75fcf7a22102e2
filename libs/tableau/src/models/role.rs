//! Site role helpers

use serde::{Deserialize, Serialize};

/// Role assigned when none is requested
pub const DEFAULT_SITE_ROLE: &str = "Viewer";

/// One record of a bulk role update document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub username: String,
    pub role: String,
}

/// Site roles compare case-insensitively
pub fn roles_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
