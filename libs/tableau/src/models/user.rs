//! User model and related functionality

use serde::{Deserialize, Serialize};

/// Auth setting every account is created with
pub const DEFAULT_AUTH_SETTING: &str = "SAML";

/// User entity as seen on a Tableau site
///
/// `exists == false` is the "no such user" value; its `id` and `role` are
/// never meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub auth_setting: String,
    #[serde(default)]
    pub exists: bool,
}

impl User {
    /// The "no such user" value
    pub fn missing() -> Self {
        Self::default()
    }

    /// A user that is about to be created
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
            ..Self::default()
        }
    }
}

/// Pagination block of a list response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
    pub total_available: usize,
}
