//! Session model and related functionality

use secrecy::{ExposeSecret, SecretString};

use crate::error::redact_password;

/// Site credentials used for sign-in
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    password: SecretString,
    /// Content URL of the target site, empty for the default site
    pub content_url: String,
}

impl Credentials {
    /// Credentials for the default site
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            content_url: String::new(),
        }
    }

    /// Target a site other than the default one
    pub fn with_content_url(mut self, content_url: impl Into<String>) -> Self {
        self.content_url = content_url.into();
        self
    }

    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// `p*****d` form of the password, safe to show to a user
    pub fn password_hint(&self) -> String {
        redact_password(self.password.expose_secret())
    }
}

/// Authenticated session against one site
///
/// Created by a successful sign-in and never mutated afterwards. Besides the
/// token and site id it remembers who signed in so that a rejected call can
/// name the account without ever holding the full password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    token: String,
    site_id: String,
    username: String,
    password_hint: String,
}

impl Session {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        site_id: impl Into<String>,
        credentials: &Credentials,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            site_id: site_id.into(),
            username: credentials.username.clone(),
            password_hint: credentials.password_hint(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hint(&self) -> &str {
        &self.password_hint
    }

    /// A sign-in response without token or site id cannot be used
    pub fn is_usable(&self) -> bool {
        !self.token.is_empty() && !self.site_id.is_empty()
    }

    /// `{base}/sites/{site}/users`
    pub fn users_url(&self) -> String {
        format!("{}/sites/{}/users", self.base_url, self.site_id)
    }

    /// `{base}/sites/{site}/users/{user_id}`
    pub fn user_url(&self, user_id: &str) -> String {
        format!("{}/{}", self.users_url(), user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("admin", "hunter2");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("hunter2"));
        assert_eq!(credentials.password_hint(), "h*****2");
    }

    #[test]
    fn test_session_urls() {
        let credentials = Credentials::new("admin", "hunter2");
        let session = Session::new("https://tableau.local/api/3.19/", "tok", "site-1", &credentials);
        assert_eq!(session.base_url(), "https://tableau.local/api/3.19");
        assert_eq!(
            session.users_url(),
            "https://tableau.local/api/3.19/sites/site-1/users"
        );
        assert_eq!(
            session.user_url("u-1"),
            "https://tableau.local/api/3.19/sites/site-1/users/u-1"
        );
        assert_eq!(session.password_hint(), "h*****2");
    }

    #[test]
    fn test_session_without_token_is_unusable() {
        let credentials = Credentials::new("admin", "hunter2");
        assert!(!Session::new("http://x", "", "site", &credentials).is_usable());
        assert!(!Session::new("http://x", "tok", "", &credentials).is_usable());
        assert!(Session::new("http://x", "tok", "site", &credentials).is_usable());
    }
}
