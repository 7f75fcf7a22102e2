//! User directory operations of a Tableau site
//!
//! [`UserDirectory`] owns the transport and the session and implements the
//! get / list / create / update / delete flows on top of the codec and the
//! response classification.

use tracing::{debug, info, warn};

use crate::codec::{self, UserPage};
use crate::config::ClientConfig;
use crate::error::{TableauError, TableauResult};
use crate::models::{DEFAULT_SITE_ROLE, Session, User, roles_match};
use crate::pagination::UserPages;
use crate::transport::{ApiRequest, HttpTransport, Operation};

/// Query parameter naming the account that inherits deleted content
pub const MAP_ASSETS_TO_PARAM: &str = "mapAssetsTo";

/// Outcome of a role update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    /// No such user, nothing was sent
    NotFound,
    /// The user already had the requested role, nothing was sent
    Unchanged(User),
    /// The role was changed and the change was verified
    Updated(User),
}

impl RoleChange {
    /// The user as the caller should see it
    pub fn into_user(self) -> User {
        match self {
            RoleChange::NotFound => User::missing(),
            RoleChange::Unchanged(user) | RoleChange::Updated(user) => user,
        }
    }
}

/// Client for the users of one site
#[derive(Debug, Clone)]
pub struct UserDirectory {
    transport: HttpTransport,
    session: Session,
    config: ClientConfig,
}

impl UserDirectory {
    /// Create a directory client for an authenticated session
    pub fn new(transport: HttpTransport, session: Session) -> Self {
        Self::with_config(transport, session, ClientConfig::default())
    }

    pub fn with_config(transport: HttpTransport, session: Session, config: ClientConfig) -> Self {
        Self {
            transport,
            session,
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn send(&self, request: ApiRequest, operation: Operation<'_>) -> TableauResult<String> {
        self.transport
            .execute(&request, Some(&self.session))
            .await?
            .classify(operation, &self.session)
    }

    /// Look a user up by exact username.
    ///
    /// No match is a missing user, not an error. More than one match is an
    /// [`TableauError::AmbiguousResult`] carrying a missing user.
    pub async fn get_user(&self, username: &str) -> TableauResult<User> {
        debug!("Searching for user {} on {}", username, self.session.users_url());

        let request = ApiRequest::get(self.session.users_url())
            .query("filter", codec::name_filter(username));
        let body = self.send(request, Operation::GetUser).await?;
        let mut users = codec::decode_user_page(&body)?.users;

        match users.len() {
            0 => Ok(User::missing()),
            1 => Ok(users.remove(0)),
            count => Err(TableauError::AmbiguousResult {
                username: username.to_string(),
                count,
                user: Box::new(User::missing()),
            }),
        }
    }

    /// Fetch one page of the users collection
    pub(crate) async fn fetch_page(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> TableauResult<UserPage> {
        debug!(
            "Fetching {} users/page {} from {}",
            page_size,
            page_number,
            self.session.users_url()
        );

        let request = ApiRequest::get(self.session.users_url())
            .query("pageSize", page_size)
            .query("pageNumber", page_number);
        let body = self.send(request, Operation::ListUsers).await?;
        codec::decode_user_page(&body)
    }

    /// Page through the users collection from the first page
    pub fn pages(&self) -> UserPages<'_> {
        UserPages::new(self)
    }

    /// Every user of the site
    pub async fn get_users(&self) -> TableauResult<Vec<User>> {
        let users = self.pages().collect_all().await?;
        if users.is_empty() {
            info!("No users were found");
        }
        Ok(users)
    }

    /// Create a user with the default auth setting.
    ///
    /// An existing username yields [`TableauError::UserAlreadyExists`]
    /// carrying the user flagged as existing.
    pub async fn create_user(&self, user: &User) -> TableauResult<User> {
        let candidate = User {
            role: if user.role.is_empty() {
                DEFAULT_SITE_ROLE.to_string()
            } else {
                user.role.clone()
            },
            exists: false,
            ..user.clone()
        };

        debug!(
            "Creating user {} on {}",
            candidate.username,
            self.session.users_url()
        );

        let request = ApiRequest::post(
            self.session.users_url(),
            codec::encode_create_user(&candidate)?,
        );
        let body = self.send(request, Operation::CreateUser(&candidate)).await?;
        let created = codec::decode_user(&body)?;

        debug!("Created user {:?}", created);
        Ok(created)
    }

    /// Set the site role of a user and report which path was taken.
    ///
    /// The user is read first; a missing user or an already matching role
    /// ends the call without a write. Otherwise the role is written and the
    /// user is read back; the requested role, the role in the update response
    /// and the role read back must all agree.
    pub async fn apply_site_role(
        &self,
        username: &str,
        site_role: &str,
    ) -> TableauResult<RoleChange> {
        let current = self.get_user(username).await?;
        if !current.exists {
            return Ok(RoleChange::NotFound);
        }
        if roles_match(&current.role, site_role) {
            info!(
                "User {} already has role {} assigned.",
                current.username, current.role
            );
            return Ok(RoleChange::Unchanged(current));
        }

        debug!("Updating user on {}", self.session.user_url(&current.id));

        let request = ApiRequest::put(
            self.session.user_url(&current.id),
            codec::encode_update_user(site_role)?,
        );
        let body = self.send(request, Operation::UpdateUser).await?;
        let updated = codec::decode_user(&body)?;

        self.verify_site_role(username, site_role, &updated.role)
            .await
            .map(RoleChange::Updated)
    }

    async fn verify_site_role(
        &self,
        username: &str,
        requested: &str,
        updated: &str,
    ) -> TableauResult<User> {
        let inconsistent = |fetched: Option<&str>| TableauError::Consistency {
            username: username.to_string(),
            requested: requested.to_string(),
            updated: updated.to_string(),
            fetched: fetched.map(str::to_string),
        };

        if !roles_match(updated, requested) {
            return Err(inconsistent(None));
        }

        let attempts = self.config.verify_attempts.max(1);
        let mut attempt = 1;
        loop {
            let fetched = self.get_user(username).await?;

            if fetched.exists && roles_match(&fetched.role, requested) {
                return Ok(fetched);
            }
            if attempt >= attempts {
                return Err(inconsistent(Some(&fetched.role)));
            }

            warn!(
                "Role of {} reads {} after update to {}, checking again ({}/{})",
                username, fetched.role, requested, attempt, attempts
            );
            attempt += 1;
            tokio::time::sleep(self.config.verify_delay).await;
        }
    }

    /// Set the site role of a user.
    ///
    /// Returns a missing user when there is no such account, and the
    /// unchanged user when the role already matches.
    pub async fn update_user_site_role(
        &self,
        username: &str,
        site_role: &str,
    ) -> TableauResult<User> {
        self.apply_site_role(username, site_role)
            .await
            .map(RoleChange::into_user)
    }

    /// Remove a user from the site, optionally handing its content to
    /// `reassign_to` (a user id). `true` only on 204.
    pub async fn delete_user(
        &self,
        user_id: &str,
        reassign_to: Option<&str>,
    ) -> TableauResult<bool> {
        let mut request = ApiRequest::delete(self.session.user_url(user_id));
        if let Some(target) = reassign_to.filter(|t| !t.is_empty()) {
            request = request.query(MAP_ASSETS_TO_PARAM, target);
        }

        debug!("Deleting user {}", user_id);

        self.send(request, Operation::DeleteUser).await?;
        Ok(true)
    }
}
