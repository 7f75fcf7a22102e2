//! Command handlers
//!
//! Every handler signs in once, runs its operation against the user
//! directory and reports an [`Outcome`]. Handlers write their results to the
//! writer they are given so they can be exercised without a terminal.

pub mod create;
pub mod delete;
pub mod get;
pub mod login;
pub mod update;

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use tableau::{HttpTransport, Session, UserDirectory, auth};

use crate::config::{AppConfig, Endpoint};

/// How a command ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The target was missing or already in the requested state
    NothingToDo,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::NothingToDo => ExitCode::from(2),
        }
    }
}

/// Sign in and reject sessions without a token or site id
pub async fn sign_in(transport: &HttpTransport, endpoint: &Endpoint) -> Result<Session> {
    let session = auth::sign_in(transport, &endpoint.url, &endpoint.credentials)
        .await
        .context("Failed to log in")?;

    if !session.is_usable() {
        bail!("Failed to log in: the server did not return a token and a site id");
    }
    Ok(session)
}

/// Directory client for the configured site
pub async fn connect(config: &AppConfig) -> Result<UserDirectory> {
    let endpoint = config.endpoint()?;
    let client_config = config.client_config();
    let transport = HttpTransport::new(&client_config)?;
    let session = sign_in(&transport, &endpoint).await?;

    Ok(UserDirectory::with_config(transport, session, client_config))
}


#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer};

    use test_support::xml;

    fn endpoint(server: &MockServer) -> Endpoint {
        Endpoint {
            url: format!("{}{}", server.uri(), test_support::API),
            credentials: tableau::Credentials::new("admin", "hunter2"),
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Done.exit_code(), ExitCode::SUCCESS);
        assert_eq!(Outcome::NothingToDo.exit_code(), ExitCode::from(2));
    }

    #[tokio::test]
    async fn test_sign_in_rejects_unusable_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/3.19/auth/signin"))
            .respond_with(xml(200, "<tsResponse><credentials/></tsResponse>".to_string()))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&tableau::ClientConfig::default()).unwrap();
        let err = sign_in(&transport, &endpoint(&server)).await.unwrap_err();

        assert!(err.to_string().contains("did not return a token"));
    }

    #[tokio::test]
    async fn test_sign_in_failure_has_context() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/3.19/auth/signin"))
            .respond_with(xml(401, "denied".to_string()))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&tableau::ClientConfig::default()).unwrap();
        let err = sign_in(&transport, &endpoint(&server)).await.unwrap_err();

        assert_eq!(
            format!("{:#}", err),
            "Failed to log in: failed to log in - server responded with status code: 401 - denied"
        );
    }
}
