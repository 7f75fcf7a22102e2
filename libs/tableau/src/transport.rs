//! HTTP transport and response classification
//!
//! The transport sends one request at a time and hands back the status code
//! and body. Every operation then runs the response through
//! [`ApiResponse::classify`], which applies the shared status policy:
//! expected success code, 401, 409 on create, anything else.

use reqwest::{Client, Method, StatusCode};
use tracing::{debug, trace, warn};

use crate::codec;
use crate::config::ClientConfig;
use crate::error::{TableauError, TableauResult};
use crate::models::{Session, User};

/// Header carrying the session token
pub const AUTH_HEADER: &str = "X-Tableau-Auth";

const XML_CONTENT_TYPE: &str = "application/xml";

/// Operations of the directory, used to pick the expected status code
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    GetUser,
    ListUsers,
    /// Carries the user being created so a conflict can hand it back
    CreateUser(&'a User),
    UpdateUser,
    DeleteUser,
}

impl Operation<'_> {
    pub fn expected_status(&self) -> StatusCode {
        match self {
            Operation::GetUser | Operation::ListUsers | Operation::UpdateUser => StatusCode::OK,
            Operation::CreateUser(_) => StatusCode::CREATED,
            Operation::DeleteUser => StatusCode::NO_CONTENT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::GetUser => "get user",
            Operation::ListUsers => "get users",
            Operation::CreateUser(_) => "create user",
            Operation::UpdateUser => "update user",
            Operation::DeleteUser => "delete user",
        }
    }
}

/// Outgoing request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: String,
    query: Vec<(&'static str, String)>,
    body: Option<String>,
    sensitive: bool,
}

impl ApiRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
            sensitive: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: String) -> Self {
        Self::new(Method::POST, url).body(body)
    }

    pub fn put(url: impl Into<String>, body: String) -> Self {
        Self::new(Method::PUT, url).body(body)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Keep the body out of the logs
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Status code and fully read body of a response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Sign-in succeeds on 200 only, everything else is an auth failure
    pub fn classify_sign_in(self) -> TableauResult<String> {
        if self.status == StatusCode::OK {
            Ok(self.body)
        } else {
            Err(TableauError::Auth {
                status: self.status.as_u16(),
                body: self.body,
            })
        }
    }

    /// Apply the status policy of an authenticated call and return the body
    pub fn classify(self, operation: Operation<'_>, session: &Session) -> TableauResult<String> {
        if self.status == operation.expected_status() {
            return Ok(self.body);
        }

        match (self.status, operation) {
            (StatusCode::UNAUTHORIZED, _) => Err(TableauError::InvalidCredentials {
                status: self.status.as_u16(),
                username: session.username().to_string(),
                password_hint: session.password_hint().to_string(),
            }),
            (StatusCode::CONFLICT, Operation::CreateUser(user)) => {
                Err(TableauError::UserAlreadyExists {
                    user: Box::new(User {
                        exists: true,
                        ..user.clone()
                    }),
                })
            }
            (status, Operation::UpdateUser) => Err(TableauError::Server {
                operation: operation.name(),
                status: status.as_u16(),
                detail: codec::decode_error(&self.body),
                body: self.body,
            }),
            (status, _) => Err(TableauError::Server {
                operation: operation.name(),
                status: status.as_u16(),
                body: self.body,
                detail: None,
            }),
        }
    }
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport from the client configuration
    pub fn new(config: &ClientConfig) -> TableauResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("tableau-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap a pre-built `reqwest::Client`
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Send a request, attaching the session token when there is one
    pub async fn execute(
        &self,
        request: &ApiRequest,
        session: Option<&Session>,
    ) -> TableauResult<ApiResponse> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .query(&request.query);

        if let Some(session) = session {
            builder = builder.header(AUTH_HEADER, session.token());
        }

        if let Some(body) = &request.body {
            if !request.sensitive {
                trace!("request body: {}", body);
            }
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, XML_CONTENT_TYPE)
                .body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();

        // The response is consumed and released here, on success or failure.
        let body = response.text().await.inspect_err(|e| {
            warn!("failed to read response body of {}: {}", request.url, e);
        })?;

        debug!("response code: {}", status.as_u16());
        trace!("response body: {}", body);

        Ok(ApiResponse { status, body })
    }
}
