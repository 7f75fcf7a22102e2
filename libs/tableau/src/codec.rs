//! XML request and response bodies of the Tableau REST API
//!
//! Outgoing bodies are produced by the quick-xml serializer so that attribute
//! values are always escaped. Incoming bodies are read leniently: attributes
//! that are missing decode to empty strings, unknown attributes and elements
//! are ignored, and only malformed XML is an error.

use quick_xml::{de, se};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorDetail, TableauResult};
use crate::models::{Credentials, DEFAULT_AUTH_SETTING, Pagination, User};

const REQUEST_ROOT: &str = "tsRequest";

#[derive(Serialize)]
struct SignInRequest<'a> {
    credentials: SignInCredentials<'a>,
}

#[derive(Serialize)]
struct SignInCredentials<'a> {
    #[serde(rename = "@name")]
    name: &'a str,
    #[serde(rename = "@password")]
    password: &'a str,
    site: SiteRef<'a>,
}

#[derive(Serialize)]
struct SiteRef<'a> {
    #[serde(rename = "@contentUrl")]
    content_url: &'a str,
}

#[derive(Serialize)]
struct UserRequest<'a> {
    user: UserPayload<'a>,
}

#[derive(Serialize)]
struct UserPayload<'a> {
    #[serde(rename = "@name", skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(rename = "@siteRole")]
    site_role: &'a str,
    #[serde(rename = "@authSetting", skip_serializing_if = "Option::is_none")]
    auth_setting: Option<&'a str>,
}

#[derive(Deserialize)]
struct SignInResponse {
    #[serde(default)]
    credentials: CredentialsElement,
}

#[derive(Deserialize, Default)]
struct CredentialsElement {
    #[serde(rename = "@token", default)]
    token: String,
    #[serde(default)]
    site: SiteElement,
}

#[derive(Deserialize, Default)]
struct SiteElement {
    #[serde(rename = "@id", default)]
    id: String,
}

#[derive(Deserialize)]
struct UsersResponse {
    #[serde(default)]
    pagination: Option<PaginationElement>,
    #[serde(default)]
    users: UsersElement,
}

#[derive(Deserialize, Default)]
struct UsersElement {
    #[serde(default)]
    user: Vec<UserElement>,
}

#[derive(Deserialize)]
struct PaginationElement {
    #[serde(rename = "@pageNumber", default)]
    page_number: u32,
    #[serde(rename = "@pageSize", default)]
    page_size: u32,
    #[serde(rename = "@totalAvailable", default)]
    total_available: usize,
}

#[derive(Deserialize)]
struct SingleUserResponse {
    #[serde(default)]
    user: UserElement,
}

#[derive(Deserialize, Default)]
struct UserElement {
    #[serde(rename = "@id", default)]
    id: String,
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@siteRole", default)]
    site_role: String,
    #[serde(rename = "@authSetting", default)]
    auth_setting: String,
}

impl From<UserElement> for User {
    fn from(element: UserElement) -> Self {
        User {
            username: element.name,
            id: element.id,
            role: element.site_role,
            auth_setting: element.auth_setting,
            exists: true,
        }
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorElement,
}

#[derive(Deserialize)]
struct ErrorElement {
    #[serde(rename = "@code", default)]
    code: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    detail: String,
}

/// Token and site id granted by a sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInGrant {
    pub token: String,
    pub site_id: String,
}

/// One page of a user listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub pagination: Option<Pagination>,
}

/// `<tsRequest><credentials name password><site contentUrl/></credentials></tsRequest>`
pub fn encode_sign_in(credentials: &Credentials) -> TableauResult<String> {
    let request = SignInRequest {
        credentials: SignInCredentials {
            name: &credentials.username,
            password: credentials.password(),
            site: SiteRef {
                content_url: &credentials.content_url,
            },
        },
    };
    Ok(se::to_string_with_root(REQUEST_ROOT, &request)?)
}

/// `<tsRequest><user name siteRole authSetting/></tsRequest>`
pub fn encode_create_user(user: &User) -> TableauResult<String> {
    let request = UserRequest {
        user: UserPayload {
            name: Some(&user.username),
            site_role: &user.role,
            auth_setting: Some(DEFAULT_AUTH_SETTING),
        },
    };
    Ok(se::to_string_with_root(REQUEST_ROOT, &request)?)
}

/// `<tsRequest><user siteRole/></tsRequest>`, only the role is ever changed
pub fn encode_update_user(site_role: &str) -> TableauResult<String> {
    let request = UserRequest {
        user: UserPayload {
            name: None,
            site_role,
            auth_setting: None,
        },
    };
    Ok(se::to_string_with_root(REQUEST_ROOT, &request)?)
}

/// Exact-match filter expression for the users collection
pub fn name_filter(username: &str) -> String {
    format!("name:eq:{}", username)
}

pub fn decode_sign_in(body: &str) -> TableauResult<SignInGrant> {
    let response: SignInResponse = de::from_str(body)?;
    Ok(SignInGrant {
        token: response.credentials.token,
        site_id: response.credentials.site.id,
    })
}

pub fn decode_user_page(body: &str) -> TableauResult<UserPage> {
    let response: UsersResponse = de::from_str(body)?;
    Ok(UserPage {
        users: response.users.user.into_iter().map(User::from).collect(),
        pagination: response.pagination.map(|p| Pagination {
            page_number: p.page_number,
            page_size: p.page_size,
            total_available: p.total_available,
        }),
    })
}

/// Body of a create or update response
pub fn decode_user(body: &str) -> TableauResult<User> {
    let response: SingleUserResponse = de::from_str(body)?;
    Ok(response.user.into())
}

/// Error detail of a failure body, `None` when the body is not one
pub fn decode_error(body: &str) -> Option<ErrorDetail> {
    de::from_str::<ErrorResponse>(body)
        .ok()
        .map(|response| ErrorDetail {
            code: response.error.code,
            summary: response.error.summary.trim().to_string(),
            detail: response.error.detail.trim().to_string(),
        })
}
