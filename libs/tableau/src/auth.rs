//! Sign-in against a Tableau site

use tracing::{debug, info};

use crate::codec;
use crate::error::TableauResult;
use crate::models::{Credentials, Session};
use crate::transport::{ApiRequest, HttpTransport};

/// Exchange credentials for a session token and site id.
///
/// One attempt, no retry. A 200 whose body lacks the token or site id still
/// yields a session; check [`Session::is_usable`] before using it.
pub async fn sign_in(
    transport: &HttpTransport,
    base_url: &str,
    credentials: &Credentials,
) -> TableauResult<Session> {
    let base_url = base_url.trim_end_matches('/');
    info!("Logging in into {} as {}", base_url, credentials.username);

    let request =
        ApiRequest::post(format!("{}/auth/signin", base_url), codec::encode_sign_in(credentials)?)
            .sensitive();

    let body = transport.execute(&request, None).await?.classify_sign_in()?;
    let grant = codec::decode_sign_in(&body)?;

    debug!("Signed in to site {}", grant.site_id);

    Ok(Session::new(base_url, grant.token, grant.site_id, credentials))
}
