//! `login` command

use std::io::{self, Write};

use anyhow::Result;
use tableau::HttpTransport;
use tracing::info;

use super::{Outcome, sign_in};
use crate::config::{AppConfig, Endpoint};

pub async fn execute(config: &AppConfig) -> Result<Outcome> {
    let endpoint = config.endpoint()?;
    let transport = HttpTransport::new(&config.client_config())?;
    run(&transport, &endpoint, &mut io::stdout()).await
}

/// Sign in and print the site id and token
pub async fn run(
    transport: &HttpTransport,
    endpoint: &Endpoint,
    out: &mut impl Write,
) -> Result<Outcome> {
    info!(
        "Logging in into {} as {}...",
        endpoint.url, endpoint.credentials.username
    );
    let session = sign_in(transport, endpoint).await?;

    writeln!(
        out,
        "Successfully logged into {} (site ID {}); token is {}",
        endpoint.url,
        session.site_id(),
        session.token()
    )?;
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{API, text, xml};
    use tableau::{ClientConfig, Credentials};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer};

    #[tokio::test]
    async fn test_login_prints_site_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/3.19/auth/signin"))
            .and(body_string_contains(r#"contentUrl="sales""#))
            .respond_with(xml(
                200,
                r#"<tsResponse><credentials token="tok-42"><site id="site-7" contentUrl="sales"/></credentials></tsResponse>"#.to_string(),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = Endpoint {
            url: format!("{}{}", server.uri(), API),
            credentials: Credentials::new("admin", "hunter2").with_content_url("sales"),
        };
        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
        let mut out = Vec::new();

        let outcome = run(&transport, &endpoint, &mut out).await.unwrap();

        assert_eq!(outcome, Outcome::Done);
        assert_eq!(
            text(out),
            format!(
                "Successfully logged into {} (site ID site-7); token is tok-42\n",
                endpoint.url
            )
        );
    }
}
