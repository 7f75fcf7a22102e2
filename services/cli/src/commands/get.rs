//! `get` commands

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, Subcommand};
use tableau::UserDirectory;
use tracing::debug;

use super::{Outcome, connect};
use crate::config::AppConfig;
use crate::output::{OutputFormat, write_user, write_users};

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(subcommand)]
    pub command: GetCommands,
}

#[derive(Subcommand, Debug)]
pub enum GetCommands {
    /// Print one user, or every user of the site when no username is given
    User(GetUserArgs),
}

#[derive(Args, Debug)]
pub struct GetUserArgs {
    /// Exact username to look up
    pub username: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

pub async fn execute(args: GetArgs, config: &AppConfig) -> Result<Outcome> {
    let directory = connect(config).await?;
    match args.command {
        GetCommands::User(args) => user(&directory, &args, &mut io::stdout()).await,
    }
}

pub async fn user(
    directory: &UserDirectory,
    args: &GetUserArgs,
    out: &mut impl Write,
) -> Result<Outcome> {
    let Some(username) = &args.username else {
        debug!("Fetching all users");
        let users = directory.get_users().await?;
        write_users(out, &users, args.output)?;
        return Ok(Outcome::Done);
    };

    debug!("Getting info about user {}", username);
    let user = directory.get_user(username).await?;
    if !user.exists {
        writeln!(out, "User {} does not exist!", username)?;
        return Ok(Outcome::NothingToDo);
    }

    write_user(out, &user, args.output)?;
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{USERS_PATH, directory, mount_lookup, text, users_xml, xml};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer};

    fn args(username: Option<&str>, output: OutputFormat) -> GetUserArgs {
        GetUserArgs {
            username: username.map(str::to_string),
            output,
        }
    }

    #[tokio::test]
    async fn test_get_single_user() {
        let server = MockServer::start().await;
        mount_lookup(&server, "jane", &[("u-1", "jane", "Explorer")]).await;
        let mut out = Vec::new();

        let outcome = user(&directory(&server), &args(Some("jane"), OutputFormat::Text), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Done);
        assert_eq!(text(out), "jane (u-1) - Explorer\n");
    }

    #[tokio::test]
    async fn test_get_missing_user_is_nothing_to_do() {
        let server = MockServer::start().await;
        mount_lookup(&server, "ghost", &[]).await;
        let mut out = Vec::new();

        let outcome = user(&directory(&server), &args(Some("ghost"), OutputFormat::Text), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::NothingToDo);
        assert_eq!(text(out), "User ghost does not exist!\n");
    }

    #[tokio::test]
    async fn test_get_ambiguous_user_fails() {
        let server = MockServer::start().await;
        mount_lookup(&server, "twin", &[("u-1", "twin", "Viewer"), ("u-2", "twin", "Viewer")]).await;
        let mut out = Vec::new();

        let result = user(&directory(&server), &args(Some("twin"), OutputFormat::Text), &mut out).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_all_users_as_yaml() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .and(query_param("pageNumber", "1"))
            .respond_with(xml(
                200,
                users_xml(&[("u-1", "jane", "Viewer"), ("u-2", "john", "Creator")]),
            ))
            .expect(1)
            .mount(&server)
            .await;
        let mut out = Vec::new();

        let outcome = user(&directory(&server), &args(None, OutputFormat::Yaml), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Done);
        let listed: Vec<tableau::User> = serde_yaml::from_str(&text(out)).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].username, "john");
        assert_eq!(listed[1].role, "Creator");
    }
}
