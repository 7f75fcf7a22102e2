//! `create` commands

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, Subcommand};
use tableau::models::DEFAULT_SITE_ROLE;
use tableau::{User, UserDirectory};

use super::{Outcome, connect};
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(subcommand)]
    pub command: CreateCommands,
}

#[derive(Subcommand, Debug)]
pub enum CreateCommands {
    /// Create a user authenticating through SAML
    User(CreateUserArgs),
}

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    pub username: String,

    /// Site role of the new user
    #[arg(long, default_value = DEFAULT_SITE_ROLE)]
    pub site_role: String,
}

pub async fn execute(args: CreateArgs, config: &AppConfig) -> Result<Outcome> {
    let directory = connect(config).await?;
    match args.command {
        CreateCommands::User(args) => user(&directory, &args, &mut io::stdout()).await,
    }
}

pub async fn user(
    directory: &UserDirectory,
    args: &CreateUserArgs,
    out: &mut impl Write,
) -> Result<Outcome> {
    match directory
        .create_user(&User::new(&args.username, &args.site_role))
        .await
    {
        Ok(user) => {
            writeln!(
                out,
                "User {} created with ID {} ({})",
                user.username, user.id, user.role
            )?;
            Ok(Outcome::Done)
        }
        Err(e) if e.is_nothing_to_do() => {
            writeln!(out, "User {} already exists!", args.username)?;
            Ok(Outcome::NothingToDo)
        }
        Err(e) => Err(e.into()),
    }
}
