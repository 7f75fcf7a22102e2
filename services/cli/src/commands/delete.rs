//! `delete` commands

use std::io::{self, Write};

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use tableau::UserDirectory;
use tracing::debug;

use super::{Outcome, connect};
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(subcommand)]
    pub command: DeleteCommands,
}

#[derive(Subcommand, Debug)]
pub enum DeleteCommands {
    /// Delete a user by username
    User(DeleteUserArgs),
}

#[derive(Args, Debug)]
pub struct DeleteUserArgs {
    pub username: String,

    /// Username of an existing user to which the deleted user's assets are moved
    #[arg(short = 'e', long)]
    pub existing_assets_user_name: Option<String>,
}

pub async fn execute(args: DeleteArgs, config: &AppConfig) -> Result<Outcome> {
    let DeleteCommands::User(args) = args.command;
    let new_owner = args
        .existing_assets_user_name
        .or_else(|| config.existing_assets_user_name.clone());

    let directory = connect(config).await?;
    user(
        &directory,
        &args.username,
        new_owner.as_deref(),
        &mut io::stdout(),
    )
    .await
}

/// Delete `username`, moving its content to `new_owner` when given.
///
/// The new owner must exist; nothing is deleted otherwise.
pub async fn user(
    directory: &UserDirectory,
    username: &str,
    new_owner: Option<&str>,
    out: &mut impl Write,
) -> Result<Outcome> {
    debug!(
        "delete user {} called, existing assets user name is {:?}",
        username, new_owner
    );

    let user = directory.get_user(username).await?;
    if !user.exists {
        writeln!(out, "User {} does not exist - nothing to delete!", username)?;
        return Ok(Outcome::NothingToDo);
    }

    let new_owner_id = match new_owner {
        Some(name) => {
            let owner = directory.get_user(name).await?;
            if !owner.exists {
                bail!(
                    "User {} does not exist - can not move existing assets to them!",
                    name
                );
            }
            if owner.id == user.id {
                bail!("Can not move existing assets of {} to the same user", username);
            }
            Some(owner.id)
        }
        None => None,
    };

    directory.delete_user(&user.id, new_owner_id.as_deref()).await?;

    match new_owner {
        Some(name) => writeln!(
            out,
            "User {} deleted from the server, existing assets moved to user {}",
            username, name
        )?,
        None => writeln!(out, "User {} deleted from the server", username)?,
    }
    Ok(Outcome::Done)
}
