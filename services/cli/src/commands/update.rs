//! `update` commands
//!
//! A single user is updated from a username and `--site-role`. A bulk update
//! reads a YAML sequence of username/role records:
//!
//! ```yaml
//! - username: john.smith
//!   role: Explorer
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use tableau::{RoleAssignment, RoleChange, UserDirectory};
use tracing::{debug, info, warn};

use super::{Outcome, connect};
use crate::config::AppConfig;
use crate::output::user_line;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(subcommand)]
    pub command: UpdateCommands,
}

#[derive(Subcommand, Debug)]
pub enum UpdateCommands {
    /// Change the site role of one user, or of every user listed in a YAML file
    User(UpdateUserArgs),
}

#[derive(Args, Debug)]
pub struct UpdateUserArgs {
    #[arg(requires = "site_role", required_unless_present = "from_yaml")]
    pub username: Option<String>,

    /// New site role of the user
    #[arg(long)]
    pub site_role: Option<String>,

    /// Path to a YAML file with usernames and roles
    #[arg(long, value_name = "FILE", conflicts_with = "username")]
    pub from_yaml: Option<PathBuf>,
}

/// What an update run has to do, resolved before signing in
#[derive(Debug, PartialEq, Eq)]
pub enum UpdateRequest {
    Single { username: String, site_role: String },
    Bulk(Vec<RoleAssignment>),
}

impl UpdateRequest {
    pub fn from_args(args: UpdateUserArgs) -> Result<Self> {
        match (args.username, args.site_role, args.from_yaml) {
            (Some(username), Some(site_role), None) => Ok(Self::Single {
                username,
                site_role,
            }),
            (None, _, Some(path)) => Ok(Self::Bulk(load_assignments(&path)?)),
            _ => bail!("either a username with --site-role, or --from-yaml is required"),
        }
    }
}

/// Read the role assignments of a bulk update file
pub fn load_assignments(path: &Path) -> Result<Vec<RoleAssignment>> {
    if !path.is_file() {
        bail!(
            "Provided path to YAML file is not valid: {}",
            path.display()
        );
    }
    info!("Updating user roles from file {}", path.display());

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Couldn't read YAML file {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let assignments: Vec<RoleAssignment> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Invalid user list in {}", path.display()))?;

    debug!("Loaded {} users from file", assignments.len());
    Ok(assignments)
}

pub async fn execute(args: UpdateArgs, config: &AppConfig) -> Result<Outcome> {
    let UpdateCommands::User(args) = args.command;
    let request = UpdateRequest::from_args(args)?;

    if matches!(&request, UpdateRequest::Bulk(assignments) if assignments.is_empty()) {
        warn!("No users to update");
        return Ok(Outcome::NothingToDo);
    }

    let directory = connect(config).await?;
    run(&directory, request, &mut io::stdout()).await
}

pub async fn run(
    directory: &UserDirectory,
    request: UpdateRequest,
    out: &mut impl Write,
) -> Result<Outcome> {
    match request {
        UpdateRequest::Single {
            username,
            site_role,
        } => single(directory, &username, &site_role, out).await,
        UpdateRequest::Bulk(assignments) => bulk(directory, &assignments, out).await,
    }
}

async fn single(
    directory: &UserDirectory,
    username: &str,
    site_role: &str,
    out: &mut impl Write,
) -> Result<Outcome> {
    match directory.apply_site_role(username, site_role).await? {
        RoleChange::NotFound => {
            writeln!(out, "User {} does not exist!", username)?;
            Ok(Outcome::NothingToDo)
        }
        RoleChange::Unchanged(user) | RoleChange::Updated(user) => {
            writeln!(out, "{}", user_line(&user))?;
            Ok(Outcome::Done)
        }
    }
}

async fn bulk(
    directory: &UserDirectory,
    assignments: &[RoleAssignment],
    out: &mut impl Write,
) -> Result<Outcome> {
    let report = directory.bulk_update_roles(assignments).await;
    writeln!(out, "{}", report)?;

    if report.errored > 0 {
        bail!(
            "{} of {} role updates failed",
            report.errored,
            report.total()
        );
    }
    Ok(Outcome::Done)
}
