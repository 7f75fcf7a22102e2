//! Rendering of users on standard output

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use tableau::User;

/// Output format of the `get` command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `username (id) - role`, one user per line
    #[default]
    Text,
    Yaml,
    Json,
}

/// One-line summary of a user
pub fn user_line(user: &User) -> String {
    format!("{} ({}) - {}", user.username, user.id, user.role)
}

pub fn write_user(out: &mut impl Write, user: &User, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", user_line(user))?,
        OutputFormat::Yaml => write!(out, "{}", serde_yaml::to_string(user)?)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(user)?)?,
    }
    Ok(())
}

pub fn write_users(out: &mut impl Write, users: &[User], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for user in users {
                writeln!(out, "{}", user_line(user))?;
            }
        }
        OutputFormat::Yaml => write!(out, "{}", serde_yaml::to_string(users)?)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(users)?)?,
    }
    Ok(())
}
