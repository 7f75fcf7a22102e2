//! CLI configuration
//!
//! Values come from three layers, later ones winning: a `.local` dotenv file
//! in the config directory, the process environment, and the global
//! command-line flags.
//!
//! `.local` follows dotenv quoting: a value holding a backslash, a `$` or a
//! space is written in single quotes to be taken literally.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tableau::{ClientConfig, Credentials};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

pub const URL_KEY: &str = "TABLEAU_URL";
pub const USERNAME_KEY: &str = "TABLEAU_USERNAME";
pub const PASSWORD_KEY: &str = "TABLEAU_PASSWORD";
pub const SITE_KEY: &str = "TABLEAU_SITE";
pub const EXISTING_ASSETS_USER_NAME_KEY: &str = "TABLEAU_EXISTING_ASSETS_USER_NAME";
pub const TIMEOUT_KEY: &str = "TABLEAU_TIMEOUT_SECS";
pub const VERIFY_ATTEMPTS_KEY: &str = "TABLEAU_VERIFY_ATTEMPTS";
pub const LOG_LEVEL_KEY: &str = "LOG_LEVEL";

const KEYS: [&str; 8] = [
    URL_KEY,
    USERNAME_KEY,
    PASSWORD_KEY,
    SITE_KEY,
    EXISTING_ASSETS_USER_NAME_KEY,
    TIMEOUT_KEY,
    VERIFY_ATTEMPTS_KEY,
    LOG_LEVEL_KEY,
];

/// Name of the optional configuration file
pub const LOCAL_FILE: &str = ".local";

pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::WARN;

const DEFAULT_VERIFY_DELAY: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: dotenvy::Error,
    },

    /// The offending line is not echoed, it may hold a password
    #[error("malformed line in {}, quote values holding spaces, backslashes or '$'", .path.display())]
    Malformed { path: PathBuf },

    #[error("missing configuration value {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Values given on the command line, they take precedence over everything
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub site: Option<String>,
    pub log_level: Option<String>,
}

/// Where to connect and as whom
#[derive(Debug)]
pub struct Endpoint {
    pub url: String,
    pub credentials: Credentials,
}

/// Resolved configuration of one CLI run
#[derive(Debug)]
pub struct AppConfig {
    url: Option<String>,
    username: Option<String>,
    password: Option<SecretString>,
    site: String,
    pub existing_assets_user_name: Option<String>,
    pub timeout: Duration,
    pub verify_attempts: u32,
    log_level: Option<String>,
}

impl AppConfig {
    /// Merge the `.local` file of `config_dir`, the environment and `overrides`
    pub fn load(config_dir: &Path, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        for (key, value) in read_local_file(&config_dir.join(LOCAL_FILE))? {
            builder = builder.set_default(key, value)?;
        }

        let environment: config::Map<String, String> = KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();

        let settings = builder
            .add_source(config::Environment::default().source(Some(environment)))
            .build()?;

        let values: HashMap<String, String> = settings.try_deserialize()?;
        Self::from_values(values, overrides)
    }

    /// Build from flat key/value pairs; key lookup ignores case
    pub fn from_values(
        values: HashMap<String, String>,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = values
            .into_iter()
            .map(|(k, v)| (k.to_ascii_uppercase(), v.trim().to_string()))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        let lookup = |override_value: Option<String>, key: &str| {
            override_value
                .filter(|v| !v.is_empty())
                .or_else(|| values.get(key).cloned())
        };

        let timeout = match values.get(TIMEOUT_KEY) {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|_| ConfigError::Invalid {
                key: TIMEOUT_KEY,
                value: raw.clone(),
            })?),
            None => ClientConfig::default().timeout,
        };
        let verify_attempts = match values.get(VERIFY_ATTEMPTS_KEY) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: VERIFY_ATTEMPTS_KEY,
                value: raw.clone(),
            })?,
            None => ClientConfig::default().verify_attempts,
        };

        Ok(Self {
            url: lookup(overrides.url, URL_KEY),
            username: lookup(overrides.username, USERNAME_KEY),
            password: lookup(overrides.password, PASSWORD_KEY).map(SecretString::from),
            site: lookup(overrides.site, SITE_KEY).unwrap_or_default(),
            existing_assets_user_name: values.get(EXISTING_ASSETS_USER_NAME_KEY).cloned(),
            timeout,
            verify_attempts,
            log_level: lookup(overrides.log_level, LOG_LEVEL_KEY),
        })
    }

    /// Base URL and credentials, all three of url, username and password are required
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        let url = self.url.clone().ok_or(ConfigError::Missing(URL_KEY))?;
        let username = self
            .username
            .clone()
            .ok_or(ConfigError::Missing(USERNAME_KEY))?;
        let password = self
            .password
            .as_ref()
            .ok_or(ConfigError::Missing(PASSWORD_KEY))?;

        Ok(Endpoint {
            url,
            credentials: Credentials::new(username, password.expose_secret())
                .with_content_url(self.site.clone()),
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_timeout(self.timeout)
            .with_verify_retries(self.verify_attempts, DEFAULT_VERIFY_DELAY)
    }

    /// Configured log level, `Err` carries the rejected value
    pub fn log_level(&self) -> Result<LevelFilter, String> {
        match &self.log_level {
            None => Ok(DEFAULT_LOG_LEVEL),
            Some(raw) => raw.parse().map_err(|_| raw.clone()),
        }
    }
}

/// Known keys of a `.local` file, a missing file yields nothing
fn read_local_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let entries = dotenvy::from_path_iter(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut pairs = Vec::new();
    for entry in entries {
        let (key, value) = entry.map_err(|e| match e {
            dotenvy::Error::LineParse(..) => ConfigError::Malformed {
                path: path.to_path_buf(),
            },
            source => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;
        if KEYS.contains(&key.to_ascii_uppercase().as_str()) {
            pairs.push((key, value));
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        for key in KEYS {
            // SAFETY: the tests touching the environment are serialized
            unsafe { std::env::remove_var(key) };
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: see clear_env
        unsafe { std::env::set_var(key, value) };
    }

    fn config_dir(contents: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCAL_FILE), contents).unwrap();
        dir
    }

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    #[serial]
    fn test_load_from_local_file() {
        clear_env();
        let dir = config_dir(
            "TABLEAU_URL=https://tableau.example.com/api/3.19\nTABLEAU_USERNAME=admin\nTABLEAU_PASSWORD=hunter2\nTABLEAU_EXISTING_ASSETS_USER_NAME=archive\n",
        );

        let config = AppConfig::load(dir.path(), Overrides::default()).unwrap();
        let endpoint = config.endpoint().unwrap();

        assert_eq!(endpoint.url, "https://tableau.example.com/api/3.19");
        assert_eq!(endpoint.credentials.username, "admin");
        assert_eq!(endpoint.credentials.password_hint(), "h*****2");
        assert_eq!(endpoint.credentials.content_url, "");
        assert_eq!(config.existing_assets_user_name.as_deref(), Some("archive"));
    }

    #[test]
    #[serial]
    fn test_environment_overrides_local_file() {
        clear_env();
        let dir = config_dir("TABLEAU_URL=https://file.example.com\nTABLEAU_USERNAME=file-user\n");
        set_env(URL_KEY, "https://env.example.com");
        set_env(PASSWORD_KEY, "from-env");

        let config = AppConfig::load(dir.path(), Overrides::default()).unwrap();
        let endpoint = config.endpoint().unwrap();
        clear_env();

        assert_eq!(endpoint.url, "https://env.example.com");
        assert_eq!(endpoint.credentials.username, "file-user");
        assert_eq!(endpoint.credentials.password_hint(), "f*****v");
    }

    #[test]
    #[serial]
    fn test_flags_override_environment() {
        clear_env();
        let dir = TempDir::new().unwrap();
        set_env(URL_KEY, "https://env.example.com");
        set_env(USERNAME_KEY, "env-user");
        set_env(PASSWORD_KEY, "env-pass");

        let overrides = Overrides {
            url: Some("https://flag.example.com".to_string()),
            username: Some("flag-user".to_string()),
            ..Overrides::default()
        };
        let config = AppConfig::load(dir.path(), overrides).unwrap();
        let endpoint = config.endpoint().unwrap();
        clear_env();

        assert_eq!(endpoint.url, "https://flag.example.com");
        assert_eq!(endpoint.credentials.username, "flag-user");
        assert_eq!(endpoint.credentials.password_hint(), "e*****s");
    }

    #[test]
    #[serial]
    fn test_missing_file_is_not_an_error() {
        clear_env();
        let dir = TempDir::new().unwrap();

        let config = AppConfig::load(dir.path(), Overrides::default()).unwrap();

        assert!(matches!(
            config.endpoint(),
            Err(ConfigError::Missing(URL_KEY))
        ));
        assert_eq!(config.log_level(), Ok(DEFAULT_LOG_LEVEL));
    }

    #[test]
    #[serial]
    fn test_local_file_keeps_backslashes() {
        clear_env();
        let dir = config_dir(
            "TABLEAU_URL=https://x\nTABLEAU_USERNAME=\"admin\"\nTABLEAU_PASSWORD='pa\\ss$1'\n",
        );

        let config = AppConfig::load(dir.path(), Overrides::default()).unwrap();

        assert_eq!(config.endpoint().unwrap().credentials.username, "admin");
        assert_eq!(
            config.password.as_ref().map(|p| p.expose_secret().to_string()),
            Some("pa\\ss$1".to_string())
        );
    }

    #[test]
    #[serial]
    fn test_malformed_local_file_does_not_echo_values() {
        clear_env();
        let dir = config_dir("TABLEAU_URL=https://x\nTABLEAU_PASSWORD=hunter 2\n");

        let err = AppConfig::load(dir.path(), Overrides::default()).unwrap_err();

        assert!(matches!(err, ConfigError::Malformed { .. }));
        assert!(!err.to_string().contains("hunter"));
    }

    #[test]
    #[serial]
    fn test_local_file_ignores_comments_and_unknown_keys() {
        clear_env();
        let dir = config_dir(
            "# connection\nTABLEAU_URL=https://x\nOTHER_SETTING=1\nLOG_LEVEL=debug\n",
        );

        let config = AppConfig::load(dir.path(), Overrides::default()).unwrap();

        assert_eq!(config.url.as_deref(), Some("https://x"));
        assert_eq!(config.log_level(), Ok(LevelFilter::DEBUG));
    }

    #[test]
    fn test_missing_password_names_the_key() {
        let config = AppConfig::from_values(
            values(&[(URL_KEY, "https://x"), (USERNAME_KEY, "admin")]),
            Overrides::default(),
        )
        .unwrap();

        let err = config.endpoint().unwrap_err();
        assert_eq!(err.to_string(), "missing configuration value TABLEAU_PASSWORD");
    }

    #[test]
    fn test_keys_are_case_insensitive_and_blank_values_ignored() {
        let config = AppConfig::from_values(
            values(&[
                ("tableau_url", "https://x"),
                ("tableau_username", "admin"),
                ("tableau_password", "pw"),
                ("tableau_site", "  "),
            ]),
            Overrides::default(),
        )
        .unwrap();

        let endpoint = config.endpoint().unwrap();
        assert_eq!(endpoint.url, "https://x");
        assert_eq!(endpoint.credentials.content_url, "");
    }

    #[test]
    fn test_client_config_from_values() {
        let config = AppConfig::from_values(
            values(&[(TIMEOUT_KEY, "5"), (VERIFY_ATTEMPTS_KEY, "3")]),
            Overrides::default(),
        )
        .unwrap();

        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.verify_attempts, 3);
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let err = AppConfig::from_values(values(&[(TIMEOUT_KEY, "soon")]), Overrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: TIMEOUT_KEY, .. }));
    }

    #[test]
    fn test_log_level() {
        let parse = |level: &str| {
            AppConfig::from_values(values(&[(LOG_LEVEL_KEY, level)]), Overrides::default())
                .unwrap()
                .log_level()
        };

        assert_eq!(parse("debug"), Ok(LevelFilter::DEBUG));
        assert_eq!(parse("INFO"), Ok(LevelFilter::INFO));
        assert_eq!(parse("chatty"), Err("chatty".to_string()));

        let overridden = AppConfig::from_values(
            values(&[(LOG_LEVEL_KEY, "debug")]),
            Overrides {
                log_level: Some("error".to_string()),
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(overridden.log_level(), Ok(LevelFilter::ERROR));
    }
}
