use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use directories_next::ProjectDirs;
use serde::Deserialize;
use tracing::info;

/// Secret used when nothing else is configured. Tokens signed with it are
/// only fit for local testing.
pub const DEFAULT_SECRET: &str = "this_is_a_secret_key_for_jwt_validation";

/// Prefix for environment variable overrides, e.g. `JOTBIN_PORT`.
const ENV_PREFIX: &str = "JOTBIN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Public host (and optional port) used in token issuers and paste links.
    pub domain: String,
    pub port: u16,
    pub listen_addr: IpAddr,
    pub secret: String,
    /// Directory holding one JSON document per paste.
    pub directory: PathBuf,
    pub limits: Limits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_upload_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            domain: "localhost:5001".to_owned(),
            port: 5001,
            listen_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            secret: DEFAULT_SECRET.to_owned(),
            directory: default_directory(),
            limits: Limits::default(),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_upload_size: 1024 * 1024,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    ///
    /// A missing file is only an error when `required` is set, i.e. when the
    /// path was given explicitly on the command line.
    pub fn load(path: &Path, required: bool) -> anyhow::Result<Self> {
        let mut config = if path.exists() || required {
            info!("reading config from {}", path.display());
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            Self::from_toml(&text)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            info!("no config file at {}, using defaults", path.display());
            Config::default()
        };

        config.apply_env(|name| env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from `JOTBIN_*` variables as resolved by `lookup`.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        let var = |suffix: &str| {
            let name = format!("{ENV_PREFIX}_{suffix}");
            lookup(&name).map(|value| (name, value))
        };

        if let Some((_, domain)) = var("DOMAIN") {
            self.domain = domain;
        }
        if let Some((name, port)) = var("PORT") {
            self.port = parse_var(&name, &port)?;
        }
        if let Some((name, addr)) = var("LISTEN_ADDR") {
            self.listen_addr = parse_var(&name, &addr)?;
        }
        if let Some((_, secret)) = var("SECRET") {
            self.secret = secret;
        }
        if let Some((_, dir)) = var("DIRECTORY") {
            self.directory = dir.into();
        }

        Ok(())
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

fn parse_var<T>(name: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value `{value}` for {name}"))
}

fn default_directory() -> PathBuf {
    ProjectDirs::from("", "", "jotbin")
        .map(|dirs| dirs.data_dir().join("paste-data"))
        .unwrap_or_else(|| PathBuf::from("paste-data"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.domain, "localhost:5001");
        assert_eq!(config.port, 5001);
        assert!(config.uses_default_secret());
        assert_eq!(config.limits.max_upload_size, 1024 * 1024);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            domain = "paste.example.org"
            directory = "/srv/pastes"

            [limits]
            max_upload_size = 4096
            "#,
        )
        .unwrap();

        assert_eq!(config.domain, "paste.example.org");
        assert_eq!(config.directory, PathBuf::from("/srv/pastes"));
        assert_eq!(config.limits.max_upload_size, 4096);
        assert_eq!(config.port, 5001);
    }

    #[test]
    fn env_overrides_file_values() {
        let vars: HashMap<&str, &str> = [
            ("JOTBIN_DOMAIN", "example.net"),
            ("JOTBIN_PORT", "8080"),
            ("JOTBIN_LISTEN_ADDR", "0.0.0.0"),
            ("JOTBIN_SECRET", "hunter2hunter2hunter2hunter2hunter2"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.domain, "example.net");
        assert_eq!(config.port, 8080);
        assert_eq!(config.listen_addr, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn bad_env_port_is_an_error() {
        let mut config = Config::default();
        let err = config
            .apply_env(|name| (name == "JOTBIN_PORT").then(|| "eighty".to_owned()))
            .unwrap_err();
        assert!(err.to_string().contains("JOTBIN_PORT"));
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join("nope.toml"), true).is_err());
    }
}
