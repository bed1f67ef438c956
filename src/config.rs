use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
pub const DEFAULT_USER_ID: &str = "me";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub client_id: String,
    pub user_email: Option<String>,
    pub redirect_uri: Option<String>,
    /// Gmail API user id; "me" addresses the authenticated account.
    pub user_id: Option<String>,
}

impl Config {
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uri.as_deref().unwrap_or(DEFAULT_REDIRECT_URI)
    }

    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or(DEFAULT_USER_ID)
    }

    fn template() -> Self {
        Self {
            client_id: "YOUR_CLIENT_ID.apps.googleusercontent.com".to_string(),
            user_email: Some("you@example.com".to_string()),
            redirect_uri: Some(DEFAULT_REDIRECT_URI.to_string()),
            user_id: Some(DEFAULT_USER_ID.to_string()),
        }
    }
}

/// ~/.config/inbox_triage, created on first use.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("inbox_triage");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Reads the config at `path`; writes a template there and fails if it is missing.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let tom = toml::to_string_pretty(&Config::template())?;
        fs::write(path, tom)?;
        anyhow::bail!(
            "Created template config at {}, edit it and run again",
            path.display()
        );
    }
    let s = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&s).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Created template config"));
        assert!(path.exists());

        // the template itself parses
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.client_id, "YOUR_CLIENT_ID.apps.googleusercontent.com");
        assert_eq!(cfg.user_id(), "me");
    }

    #[test]
    fn optional_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "client_id = \"abc\"\nuser_email = \"a@b.c\"\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.client_id, "abc");
        assert_eq!(cfg.user_email.as_deref(), Some("a@b.c"));
        assert_eq!(cfg.redirect_uri(), DEFAULT_REDIRECT_URI);
        assert_eq!(cfg.user_id(), DEFAULT_USER_ID);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "client_id = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
