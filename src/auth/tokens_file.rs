use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::config_dir;

/// Non-secret access token cache stored in ~/.config/inbox_triage/tokens.json
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CachedToken {
    pub access_token: Option<String>,
    pub expires_at_epoch: Option<i64>, // epoch seconds
}

impl CachedToken {
    /// The access token, if one is cached and still valid at `now`.
    pub fn valid_at(&self, now: i64) -> Option<&str> {
        match (&self.access_token, self.expires_at_epoch) {
            (Some(at), Some(exp)) if now < exp => Some(at.as_str()),
            _ => None,
        }
    }
}

pub fn tokens_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("tokens.json"))
}

pub fn save_to(path: &Path, token: &CachedToken) -> Result<()> {
    let s = serde_json::to_string_pretty(token)?;
    fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn load_from(path: &Path) -> Result<Option<CachedToken>> {
    if !path.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(path)?;
    let token = serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(token))
}

pub fn save(token: &CachedToken) -> Result<()> {
    save_to(&tokens_path()?, token)
}

pub fn load() -> Result<Option<CachedToken>> {
    load_from(&tokens_path()?)
}

/// Removes the cache file; returns whether one existed.
pub fn clear() -> Result<bool> {
    let p = tokens_path()?;
    if !p.exists() {
        return Ok(false);
    }
    fs::remove_file(&p)?;
    Ok(true)
}
