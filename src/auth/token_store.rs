use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};

const SERVICE: &str = "inbox_triage";

fn entry(key: &str) -> Result<Entry> {
    Entry::new(SERVICE, key).map_err(|e| anyhow!("keyring entry {key}: {e}"))
}

fn save(key: &str, secret: &str) -> Result<()> {
    entry(key)?
        .set_password(secret)
        .map_err(|e| anyhow!("keyring write {key}: {e}"))
}

fn load(key: &str) -> Result<Option<String>> {
    match entry(key)?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(anyhow!("keyring read {key}: {e}")),
    }
}

fn remove(key: &str) -> Result<bool> {
    match entry(key)?.delete_credential() {
        Ok(()) => Ok(true),
        Err(KeyringError::NoEntry) => Ok(false),
        Err(e) => Err(anyhow!("keyring delete {key}: {e}")),
    }
}

/// Refresh tokens are keyed by the account's email address.
pub fn save_refresh_token(user_email: &str, refresh_token: &str) -> Result<()> {
    save(user_email, refresh_token)
}

pub fn load_refresh_token(user_email: &str) -> Result<Option<String>> {
    load(user_email)
}

pub fn delete_refresh_token(user_email: &str) -> Result<bool> {
    remove(user_email)
}

/// Client secrets are keyed by the OAuth client id.
pub fn save_client_secret(client_id: &str, client_secret: &str) -> Result<()> {
    save(client_id, client_secret)
}

pub fn load_client_secret(client_id: &str) -> Result<Option<String>> {
    load(client_id)
}
