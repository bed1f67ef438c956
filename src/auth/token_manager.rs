use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::oauth::{self, Tokens};
use crate::auth::tokens_file::{self, CachedToken};
use crate::auth::token_store;
use crate::config::Config;
use crate::gmail::TokenSource;

/// Lifetime assumed when the provider omits `expires_in`.
const FALLBACK_LIFETIME_SECS: i64 = 3500;

#[derive(Clone)]
pub struct TokenManager {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub user_email: String,
}

fn now_epoch() -> Result<i64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64)
}

impl TokenManager {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let user_email = cfg
            .user_email
            .clone()
            .ok_or_else(|| anyhow!("user_email not set in config"))?;
        let client_secret = token_store::load_client_secret(&cfg.client_id)?
            .or_else(|| std::env::var("OAUTH_CLIENT_SECRET").ok());

        Ok(Self {
            client_id: cfg.client_id.clone(),
            client_secret,
            redirect_uri: cfg.redirect_uri().to_string(),
            user_email,
        })
    }

    /// Returns a valid access token: cached, refreshed, or from an interactive PKCE flow.
    pub fn get_access_token(&self) -> Result<String> {
        let now = now_epoch()?;

        if let Some(cached) = tokens_file::load()?
            && let Some(at) = cached.valid_at(now)
        {
            debug!("using cached access token");
            return Ok(at.to_string());
        }

        let tokens = match token_store::load_refresh_token(&self.user_email)? {
            Some(rt) => {
                info!("Access token expired or missing; refreshing");
                match oauth::refresh_access_token(
                    &self.client_id,
                    self.client_secret.as_deref(),
                    &rt,
                ) {
                    Ok(t) => t,
                    Err(e) => {
                        warn!("Refresh failed: {e}, falling back to interactive auth");
                        self.interactive()?
                    }
                }
            }
            None => {
                info!("No refresh token stored; running interactive PKCE auth flow");
                self.interactive()?
            }
        };

        self.persist(&tokens, now);
        Ok(tokens.access_token)
    }

    fn interactive(&self) -> Result<Tokens> {
        oauth::perform_pkce_flow(
            &self.client_id,
            self.client_secret.as_deref(),
            &self.redirect_uri,
        )
    }

    /// Best-effort: a session can proceed without a persisted token.
    fn persist(&self, tokens: &Tokens, now: i64) {
        if let Some(rt) = &tokens.refresh_token {
            match token_store::save_refresh_token(&self.user_email, rt) {
                Ok(()) => info!("Saved refresh token into keyring for {}", self.user_email),
                Err(e) => warn!("couldn't save refresh token to keyring: {e}"),
            }
        }
        let lifetime = tokens
            .expires_in
            .map(|s| s as i64)
            .unwrap_or(FALLBACK_LIFETIME_SECS);
        let cached = CachedToken {
            access_token: Some(tokens.access_token.clone()),
            expires_at_epoch: Some(now + lifetime),
        };
        if let Err(e) = tokens_file::save(&cached) {
            warn!("couldn't save token cache: {e}");
        }
    }

    /// Drops the cached access token and the stored refresh token.
    pub fn logout(&self) -> Result<()> {
        if tokens_file::clear()? {
            info!("Removed cached access token");
        }
        if token_store::delete_refresh_token(&self.user_email)? {
            info!("Removed refresh token for {}", self.user_email);
        }
        Ok(())
    }
}

impl TokenSource for TokenManager {
    fn access_token(&self) -> Result<String> {
        self.get_access_token()
    }
}
