use anyhow::{Result, anyhow};
use log::{info, warn};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::reqwest::http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tiny_http::{Response, Server};
use url::Url;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Full mailbox scope; permanent deletion is not allowed under gmail.modify.
pub const GMAIL_SCOPE: &str = "https://mail.google.com/";

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Tokens returned by the oauth flow (in-memory)
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

impl From<BasicTokenResponse> for Tokens {
    fn from(token: BasicTokenResponse) -> Self {
        Self {
            access_token: token.access_token().secret().to_string(),
            refresh_token: token.refresh_token().map(|r| r.secret().to_string()),
            expires_in: token.expires_in().map(|d| d.as_secs()),
        }
    }
}

fn google_client(client_id: &str, client_secret: Option<&str>) -> Result<BasicClient> {
    Ok(BasicClient::new(
        ClientId::new(client_id.to_string()),
        client_secret.map(|s| ClientSecret::new(s.to_string())),
        AuthUrl::new(GOOGLE_AUTH_URL.to_string())?,
        Some(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?),
    ))
}

/// Exchange a refresh token for a new access token.
pub fn refresh_access_token(
    client_id: &str,
    client_secret: Option<&str>,
    refresh_token: &str,
) -> Result<Tokens> {
    let token = google_client(client_id, client_secret)?
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request(http_client)
        .map_err(|e| anyhow!("refresh token exchange failed: {e}"))?;
    Ok(token.into())
}

/// Loopback address to listen on for the given redirect uri.
fn callback_addr(redirect: &Url) -> Result<SocketAddr> {
    let host = redirect
        .host_str()
        .ok_or_else(|| anyhow!("redirect_uri missing host: {redirect}"))?;
    let port = redirect
        .port_or_known_default()
        .ok_or_else(|| anyhow!("redirect_uri missing/unknown port: {redirect}"))?;
    let ip: IpAddr = match host {
        "localhost" | "127.0.0.1" => IpAddr::V4(Ipv4Addr::LOCALHOST),
        other => other.parse().map_err(|_| {
            anyhow!("redirect_uri host must be localhost/127.0.0.1 or an IP: {other}")
        })?,
    };
    Ok(SocketAddr::new(ip, port))
}

/// Pulls `code` out of a redirect request path, checking the CSRF state when present.
fn code_from_callback(redirect: &Url, path: &str, csrf: &CsrfToken) -> Result<Option<String>> {
    let full = redirect.join(path)?;
    let mut code = None;
    for (k, v) in full.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "state" if v != *csrf.secret() => return Err(anyhow!("OAuth state mismatch")),
            "error" => return Err(anyhow!("authorization denied: {v}")),
            _ => {}
        }
    }
    Ok(code)
}

fn wait_for_code(server: &Server, redirect: &Url, csrf: &CsrfToken) -> Result<String> {
    let deadline = Instant::now() + CALLBACK_TIMEOUT;
    while Instant::now() < deadline {
        let Ok(Some(request)) = server.recv_timeout(Duration::from_millis(500)) else {
            continue;
        };
        match code_from_callback(redirect, request.url(), csrf) {
            Ok(Some(code)) => {
                let _ = request.respond(Response::from_string(
                    "Authorization received. You can close this tab.",
                ));
                return Ok(code);
            }
            Ok(None) => {
                let _ = request.respond(Response::from_string("No code found in redirect."));
            }
            Err(e) => {
                let _ = request.respond(Response::from_string(e.to_string()));
                return Err(e);
            }
        }
    }
    Err(anyhow!("No code received within timeout"))
}

/// Authorization Code + PKCE flow. Opens the system browser and captures the code on a
/// loopback server bound to `redirect_uri`.
pub fn perform_pkce_flow(
    client_id: &str,
    client_secret: Option<&str>,
    redirect_uri: &str,
) -> Result<Tokens> {
    let redirect = Url::parse(redirect_uri)
        .map_err(|e| anyhow!("Invalid redirect_uri '{redirect_uri}': {e}"))?;
    let bind_addr = callback_addr(&redirect)?;

    // listen before the browser can redirect
    let server = Server::http(bind_addr)
        .map_err(|e| anyhow!("Failed to bind OAuth callback server on {bind_addr}: {e:?}"))?;

    let client = google_client(client_id, client_secret)?
        .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string())?);

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let (auth_url, csrf) = client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new(GMAIL_SCOPE.to_string()))
        .add_extra_param("access_type", "offline")
        .add_extra_param("prompt", "consent")
        .set_pkce_challenge(pkce_challenge)
        .url();

    println!("Open this URL in your browser:\n{auth_url}");
    if let Err(e) = open::that(auth_url.as_str()) {
        warn!("could not open browser automatically: {e}");
    }

    let code = wait_for_code(&server, &redirect, &csrf)?;
    info!("Authorization code received, exchanging for tokens");

    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(pkce_verifier)
        .request(http_client)
        .map_err(|e| anyhow!("Token exchange failed: {e:?}"))?;
    Ok(token.into())
}
