use log::{debug, info, warn};
use oauth2::TokenResponse;
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::reqwest::http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge, RedirectUrl,
    RefreshToken, Scope, TokenUrl,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tiny_http::{Response, Server};
use url::Url;

use crate::auth::client_secret::ClientSecrets;
use crate::auth::credential::Tokens;
use crate::auth::token_manager::{AuthorizationFlow, TokenRefresher};
use crate::error::AuthError;

const CONSENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Google OAuth installed-app client. The client secret file is read lazily so
/// a run with a still-valid cached credential never needs it.
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    client_secret_path: PathBuf,
    redirect_uri: String,
}

impl GoogleOAuth {
    pub fn new(client_secret_path: impl Into<PathBuf>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_secret_path: client_secret_path.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    fn client(&self) -> Result<BasicClient, AuthError> {
        let secrets = ClientSecrets::load(&self.client_secret_path)?;
        let bad_uri = |e: oauth2::url::ParseError| AuthError::ClientSecret {
            path: self.client_secret_path.display().to_string(),
            reason: e.to_string(),
        };

        let auth_url = AuthUrl::new(secrets.auth_uri).map_err(bad_uri)?;
        let token_url = TokenUrl::new(secrets.token_uri).map_err(bad_uri)?;

        Ok(BasicClient::new(
            ClientId::new(secrets.client_id),
            secrets.client_secret.map(ClientSecret::new),
            auth_url,
            Some(token_url),
        ))
    }
}

fn into_tokens(token: BasicTokenResponse) -> Tokens {
    Tokens {
        access_token: token.access_token().secret().to_string(),
        refresh_token: token.refresh_token().map(|r| r.secret().to_string()),
        expires_in: token.expires_in().map(|d| d.as_secs()),
        scopes: token
            .scopes()
            .map(|s| s.iter().map(|scope| scope.as_str().to_string()).collect()),
    }
}

impl TokenRefresher for GoogleOAuth {
    /// Exchange a refresh token for a new access token using the oauth2 crate
    fn refresh(&self, refresh_token: &str) -> Result<Tokens, AuthError> {
        let oauth_client = self.client()?;
        let rt = RefreshToken::new(refresh_token.to_string());
        let token = oauth_client
            .exchange_refresh_token(&rt)
            .request(http_client)
            .map_err(|err| {
                debug!("Token refresh failed: {err:#?}");
                AuthError::Refresh(err.to_string())
            })?;
        Ok(into_tokens(token))
    }
}

impl AuthorizationFlow for GoogleOAuth {
    /// Authorization Code + PKCE flow. Opens the system browser and captures
    /// the code via a tiny loopback server.
    fn authorize(&self, scopes: &[&str]) -> Result<Tokens, AuthError> {
        let redirect = Url::parse(&self.redirect_uri).map_err(|e| {
            AuthError::Flow(format!("invalid redirect_uri '{}': {e}", self.redirect_uri))
        })?;
        let host = redirect
            .host_str()
            .ok_or_else(|| AuthError::Flow(format!("redirect_uri missing host: {redirect}")))?
            .to_string();
        let port = redirect.port_or_known_default().ok_or_else(|| {
            AuthError::Flow(format!("redirect_uri missing/unknown port: {redirect}"))
        })?;

        // loopback only
        let bind_ip: IpAddr = match host.as_str() {
            "localhost" | "127.0.0.1" => IpAddr::V4(Ipv4Addr::LOCALHOST),
            other => other.parse::<IpAddr>().map_err(|_| {
                AuthError::Flow(format!(
                    "redirect_uri host must be localhost/127.0.0.1 or an IP: {other}"
                ))
            })?,
        };
        let bind_addr = SocketAddr::new(bind_ip, port);

        let oauth_client = self.client()?.set_redirect_uri(
            RedirectUrl::new(self.redirect_uri.clone())
                .map_err(|e| AuthError::Flow(e.to_string()))?,
        );

        // Listen before sending the user to the consent page.
        let server = Server::http(bind_addr).map_err(|e| {
            AuthError::Flow(format!(
                "failed to bind OAuth callback server on {bind_addr}: {e}"
            ))
        })?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_token) = oauth_client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(scopes.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("access_type", "offline")
            .set_pkce_challenge(pkce_challenge)
            .url();

        println!("Open this URL in your browser:\n{auth_url}");
        if let Err(e) = open::that(auth_url.as_str()) {
            warn!("could not open browser automatically: {e}");
        }

        let code = wait_for_code(&server, &host, port, csrf_token.secret(), CONSENT_TIMEOUT)?;

        let token = oauth_client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request(http_client)
            .map_err(|err| {
                debug!("Token exchange failed: {err:#?}");
                AuthError::Flow(format!("token exchange failed: {err}"))
            })?;

        info!("authorization granted");
        Ok(into_tokens(token))
    }
}

fn wait_for_code(
    server: &Server,
    host: &str,
    port: u16,
    expected_state: &str,
    timeout: Duration,
) -> Result<String, AuthError> {
    let wait_until = Instant::now() + timeout;

    while Instant::now() < wait_until {
        let Ok(maybe_request) = server.recv_timeout(Duration::from_millis(500)) else {
            continue;
        };
        let Some(request) = maybe_request else {
            continue;
        };

        // request.url() is a path+query like "/callback?code=...&state=..."
        let full = format!("http://{}:{}{}", host, port, request.url());
        let parsed = match Url::parse(&full) {
            Ok(p) => p,
            Err(_) => {
                let _ = request.respond(Response::from_string("Bad redirect"));
                continue;
            }
        };

        match parse_callback(&parsed, expected_state) {
            Callback::Code(code) => {
                let _ = request.respond(Response::from_string(
                    "Authorization received. You can close this tab.",
                ));
                return Ok(code);
            }
            Callback::Denied(reason) => {
                let _ = request.respond(Response::from_string(
                    "Authorization was not granted. You can close this tab.",
                ));
                return Err(AuthError::Flow(format!("consent denied: {reason}")));
            }
            Callback::Ignored => {
                let _ = request.respond(Response::from_string(
                    "No code found in redirect. You can close this tab.",
                ));
            }
        }
    }

    Err(AuthError::Flow("no code received within timeout".into()))
}

#[derive(Debug, PartialEq, Eq)]
enum Callback {
    Code(String),
    Denied(String),
    Ignored,
}

fn parse_callback(url: &Url, expected_state: &str) -> Callback {
    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            "error" => error = Some(v.into_owned()),
            _ => {}
        }
    }

    if let Some(e) = error {
        return Callback::Denied(e);
    }
    match (code, state) {
        (Some(code), Some(state)) if state == expected_state => Callback::Code(code),
        (Some(_), _) => Callback::Denied("state mismatch".into()),
        _ => Callback::Ignored,
    }
}
