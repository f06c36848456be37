use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::AuthError;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client registration as downloaded from the Google Cloud console
/// (credentials.json). Desktop apps ship an `installed` section, web apps a
/// `web` section; both carry the same fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ClientSecrets {
    pub fn from_json(s: &str) -> Result<Self, String> {
        let file: ClientSecretsFile = serde_json::from_str(s).map_err(|e| e.to_string())?;
        let secrets = file
            .installed
            .or(file.web)
            .ok_or_else(|| "expected an \"installed\" or \"web\" section".to_string())?;
        if secrets.client_id.trim().is_empty() {
            return Err("client_id is empty".to_string());
        }
        Ok(secrets)
    }

    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let err = |reason: String| AuthError::ClientSecret {
            path: path.display().to_string(),
            reason,
        };
        let s = fs::read_to_string(path).map_err(|e| err(e.to_string()))?;
        Self::from_json(&s).map_err(err)
    }
}
