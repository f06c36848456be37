use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Read-only mailbox access; every credential must carry it.
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

// Treat tokens this close to expiry as already expired.
const EXPIRY_SKEW_SECS: i64 = 60;
const DEFAULT_EXPIRES_IN_SECS: u64 = 3500;

/// Persisted authorization, stored as token.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "token")]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Credential {
    /// A credential without a known expiry is never trusted as fresh.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(exp) => now + Duration::seconds(EXPIRY_SKEW_SECS) >= exp,
            None => true,
        }
    }

    pub fn covers(&self, scopes: &[&str]) -> bool {
        scopes
            .iter()
            .all(|wanted| self.scopes.iter().any(|granted| granted == wanted))
    }

    pub fn is_valid(&self, now: DateTime<Utc>, scopes: &[&str]) -> bool {
        !self.is_expired(now) && self.covers(scopes)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

/// Tokens returned by the provider's token endpoint (in-memory)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scopes: Option<Vec<String>>,
}

impl Tokens {
    /// Providers usually omit the refresh token and scope on renewal, so the
    /// caller supplies what the previous credential carried.
    pub fn into_credential(
        self,
        fallback_scopes: Vec<String>,
        fallback_refresh: Option<String>,
        now: DateTime<Utc>,
    ) -> Credential {
        // out-of-range lifetimes are treated as absent
        let expiry = self
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or_else(|| now + Duration::seconds(DEFAULT_EXPIRES_IN_SECS as i64));
        Credential {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(fallback_refresh),
            expiry: Some(expiry),
            scopes: self
                .scopes
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback_scopes),
        }
    }
}
