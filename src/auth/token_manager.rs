use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::auth::credential::{Credential, Tokens};
use crate::auth::oauth::GoogleOAuth;
use crate::auth::token_store::{CredentialStore, FileCredentialStore};
use crate::config::Config;
use crate::error::AuthError;

/// Silent renewal against the provider's token endpoint.
pub trait TokenRefresher {
    fn refresh(&self, refresh_token: &str) -> Result<Tokens, AuthError>;
}

/// One-time interactive consent, used only when nothing cached is usable.
pub trait AuthorizationFlow {
    fn authorize(&self, scopes: &[&str]) -> Result<Tokens, AuthError>;
}

pub struct TokenManager {
    store: Box<dyn CredentialStore>,
    refresher: Box<dyn TokenRefresher>,
    flow: Box<dyn AuthorizationFlow>,
}

impl TokenManager {
    pub fn new(
        store: Box<dyn CredentialStore>,
        refresher: Box<dyn TokenRefresher>,
        flow: Box<dyn AuthorizationFlow>,
    ) -> Self {
        Self {
            store,
            refresher,
            flow,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let store = FileCredentialStore::new(cfg.token_path()?);
        let oauth = GoogleOAuth::new(cfg.client_secret_path()?, cfg.redirect_uri());
        Ok(Self::new(
            Box::new(store),
            Box::new(oauth.clone()),
            Box::new(oauth),
        ))
    }

    /// Replaces the consent flow with one built around the current flow.
    pub fn wrap_flow(
        mut self,
        wrap: impl FnOnce(Box<dyn AuthorizationFlow>) -> Box<dyn AuthorizationFlow>,
    ) -> Self {
        self.flow = wrap(self.flow);
        self
    }

    /// Returns a credential covering `scopes`; refreshes or runs the consent
    /// flow if needed. Writes the store only when the credential changed.
    pub fn obtain_credential(&self, scopes: &[&str]) -> Result<Credential, AuthError> {
        self.obtain_credential_at(scopes, Utc::now())
    }

    pub fn obtain_credential_at(
        &self,
        scopes: &[&str],
        now: DateTime<Utc>,
    ) -> Result<Credential, AuthError> {
        let cached = match self.store.load() {
            Ok(c) => c,
            Err(e) => {
                warn!("ignoring unreadable credential: {e}");
                None
            }
        };

        // 1) cached & not expired
        if let Some(cred) = cached {
            if cred.is_valid(now, scopes) {
                info!("using cached access token");
                return Ok(cred);
            }

            // 2) refresh if possible
            if cred.covers(scopes) && cred.can_refresh() {
                if let Some(renewed) = self.try_refresh(&cred, scopes, now) {
                    self.store.save(&renewed)?;
                    info!("refreshed access token");
                    return Ok(renewed);
                }
            } else if !cred.covers(scopes) {
                info!("cached credential lacks requested scopes; asking for consent");
            }
        }

        // 3) otherwise interactive consent
        info!("running interactive authorization flow");
        let tokens = self.flow.authorize(scopes)?;
        let granted = tokens.into_credential(owned(scopes), None, now);
        ensure_scopes(&granted, scopes)?;
        self.store.save(&granted)?;
        Ok(granted)
    }

    fn try_refresh(
        &self,
        cred: &Credential,
        scopes: &[&str],
        now: DateTime<Utc>,
    ) -> Option<Credential> {
        let rt = cred.refresh_token.as_deref()?;
        let renewed = match self.refresher.refresh(rt) {
            Ok(t) => t.into_credential(cred.scopes.clone(), cred.refresh_token.clone(), now),
            Err(e) => {
                warn!("refresh failed: {e}, falling back to interactive auth");
                return None;
            }
        };
        match ensure_scopes(&renewed, scopes) {
            Ok(()) => Some(renewed),
            Err(e) => {
                warn!("refreshed token unusable: {e}, falling back to interactive auth");
                None
            }
        }
    }
}

fn owned(scopes: &[&str]) -> Vec<String> {
    scopes.iter().map(|s| s.to_string()).collect()
}

fn ensure_scopes(cred: &Credential, scopes: &[&str]) -> Result<(), AuthError> {
    match scopes.iter().find(|s| !cred.covers(&[**s])) {
        Some(missing) => Err(AuthError::MissingScope(missing.to_string())),
        None => Ok(()),
    }
}
