use std::fs;
use std::path::PathBuf;

use crate::auth::credential::Credential;
use crate::error::AuthError;

/// Where the credential lives between runs.
pub trait CredentialStore {
    fn load(&self) -> Result<Option<Credential>, AuthError>;
    fn save(&self, credential: &Credential) -> Result<(), AuthError>;
}

/// JSON file store, by default ~/.config/mail_digest/token.json
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn err(&self, reason: impl ToString) -> AuthError {
        AuthError::Store {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, AuthError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&self.path).map_err(|e| self.err(e))?;
        let credential: Credential = serde_json::from_str(&s).map_err(|e| self.err(e))?;
        Ok(Some(credential))
    }

    fn save(&self, credential: &Credential) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.err(e))?;
        }
        let s = serde_json::to_string_pretty(credential).map_err(|e| self.err(e))?;
        fs::write(&self.path, s).map_err(|e| self.err(e))?;
        Ok(())
    }
}
