pub mod client_secret;
pub mod credential;
pub mod oauth;
pub mod token_manager;
pub mod token_store;

pub use credential::{Credential, GMAIL_READONLY_SCOPE, Tokens};
pub use token_manager::{AuthorizationFlow, TokenManager, TokenRefresher};
pub use token_store::{CredentialStore, FileCredentialStore};
