use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::domain::email::MessageId;
use crate::error::RetrievalError;
use crate::mail::message::{ListMessagesResponse, RawMessage};

pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";
pub const UNREAD_QUERY: &str = "is:unread in:inbox";

/// Read access to one mailbox.
pub trait Mailbox {
    /// At most `limit` ids of unread inbox messages, in provider order.
    fn list_unread(&self, limit: u32) -> Result<Vec<MessageId>, RetrievalError>;

    /// Full message structure (headers and body parts).
    fn fetch(&self, id: &str) -> Result<RawMessage, RetrievalError>;
}

/// Gmail REST client authenticated with a bearer access token.
pub struct GmailClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl GmailClient {
    pub fn new(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, RetrievalError> {
        debug!("GET {url} {query:?}");
        let res = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .map_err(|source| RetrievalError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = res.status();
        let text = res.text().map_err(|source| RetrievalError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(RetrievalError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|e| RetrievalError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Mailbox for GmailClient {
    fn list_unread(&self, limit: u32) -> Result<Vec<MessageId>, RetrievalError> {
        let url = format!("{}/users/me/messages", self.base_url);
        let list: ListMessagesResponse = self.get_json(
            &url,
            &[
                ("q", UNREAD_QUERY.to_string()),
                ("maxResults", limit.to_string()),
            ],
        )?;
        Ok(list
            .messages
            .into_iter()
            .map(|m| m.id)
            .take(limit as usize)
            .collect())
    }

    fn fetch(&self, id: &str) -> Result<RawMessage, RetrievalError> {
        let url = format!("{}/users/me/messages/{}", self.base_url, id);
        self.get_json(&url, &[("format", "full".to_string())])
    }
}
