use thiserror::Error;

/// No usable credential could be produced (load, refresh or consent).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("client secret file {path}: {reason}")]
    ClientSecret { path: String, reason: String },

    #[error("credential store {path}: {reason}")]
    Store { path: String, reason: String },

    #[error("token refresh failed: {0}")]
    Refresh(String),

    #[error("authorization flow failed: {0}")]
    Flow(String),

    #[error("granted scopes do not include {0}")]
    MissingScope(String),
}

/// Listing or fetching messages from the mailbox provider failed.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// A message body could not be decoded into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("message {id}: body is not valid base64url: {source}")]
    Base64 {
        id: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("message {id}: body is not valid UTF-8")]
    Utf8 {
        id: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// The text-generation service did not return a usable summary.
#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("no API key: set openai_api_key in config.toml or OPENAI_API_KEY")]
    MissingApiKey,

    #[error("request to the generation service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed completion: {0}")]
    Malformed(String),
}

/// Errors that abort a whole digest run. Retrieval and extraction failures
/// are absorbed by the pipeline and never surface here.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("summarization failed: {0}")]
    Summarization(#[from] SummarizationError),

    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not write report: {0}")]
    Io(#[from] std::io::Error),
}
