use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::domain::email::ExtractedEmail;
use crate::error::SummarizationError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Turns one extracted message into a short report entry.
pub trait Summarizer {
    fn summarize(&self, email: &ExtractedEmail) -> Result<String, SummarizationError>;
}

pub fn build_prompt(email: &ExtractedEmail) -> String {
    format!(
        "Summarize this email briefly for a daily report:\nFrom: {}\nSubject: {}\nBody: {}",
        email.sender, email.subject, email.body
    )
}

/// OpenAI-compatible chat completions client.
#[derive(Debug)]
pub struct OpenAiSummarizer {
    http: Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl OpenAiSummarizer {
    pub fn new(
        api_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SummarizationError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(SummarizationError::MissingApiKey)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            model: model.into(),
            api_key,
        })
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, email: &ExtractedEmail) -> Result<String, SummarizationError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": build_prompt(email)}
            ]
        });

        debug!("POST {} (model {})", self.api_url, self.model);
        let res = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = res.status();
        let text = res.text()?;
        if !status.is_success() {
            return Err(SummarizationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_completion(&text)
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// First choice's content, whitespace-trimmed.
fn parse_completion(text: &str) -> Result<String, SummarizationError> {
    let completion: ChatCompletion =
        serde_json::from_str(text).map_err(|e| SummarizationError::Malformed(e.to_string()))?;
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| SummarizationError::Malformed("no choices returned".into()))?;
    let content = choice
        .message
        .content
        .ok_or_else(|| SummarizationError::Malformed("choice has no content".into()))?;
    Ok(content.trim().to_string())
}
