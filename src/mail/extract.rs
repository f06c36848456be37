use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::domain::email::ExtractedEmail;
use crate::error::ExtractionError;
use crate::mail::message::{Header, MessagePart, RawMessage};

pub const MAX_BODY_CHARS: usize = 500;
pub const TRUNCATION_MARKER: &str = "...";
pub const NO_SUBJECT: &str = "No Subject";
pub const UNKNOWN_SENDER: &str = "Unknown";
pub const EMPTY_BODY: &str = "No text content available";

const PLAIN_TEXT: &str = "text/plain";

// Gmail emits base64url, sometimes without padding.
const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Pull sender, subject and a bounded plain-text body out of a full message.
pub fn extract(message: &RawMessage) -> Result<ExtractedEmail, ExtractionError> {
    let headers = &message.payload.headers;
    let subject = first_header(headers, "Subject").unwrap_or(NO_SUBJECT);
    let sender = first_header(headers, "From").unwrap_or(UNKNOWN_SENDER);

    let data = match &message.payload.parts {
        Some(parts) => parts
            .iter()
            .filter(|p| p.mime_type == PLAIN_TEXT)
            .find_map(body_data),
        None => body_data(&message.payload),
    };

    let body = match data {
        Some(d) => decode_body(&message.id, d)?,
        None => String::new(),
    };

    Ok(ExtractedEmail {
        sender: sender.to_string(),
        subject: subject.to_string(),
        body: finish_body(&body),
    })
}

/// First header with exactly this name; blank values count as absent.
fn first_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name == name)
        .map(|h| h.value.as_str())
        .filter(|v| !v.trim().is_empty())
}

fn body_data(part: &MessagePart) -> Option<&str> {
    part.body.data.as_deref().filter(|d| !d.is_empty())
}

fn decode_body(id: &str, data: &str) -> Result<String, ExtractionError> {
    let bytes = BASE64URL
        .decode(data.trim())
        .map_err(|source| ExtractionError::Base64 {
            id: id.to_string(),
            source,
        })?;
    String::from_utf8(bytes).map_err(|source| ExtractionError::Utf8 {
        id: id.to_string(),
        source,
    })
}

fn finish_body(body: &str) -> String {
    if body.is_empty() {
        return EMPTY_BODY.to_string();
    }
    truncate_body(body)
}

/// Cut to the first `MAX_BODY_CHARS` characters and mark the cut.
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}{}", &body[..idx], TRUNCATION_MARKER),
        None => body.to_string(),
    }
}
