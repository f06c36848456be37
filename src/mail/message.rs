//! Gmail API v1 resources, limited to the fields the digest reads.

use serde::{Deserialize, Serialize};

use crate::domain::email::MessageId;

/// `users.messages.list` response. `messages` is omitted entirely when
/// nothing matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesResponse {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    pub next_page_token: Option<String>,
    pub result_size_estimate: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: MessageId,
    pub thread_id: Option<String>,
}

/// `users.messages.get` with `format=full`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: MessageId,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub payload: MessagePart,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub part_id: Option<String>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: PartBody,
    /// `None` for a single-part message, as opposed to an empty list.
    #[serde(default)]
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    #[serde(default)]
    pub size: u64,
    /// base64url-encoded content
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub attachment_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_response() {
        let r: ListMessagesResponse = serde_json::from_str(r#"{"resultSizeEstimate":0}"#).unwrap();
        assert!(r.messages.is_empty());
        assert_eq!(r.result_size_estimate, Some(0));
    }

    #[test]
    fn full_message_distinguishes_single_part() {
        let single: RawMessage = serde_json::from_str(
            r#"{"id":"a1","payload":{"mimeType":"text/plain","headers":[],"body":{"size":5,"data":"SGVsbG8="}}}"#,
        )
        .unwrap();
        assert!(single.payload.parts.is_none());
        assert_eq!(single.payload.body.data.as_deref(), Some("SGVsbG8="));

        let multi: RawMessage = serde_json::from_str(
            r#"{"id":"b2","threadId":"t","labelIds":["UNREAD","INBOX"],
                "payload":{"mimeType":"multipart/alternative","body":{"size":0},
                "parts":[{"partId":"0","mimeType":"text/plain","body":{"size":0}}]}}"#,
        )
        .unwrap();
        assert_eq!(multi.label_ids, vec!["UNREAD", "INBOX"]);
        assert_eq!(multi.payload.parts.as_ref().map(Vec::len), Some(1));
    }
}
