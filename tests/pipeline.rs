use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{Local, NaiveDate};
use serde_json::json;

use mail_digest::domain::email::{ExtractedEmail, MessageId};
use mail_digest::error::{DigestError, RetrievalError, SummarizationError};
use mail_digest::mail::gmail::Mailbox;
use mail_digest::mail::message::RawMessage;
use mail_digest::pipeline::{DigestPipeline, RunStatus};
use mail_digest::report::{NO_UNREAD_MESSAGE, heading};
use mail_digest::summarize::Summarizer;

struct FakeMailbox {
    order: Vec<MessageId>,
    messages: HashMap<MessageId, RawMessage>,
    fail_listing: bool,
    fail_fetch_of: Option<MessageId>,
    fetches: Cell<usize>,
}

impl FakeMailbox {
    fn new(messages: Vec<RawMessage>) -> Self {
        Self {
            order: messages.iter().map(|m| m.id.clone()).collect(),
            messages: messages.into_iter().map(|m| (m.id.clone(), m)).collect(),
            fail_listing: false,
            fail_fetch_of: None,
            fetches: Cell::new(0),
        }
    }
}

fn unavailable(url: &str) -> RetrievalError {
    RetrievalError::Status {
        url: url.to_string(),
        status: 503,
        body: "backend error".into(),
    }
}

impl Mailbox for FakeMailbox {
    fn list_unread(&self, limit: u32) -> Result<Vec<MessageId>, RetrievalError> {
        if self.fail_listing {
            return Err(unavailable("/users/me/messages"));
        }
        Ok(self.order.iter().take(limit as usize).cloned().collect())
    }

    fn fetch(&self, id: &str) -> Result<RawMessage, RetrievalError> {
        self.fetches.set(self.fetches.get() + 1);
        if self.fail_fetch_of.as_deref() == Some(id) {
            return Err(unavailable(id));
        }
        self.messages
            .get(id)
            .cloned()
            .ok_or_else(|| unavailable(id))
    }
}

/// Summaries are derived from the body so tests can check provenance without
/// depending on any model output.
#[derive(Default)]
struct BodyEcho {
    calls: RefCell<Vec<String>>,
    fail_on: Option<String>,
}

impl Summarizer for BodyEcho {
    fn summarize(&self, email: &ExtractedEmail) -> Result<String, SummarizationError> {
        self.calls.borrow_mut().push(email.body.clone());
        if self.fail_on.as_deref() == Some(email.body.as_str()) {
            return Err(SummarizationError::Status {
                status: 429,
                body: "quota exceeded".into(),
            });
        }
        Ok(format!("[{}] {}", email.subject, email.body))
    }
}

fn b64(s: &str) -> String {
    URL_SAFE.encode(s)
}

fn single_part(id: &str, subject: &str, body: &str) -> RawMessage {
    serde_json::from_value(json!({
        "id": id,
        "labelIds": ["UNREAD", "INBOX"],
        "payload": {
            "mimeType": "text/plain",
            "headers": [
                {"name": "From", "value": "alice@example.com"},
                {"name": "Subject", "value": subject}
            ],
            "body": {"size": body.len(), "data": b64(body)}
        }
    }))
    .unwrap()
}

fn multi_part(id: &str, subject: &str, body: &str) -> RawMessage {
    serde_json::from_value(json!({
        "id": id,
        "payload": {
            "mimeType": "multipart/mixed",
            "headers": [
                {"name": "Subject", "value": subject},
                {"name": "From", "value": "bob@example.com"}
            ],
            "body": {"size": 0},
            "parts": [
                {"partId": "0", "mimeType": "text/html", "body": {"size": 9, "data": b64("<b>no</b>")}},
                {"partId": "1", "mimeType": "text/plain", "body": {"size": body.len(), "data": b64(body)}},
                {"partId": "2", "mimeType": "image/png", "filename": "x.png",
                 "body": {"size": 100, "attachmentId": "att-1"}}
            ]
        }
    }))
    .unwrap()
}

fn malformed(id: &str) -> RawMessage {
    serde_json::from_value(json!({
        "id": id,
        "payload": {"mimeType": "text/plain", "headers": [], "body": {"size": 3, "data": "***"}}
    }))
    .unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

#[test]
fn two_messages_end_to_end() {
    let mailbox = FakeMailbox::new(vec![
        single_part("m-1", "Greeting", "Hello"),
        multi_part("m-2", "Planet", "World"),
    ]);
    let summarizer = BodyEcho::default();

    let outcome = DigestPipeline::new(&mailbox, &summarizer, 10)
        .run(today())
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Complete);
    assert_eq!(outcome.messages, 2);
    assert_eq!(
        outcome.report,
        format!(
            "{}\n\n1. [Greeting] Hello\n\n2. [Planet] World\n\n",
            heading(today())
        )
    );
    assert!(outcome.report.contains("October 16, 2026"));
    assert_eq!(*summarizer.calls.borrow(), vec!["Hello", "World"]);
}

#[test]
fn limit_bounds_the_batch() {
    let mailbox = FakeMailbox::new(
        (0..5)
            .map(|i| single_part(&format!("m{i}"), "s", &format!("body {i}")))
            .collect(),
    );
    let summarizer = BodyEcho::default();

    let outcome = DigestPipeline::new(&mailbox, &summarizer, 3)
        .run(today())
        .unwrap();

    assert_eq!(outcome.messages, 3);
    assert_eq!(mailbox.fetches.get(), 3);
    assert!(outcome.report.contains("3. [s] body 2"));
    assert!(!outcome.report.contains("4. "));
}

#[test]
fn empty_inbox_gives_fixed_message() {
    let mailbox = FakeMailbox::new(vec![]);
    let summarizer = BodyEcho::default();

    let outcome = DigestPipeline::new(&mailbox, &summarizer, 10)
        .run(today())
        .unwrap();

    assert_eq!(outcome.report, NO_UNREAD_MESSAGE);
    assert_eq!(outcome.status, RunStatus::NoUnread);
    assert!(summarizer.calls.borrow().is_empty());
}

#[test]
fn listing_failure_degrades_to_no_mail_with_distinct_status() {
    let mut mailbox = FakeMailbox::new(vec![single_part("m-1", "s", "Hello")]);
    mailbox.fail_listing = true;
    let summarizer = BodyEcho::default();
    let tmp = tempfile::tempdir().unwrap();

    let generated = DigestPipeline::new(&mailbox, &summarizer, 10)
        .run_and_save(tmp.path(), Local::now().naive_local())
        .unwrap();

    assert_eq!(generated.outcome.report, NO_UNREAD_MESSAGE);
    assert!(matches!(
        generated.outcome.status,
        RunStatus::RetrievalFailed(ref reason) if reason.contains("503")
    ));
    assert_eq!(mailbox.fetches.get(), 0);
    assert_eq!(fs::read_to_string(&generated.path).unwrap(), NO_UNREAD_MESSAGE);
}

#[test]
fn fetch_failure_discards_partial_batch() {
    let mut mailbox = FakeMailbox::new(vec![
        single_part("m-1", "s", "Hello"),
        single_part("m-2", "s", "World"),
    ]);
    mailbox.fail_fetch_of = Some("m-2".into());
    let summarizer = BodyEcho::default();

    let outcome = DigestPipeline::new(&mailbox, &summarizer, 10)
        .run(today())
        .unwrap();

    assert_eq!(outcome.report, NO_UNREAD_MESSAGE);
    assert!(matches!(outcome.status, RunStatus::RetrievalFailed(_)));
    assert!(summarizer.calls.borrow().is_empty());
}

#[test]
fn undecodable_message_is_skipped() {
    let mailbox = FakeMailbox::new(vec![
        malformed("bad"),
        single_part("m-2", "s", "World"),
    ]);
    let summarizer = BodyEcho::default();

    let outcome = DigestPipeline::new(&mailbox, &summarizer, 10)
        .run(today())
        .unwrap();

    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.messages, 1);
    assert_eq!(outcome.status, RunStatus::Complete);
    assert!(outcome.report.contains("1. [s] World"));
}

#[test]
fn summarizer_failure_aborts_and_writes_nothing() {
    let mailbox = FakeMailbox::new(vec![
        single_part("m-1", "s", "Hello"),
        single_part("m-2", "s", "World"),
        single_part("m-3", "s", "Again"),
    ]);
    let summarizer = BodyEcho {
        fail_on: Some("World".into()),
        ..BodyEcho::default()
    };
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("reports");

    let err = DigestPipeline::new(&mailbox, &summarizer, 10)
        .run_and_save(&dir, Local::now().naive_local())
        .unwrap_err();

    assert!(matches!(
        err,
        DigestError::Summarization(SummarizationError::Status { status: 429, .. })
    ));
    // stops at the first failure
    assert_eq!(*summarizer.calls.borrow(), vec!["Hello", "World"]);
    assert!(!dir.exists());
}

#[test]
fn summarizer_failure_surfaces_as_digest_error() {
    let mailbox = FakeMailbox::new(vec![single_part("m-1", "s", "Hello")]);
    let summarizer = BodyEcho {
        fail_on: Some("Hello".into()),
        ..BodyEcho::default()
    };

    let err: DigestError = DigestPipeline::new(&mailbox, &summarizer, 10)
        .run(today())
        .unwrap_err();

    assert!(matches!(err, DigestError::Summarization(_)));
    assert!(err.to_string().contains("429"));
}

#[test]
fn saved_report_matches_returned_text() {
    let mailbox = FakeMailbox::new(vec![single_part("m-1", "Greeting", "Hello")]);
    let summarizer = BodyEcho::default();
    let tmp = tempfile::tempdir().unwrap();
    let now = today().and_hms_opt(18, 30, 0).unwrap();

    let generated = DigestPipeline::new(&mailbox, &summarizer, 10)
        .run_and_save(tmp.path(), now)
        .unwrap();

    assert_eq!(
        generated.path.file_name().unwrap(),
        "report_2026-10-16_18-30-00.txt"
    );
    assert_eq!(
        fs::read_to_string(&generated.path).unwrap(),
        generated.outcome.report
    );
    assert!(generated.outcome.report.starts_with(&heading(today())));
}
