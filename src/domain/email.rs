/// Opaque provider identifier for one message.
pub type MessageId = String;

/// Sender, subject and bounded plain-text body of one message, ready to be
/// summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEmail {
    pub sender: String,
    pub subject: String,
    pub body: String,
}
