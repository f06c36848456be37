use chrono::{Local, NaiveDate, NaiveDateTime};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::auth::{GMAIL_READONLY_SCOPE, TokenManager};
use crate::config::Config;
use crate::domain::email::ExtractedEmail;
use crate::error::{DigestError, RetrievalError};
use crate::mail::extract::extract;
use crate::mail::gmail::{GmailClient, Mailbox};
use crate::report::{build_report, save_report};
use crate::summarize::{OpenAiSummarizer, Summarizer};

/// How a run ended, kept apart from the report text so a failed listing is
/// never mistaken for an empty inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Complete,
    NoUnread,
    RetrievalFailed(String),
}

/// Messages gathered for one run.
#[derive(Debug, Default)]
pub struct Collection {
    pub emails: Vec<ExtractedEmail>,
    pub skipped: usize,
    pub failure: Option<RetrievalError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestOutcome {
    pub report: String,
    pub status: RunStatus,
    pub messages: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    pub outcome: DigestOutcome,
    pub path: PathBuf,
}

pub struct DigestPipeline<'a> {
    mailbox: &'a dyn Mailbox,
    summarizer: &'a dyn Summarizer,
    limit: u32,
}

impl<'a> DigestPipeline<'a> {
    pub fn new(mailbox: &'a dyn Mailbox, summarizer: &'a dyn Summarizer, limit: u32) -> Self {
        Self {
            mailbox,
            summarizer,
            limit,
        }
    }

    /// List, fetch and extract. A retrieval error anywhere discards what was
    /// gathered so far; an undecodable message is skipped on its own.
    pub fn collect(&self) -> Collection {
        let ids = match self.mailbox.list_unread(self.limit) {
            Ok(ids) => ids,
            Err(e) => return Self::failed(e),
        };
        info!("{} unread message(s) listed", ids.len());

        let mut collection = Collection::default();
        for id in &ids {
            let raw = match self.mailbox.fetch(id) {
                Ok(raw) => raw,
                Err(e) => return Self::failed(e),
            };
            match extract(&raw) {
                Ok(email) => collection.emails.push(email),
                Err(e) => {
                    warn!("skipping message: {e}");
                    collection.skipped += 1;
                }
            }
        }
        collection
    }

    fn failed(e: RetrievalError) -> Collection {
        warn!("retrieval failed, continuing with no messages: {e}");
        Collection {
            failure: Some(e),
            ..Collection::default()
        }
    }

    pub fn run(&self, today: NaiveDate) -> Result<DigestOutcome, DigestError> {
        let collection = self.collect();
        let report = build_report(&collection.emails, self.summarizer, today)?;
        let status = match (&collection.failure, collection.emails.is_empty()) {
            (Some(e), _) => RunStatus::RetrievalFailed(e.to_string()),
            (None, true) => RunStatus::NoUnread,
            (None, false) => RunStatus::Complete,
        };
        Ok(DigestOutcome {
            report,
            status,
            messages: collection.emails.len(),
            skipped: collection.skipped,
        })
    }

    /// Run and persist. Nothing is written unless the report was fully built.
    pub fn run_and_save(
        &self,
        report_dir: &Path,
        now: NaiveDateTime,
    ) -> Result<GeneratedReport, DigestError> {
        let outcome = self.run(now.date())?;
        let path = save_report(report_dir, &outcome.report, now)?;
        info!("report saved to {}", path.display());
        Ok(GeneratedReport { outcome, path })
    }
}

/// One full run against the live services described by `cfg`.
pub fn run_once(cfg: &Config, tokens: &TokenManager) -> Result<GeneratedReport, DigestError> {
    let summarizer = OpenAiSummarizer::new(
        cfg.openai_api_url(),
        cfg.openai_model(),
        cfg.openai_api_key(),
        cfg.http_timeout(),
    )?;

    let credential = tokens.obtain_credential(&[GMAIL_READONLY_SCOPE])?;
    let gmail = GmailClient::new(
        credential.access_token,
        cfg.gmail_api_base(),
        cfg.http_timeout(),
    )?;

    DigestPipeline::new(&gmail, &summarizer, cfg.max_results())
        .run_and_save(&cfg.report_dir(), Local::now().naive_local())
}
