use std::path::PathBuf;

use crate::error::DigestError;
use crate::pipeline::{GeneratedReport, RunStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Working,
    Saved {
        path: PathBuf,
        warning: Option<String>,
    },
    Failed(String),
}

#[derive(Debug, Default)]
pub struct AppState {
    /// Last successfully generated report, kept only for display.
    pub report: Option<String>,
    pub status: Status,
    pub scroll: u16,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_run(&mut self) {
        self.status = Status::Working;
    }

    pub fn finish_run(&mut self, result: Result<GeneratedReport, DigestError>) {
        self.scroll = 0;
        match result {
            Ok(generated) => {
                let outcome = generated.outcome;
                let mut warnings = Vec::new();
                if let RunStatus::RetrievalFailed(reason) = &outcome.status {
                    warnings.push(format!("mailbox could not be read ({reason})"));
                }
                if outcome.skipped > 0 {
                    warnings.push(format!("{} message(s) could not be decoded", outcome.skipped));
                }
                self.report = Some(outcome.report);
                self.status = Status::Saved {
                    path: generated.path,
                    warning: (!warnings.is_empty()).then(|| warnings.join("; ")),
                };
            }
            Err(e) => {
                // a failed run never shows a stale or partial report
                self.report = None;
                self.status = Status::Failed(e.to_string());
            }
        }
    }

    pub fn is_working(&self) -> bool {
        self.status == Status::Working
    }

    pub fn scroll_by(&mut self, delta: i32) {
        if delta < 0 {
            self.scroll = self.scroll.saturating_sub(delta.unsigned_abs() as u16);
        } else {
            self.scroll = self.scroll.saturating_add(delta as u16);
        }
    }

    pub fn status_line(&self) -> String {
        match &self.status {
            Status::Idle => "Press g to generate today's summary.".to_string(),
            Status::Working => "Fetching emails...".to_string(),
            Status::Saved {
                path,
                warning: None,
            } => format!("Report saved to {}", path.display()),
            Status::Saved {
                path,
                warning: Some(w),
            } => format!("Report saved to {} (warning: {w})", path.display()),
            Status::Failed(e) => format!("Error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, SummarizationError};
    use crate::pipeline::DigestOutcome;

    fn generated(status: RunStatus, skipped: usize) -> GeneratedReport {
        GeneratedReport {
            outcome: DigestOutcome {
                report: "No unread emails found.".into(),
                status,
                messages: 0,
                skipped,
            },
            path: PathBuf::from("report_2026-01-01_00-00-00.txt"),
        }
    }

    #[test]
    fn success_shows_report_and_path() {
        let mut s = AppState::new();
        s.scroll = 7;
        s.start_run();
        assert!(s.is_working());
        s.finish_run(Ok(generated(RunStatus::NoUnread, 0)));

        assert_eq!(s.report.as_deref(), Some("No unread emails found."));
        assert_eq!(s.scroll, 0);
        assert_eq!(
            s.status_line(),
            "Report saved to report_2026-01-01_00-00-00.txt"
        );
    }

    #[test]
    fn retrieval_failure_is_flagged_distinctly() {
        let mut s = AppState::new();
        s.finish_run(Ok(generated(RunStatus::RetrievalFailed("HTTP 503".into()), 1)));
        let line = s.status_line();
        assert!(line.contains("mailbox could not be read (HTTP 503)"));
        assert!(line.contains("1 message(s) could not be decoded"));
    }

    #[test]
    fn failure_clears_previous_report() {
        let mut s = AppState::new();
        s.finish_run(Ok(generated(RunStatus::Complete, 0)));
        s.finish_run(Err(DigestError::Auth(AuthError::Flow("cancelled".into()))));
        assert!(s.report.is_none());
        assert_eq!(
            s.status_line(),
            "Error: authentication failed: authorization flow failed: cancelled"
        );

        s.finish_run(Err(SummarizationError::MissingApiKey.into()));
        assert!(s.status_line().starts_with("Error: summarization failed"));
    }

    #[test]
    fn scrolling_saturates() {
        let mut s = AppState::new();
        s.scroll_by(-3);
        assert_eq!(s.scroll, 0);
        s.scroll_by(10);
        s.scroll_by(-4);
        assert_eq!(s.scroll, 6);
    }
}
