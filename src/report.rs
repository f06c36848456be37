use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::email::ExtractedEmail;
use crate::error::SummarizationError;
use crate::summarize::Summarizer;

pub const NO_UNREAD_MESSAGE: &str = "No unread emails found.";
pub const REPORT_TITLE: &str = "Email Summary Report";

pub fn heading(today: NaiveDate) -> String {
    format!("{REPORT_TITLE} — {}", today.format("%B %d, %Y"))
}

/// Summarize every email in order and number the results under a dated
/// heading. The first summarizer error aborts the whole report.
pub fn build_report(
    emails: &[ExtractedEmail],
    summarizer: &dyn Summarizer,
    today: NaiveDate,
) -> Result<String, SummarizationError> {
    if emails.is_empty() {
        return Ok(NO_UNREAD_MESSAGE.to_string());
    }
    let summaries = emails
        .iter()
        .map(|e| summarizer.summarize(e))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(assemble(today, &summaries))
}

pub fn assemble(today: NaiveDate, summaries: &[String]) -> String {
    if summaries.is_empty() {
        return NO_UNREAD_MESSAGE.to_string();
    }
    let mut report = format!("{}\n\n", heading(today));
    for (i, summary) in summaries.iter().enumerate() {
        report.push_str(&format!("{}. {}\n\n", i + 1, summary));
    }
    report
}

pub fn report_file_name(now: NaiveDateTime) -> String {
    format!("report_{}.txt", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Write the report as `report_<timestamp>.txt` under `dir`.
pub fn save_report(dir: &Path, report: &str, now: NaiveDateTime) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(now));
    fs::write(&path, report)?;
    Ok(path)
}
