use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;
use serde::Serialize;

use super::types::CaseId;

/// Outcome of one case in a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum CaseStatus {
    /// Case contributed to the aggregate
    Ok,
    /// Case was skipped
    Skipped(String),
}

impl CaseStatus {
    fn is_ok(&self) -> bool {
        matches!(self, CaseStatus::Ok)
    }
}

/// Individual case result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseRecord {
    /// The case
    pub case: CaseId,
    /// Sol the case resolved to, when it got that far
    pub sol: Option<u32>,
    /// What happened
    pub status: CaseStatus,
}

impl CaseRecord {
    pub(crate) fn ok(case: CaseId, sol: u32) -> Self {
        Self {
            case,
            sol: Some(sol),
            status: CaseStatus::Ok,
        }
    }

    pub(crate) fn skipped(case: CaseId, reason: impl Into<String>) -> Self {
        Self {
            case,
            sol: None,
            status: CaseStatus::Skipped(reason.into()),
        }
    }
}

/// Per-case ledger of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Title printed at the top (usually the selection label)
    pub title: String,
    /// One record per case, in input order
    pub records: Vec<CaseRecord>,
}

impl BatchReport {
    /// Create an empty report
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            records: Vec::new(),
        }
    }

    /// Add a case record
    pub fn add_record(&mut self, record: CaseRecord) {
        self.records.push(record);
    }

    /// Number of contributing cases
    pub fn ok_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_ok()).count()
    }

    /// Number of skipped cases
    pub fn skipped_count(&self) -> usize {
        self.records.len() - self.ok_count()
    }

    /// Records of skipped cases
    pub fn skipped(&self) -> impl Iterator<Item = &CaseRecord> {
        self.records.iter().filter(|r| !r.status.is_ok())
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static SKIP: Emoji<'_, '_> = Emoji("⚠", "[SKIP]");

            let mut output = String::new();

            output.push_str(&format!("{}\n", style("Batch Report").bold().cyan()));
            output.push_str(&format!("{}\n", style("============").cyan()));
            output.push_str(&format!("{}: {}\n\n", style("Selection").bold(), self.title));

            for record in &self.records {
                match &record.status {
                    CaseStatus::Ok => {
                        output.push_str(&format!("[{}] {}", OK, style(record.case).green()));
                        if let Some(sol) = record.sol {
                            output.push_str(&format!(" (sol {})", sol));
                        }
                        output.push('\n');
                    }
                    CaseStatus::Skipped(reason) => {
                        output.push_str(&format!(
                            "[{}] {} - {}: {}\n",
                            SKIP,
                            style(record.case).yellow(),
                            style("SKIPPED").yellow().bold(),
                            reason
                        ));
                    }
                }
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} contributed, {} skipped\n",
                style("Summary").bold(),
                style(self.ok_count()).green(),
                style(self.skipped_count()).yellow()
            ));
            if self.ok_count() == 0 {
                output.push_str(&format!("{}\n", style("No contributing cases").red().bold()));
            }

            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch Report")?;
        writeln!(f, "============")?;
        writeln!(f, "Selection: {}", self.title)?;
        writeln!(f)?;

        for record in &self.records {
            match &record.status {
                CaseStatus::Ok => match record.sol {
                    Some(sol) => writeln!(f, "[✓] {} (sol {})", record.case, sol)?,
                    None => writeln!(f, "[✓] {}", record.case)?,
                },
                CaseStatus::Skipped(reason) => writeln!(f, "[⚠] {} - SKIPPED: {}", record.case, reason)?,
            }
        }

        writeln!(f)?;
        writeln!(f, "Summary: {} contributed, {} skipped", self.ok_count(), self.skipped_count())?;
        if self.ok_count() == 0 {
            writeln!(f, "No contributing cases")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_display() {
        let mut report = BatchReport::new("dP_~-2");
        report.add_record(CaseRecord::ok(CaseId::Event(1), 10));
        report.add_record(CaseRecord::skipped(CaseId::Event(2), "no samples"));
        report.add_record(CaseRecord::ok(CaseId::QuietSol { sol: 7, hour: 12 }, 7));

        assert_eq!(report.ok_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped().count(), 1);

        let text = report.to_string();
        assert!(text.contains("Selection: dP_~-2"));
        assert!(text.contains("[⚠] ID 2 - SKIPPED: no samples"));
        assert!(text.contains("Summary: 2 contributed, 1 skipped"));
        assert!(!report.format_colored().is_empty());
    }

    #[test]
    fn test_status_serializes_with_reason() {
        let json = serde_json::to_string(&CaseStatus::Skipped("gap".to_string())).unwrap();
        assert_eq!(json, r#"{"status":"skipped","reason":"gap"}"#);
    }
}
