//! Append-only audit log of request decisions.
//!
//! Records are kept in insertion order (oldest first). Consumers that want
//! newest-first reverse at their own boundary. The only way to remove a
//! record is [`AuditLog::reset`], which clears everything.

use chrono::{DateTime, Utc};
use clubbank_types::{DecisionRecord, constants};
use serde::{Deserialize, Serialize};

/// A rendered CSV export, ready to hand to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvExport {
    pub filename: String,
    pub csv_content: String,
}

/// Insertion-ordered decision records.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    records: Vec<DecisionRecord>,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Records are never edited afterwards.
    pub fn append(&mut self, record: DecisionRecord) {
        tracing::debug!(
            id = %record.id,
            club = %record.club_id,
            decision = %record.decision,
            "decision recorded"
        );
        self.records.push(record);
    }

    /// All records, oldest first.
    #[must_use]
    pub fn all(&self) -> &[DecisionRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record. Returns how many were removed.
    pub fn reset(&mut self) -> usize {
        let cleared = self.records.len();
        self.records.clear();
        cleared
    }

    /// Render the log as CSV: a header plus one row per record, in log order.
    #[must_use]
    pub fn export_csv(&self) -> String {
        let mut lines = Vec::with_capacity(self.records.len() + 1);
        lines.push(constants::CSV_HEADER.to_string());
        lines.extend(self.records.iter().map(csv_row));
        lines.join("\n")
    }

    /// CSV content plus a filename stamped with `now`.
    #[must_use]
    pub fn export(&self, now: DateTime<Utc>) -> CsvExport {
        CsvExport {
            filename: format!(
                "{}{}.csv",
                constants::EXPORT_FILENAME_PREFIX,
                now.format(constants::EXPORT_FILENAME_TIME_FORMAT)
            ),
            csv_content: self.export_csv(),
        }
    }
}

fn csv_row(record: &DecisionRecord) -> String {
    let fields = [
        record.timestamp.to_rfc3339(),
        record.club_name.clone(),
        format!(
            "[{}]",
            record
                .requested_resources
                .render(constants::CSV_VECTOR_SEPARATOR)
        ),
        record.decision.to_string(),
        record.message.clone(),
        record.safe_sequence.join(constants::SEQUENCE_SEPARATOR),
    ];
    fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// RFC 4180 quoting: wrap in quotes and double inner quotes when the field
/// holds a comma, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
