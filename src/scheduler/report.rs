use super::GenerateReport;
use chrono::NaiveDate;

/// Agrège compteurs et conflits au fil de la génération.
#[derive(Debug, Default)]
pub(super) struct ReportBuilder {
    created: usize,
    conflicts: Vec<String>,
}

impl ReportBuilder {
    pub(super) fn record_created(&mut self) {
        self.created += 1;
    }

    pub(super) fn record_conflict(&mut self, date: NaiveDate) {
        self.conflicts.push(conflict_message(date));
    }

    pub(super) fn build(self) -> GenerateReport {
        GenerateReport {
            created: self.created,
            conflicts: self.conflicts,
        }
    }
}

fn conflict_message(date: NaiveDate) -> String {
    format!("no eligible provider for {date}")
}
