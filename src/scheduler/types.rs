use crate::model::{AssignmentId, ProviderId};
use crate::store::{Collection, StoreError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Plage de génération, bornes incluses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl GenerateRequest {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// Une seule journée.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn validate(&self) -> Result<(), SchedError> {
        if self.end_date < self.start_date {
            return Err(SchedError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    /// Jours de la plage, dans l'ordre.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end_date;
        self.start_date.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len_days(&self) -> usize {
        self.days().count()
    }
}

/// Résultat d'une génération.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateReport {
    pub created: usize,
    pub conflicts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// deux assignations pour un même praticien à la même date
    DoubleBooking,
    /// assignation vers un praticien inconnu
    UnknownProvider,
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub provider: ProviderId,
    pub date: NaiveDate,
    pub assignments: Vec<AssignmentId>,
    pub kind: ViolationKind,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("configuration error: {0}")]
    Configuration(&'static str),
    #[error("{collection} already exists: {id}")]
    DuplicateId { collection: Collection, id: String },
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("store unavailable: {0}")]
    Unavailable(#[source] StoreError),
}

impl From<StoreError> for SchedError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { collection, key } => SchedError::DuplicateId {
                collection,
                id: key,
            },
            other => SchedError::Unavailable(other),
        }
    }
}
