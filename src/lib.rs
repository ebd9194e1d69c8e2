#![forbid(unsafe_code)]
//! Garde — génération de tableaux de garde pour une équipe de praticiens.
//!
//! - Stockage clé/valeur abstrait (`EntityStore`), en mémoire ou fichier JSON.
//! - Rotation round-robin sur une plage de dates, un type de shift REG par passe.
//! - Filtre d'éligibilité : pas de double réservation, qualification requise.
//! - Les jours non couverts sont rapportés comme conflits, jamais levés en erreur.

pub mod io;
pub mod model;
pub mod scheduler;
pub mod store;

pub use model::{
    Assignment, AssignmentId, GeneratedBy, Provider, ProviderId, Quarter, Roster, ShiftName,
    ShiftType, ShiftTypeId,
};
pub use scheduler::{
    GenerateReport, GenerateRequest, SchedError, Scheduler, Violation, ViolationKind,
};
pub use store::{Collection, EntityStore, JsonStore, StoreError, StoreResult};
