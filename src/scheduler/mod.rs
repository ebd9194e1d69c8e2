mod assignment;
mod eligibility;
mod integrity;
mod report;
mod types;

pub use types::{GenerateReport, GenerateRequest, SchedError, Violation, ViolationKind};

use crate::model::{Assignment, Provider, ShiftType};
use crate::store::{Collection, EntityStore};
use std::collections::HashSet;

/// Scheduler : encapsule un stockage d'entités
///
/// Les écritures passent par `&mut self` : une génération a l'accès exclusif
/// au stockage pendant toute sa durée.
#[derive(Debug, Default)]
pub struct Scheduler<S> {
    store: S,
}

impl<S: EntityStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
    pub fn into_store(self) -> S {
        self.store
    }

    /// Enregistre un praticien ; refuse un identifiant déjà présent.
    pub fn register_provider(&mut self, provider: Provider) -> Result<Provider, SchedError> {
        provider.validate().map_err(SchedError::InvalidRecord)?;
        self.store.insert_provider(provider.clone())?;
        Ok(provider)
    }

    /// Enregistre un type de shift ; refuse un identifiant déjà présent.
    pub fn register_shift_type(&mut self, shift: ShiftType) -> Result<ShiftType, SchedError> {
        shift.validate().map_err(SchedError::InvalidRecord)?;
        self.store.insert_shift_type(shift.clone())?;
        Ok(shift)
    }

    /// Enregistre un lot de praticiens : tout le lot est validé (champs,
    /// doublons dans le lot et dans le stockage) avant la première écriture.
    pub fn register_providers(&mut self, providers: Vec<Provider>) -> Result<usize, SchedError> {
        let mut seen = HashSet::new();
        for p in &providers {
            p.validate().map_err(SchedError::InvalidRecord)?;
            if !seen.insert(p.id.clone()) || self.store.find_provider(&p.id)?.is_some() {
                return Err(SchedError::DuplicateId {
                    collection: Collection::Provider,
                    id: p.id.as_str().to_string(),
                });
            }
        }
        let count = providers.len();
        for p in providers {
            self.store.insert_provider(p)?;
        }
        Ok(count)
    }

    /// Enregistre un lot de types de shift, avec les mêmes garanties que
    /// `register_providers`.
    pub fn register_shift_types(&mut self, shifts: Vec<ShiftType>) -> Result<usize, SchedError> {
        let mut seen = HashSet::new();
        for s in &shifts {
            s.validate().map_err(SchedError::InvalidRecord)?;
            if !seen.insert(s.id.clone()) || self.store.find_shift_type(&s.id)?.is_some() {
                return Err(SchedError::DuplicateId {
                    collection: Collection::ShiftType,
                    id: s.id.as_str().to_string(),
                });
            }
        }
        let count = shifts.len();
        for s in shifts {
            self.store.insert_shift_type(s)?;
        }
        Ok(count)
    }

    pub fn providers(&self) -> Result<Vec<Provider>, SchedError> {
        Ok(self.store.providers()?)
    }

    pub fn shift_types(&self) -> Result<Vec<ShiftType>, SchedError> {
        Ok(self.store.shift_types(None)?)
    }

    pub fn assignments(&self) -> Result<Vec<Assignment>, SchedError> {
        Ok(self.store.assignments()?)
    }

    /// Génère les gardes REG sur la plage demandée (bornes incluses).
    ///
    /// Échoue sans rien écrire si la plage est inversée, s'il n'y a aucun
    /// praticien ou aucun type de shift REG. Les jours non couverts sont
    /// rapportés dans `conflicts`, la génération continue.
    pub fn generate(&mut self, request: &GenerateRequest) -> Result<GenerateReport, SchedError> {
        assignment::generate(&mut self.store, request)
    }

    pub fn check_integrity(&self) -> Result<Vec<Violation>, SchedError> {
        integrity::check_integrity(&self.store)
    }
}
