use super::{eligibility, report::ReportBuilder, GenerateReport, GenerateRequest, SchedError};
use crate::model::{Assignment, Provider, ShiftName};
use crate::store::{EntityStore, StoreResult};
use chrono::NaiveDate;

/// Curseur de rotation sur la liste des praticiens.
///
/// Partagé sur toute la plage de dates : il n'est jamais remis à zéro entre
/// deux jours, seulement entre deux appels de génération.
#[derive(Debug)]
pub(super) struct Rotation<'a> {
    providers: &'a [Provider],
    cursor: usize,
}

impl<'a> Rotation<'a> {
    pub(super) fn new(providers: &'a [Provider]) -> Self {
        Self {
            providers,
            cursor: 0,
        }
    }

    /// Candidat courant, puis avance le curseur.
    pub(super) fn next_candidate(&mut self) -> &'a Provider {
        let provider = &self.providers[self.cursor];
        self.cursor = (self.cursor + 1) % self.providers.len();
        provider
    }

    /// Essaie au plus `len` candidats à la suite ; renvoie le premier éligible.
    fn place<S: EntityStore + ?Sized>(
        &mut self,
        store: &S,
        date: NaiveDate,
        required_qualification: Option<&str>,
    ) -> StoreResult<Option<&'a Provider>> {
        for _ in 0..self.providers.len() {
            let candidate = self.next_candidate();
            if eligibility::is_eligible(store, candidate, date, required_qualification)? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

pub(super) fn generate<S: EntityStore + ?Sized>(
    store: &mut S,
    request: &GenerateRequest,
) -> Result<GenerateReport, SchedError> {
    request.validate()?;

    let providers = store.providers()?;
    if providers.is_empty() {
        return Err(SchedError::Configuration("at least one provider is required"));
    }
    let regular = store.shift_types(Some(ShiftName::Regular))?;
    let Some(shift) = regular.first() else {
        return Err(SchedError::Configuration("a REG shift type is required"));
    };

    // un créneau par type REG trouvé, tous sur le site du premier
    let slots_per_day = providers.len().min(regular.len());
    let required = shift.required_qualification();

    #[cfg(feature = "logging")]
    tracing::info!(
        start = %request.start_date,
        end = %request.end_date,
        providers = providers.len(),
        site = %shift.site,
        slots_per_day,
        "generating schedule"
    );

    let mut rotation = Rotation::new(&providers);
    let mut report = ReportBuilder::default();

    for date in request.days() {
        for _ in 0..slots_per_day {
            match rotation.place(&*store, date, required)? {
                Some(provider) => {
                    store.insert_assignment(Assignment::generated(
                        provider.id.clone(),
                        date,
                        shift,
                    ))?;
                    report.record_created();
                    #[cfg(feature = "logging")]
                    tracing::debug!(provider = %provider.id, %date, "assigned");
                }
                None => {
                    report.record_conflict(date);
                    #[cfg(feature = "logging")]
                    tracing::warn!(%date, "no eligible provider");
                }
            }
        }
    }

    let report = report.build();
    #[cfg(feature = "logging")]
    tracing::info!(
        created = report.created,
        conflicts = report.conflicts.len(),
        "generation done"
    );
    Ok(report)
}
