use crate::model::Provider;
use crate::store::{EntityStore, StoreResult};
use chrono::NaiveDate;

/// Vérifie si `provider` peut prendre un shift le jour `date`.
///
/// Deux conditions : aucune assignation existante ce jour-là (toutes
/// générations confondues), et la qualification requise si le shift en exige une.
pub(super) fn is_eligible<S: EntityStore + ?Sized>(
    store: &S,
    provider: &Provider,
    date: NaiveDate,
    required_qualification: Option<&str>,
) -> StoreResult<bool> {
    if store.find_assignment(&provider.id, date)?.is_some() {
        return Ok(false);
    }
    if let Some(tag) = required_qualification {
        if !provider.is_qualified(tag) {
            return Ok(false);
        }
    }
    Ok(true)
}
