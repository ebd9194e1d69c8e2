use super::{SchedError, Violation, ViolationKind};
use crate::model::{Assignment, ProviderId};
use crate::store::EntityStore;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// Revérifie tout le stockage : au plus une assignation par (praticien, date),
/// et chaque assignation pointe vers un praticien enregistré.
pub(super) fn check_integrity<S: EntityStore + ?Sized>(
    store: &S,
) -> Result<Vec<Violation>, SchedError> {
    let known: HashSet<ProviderId> = store.providers()?.into_iter().map(|p| p.id).collect();

    let mut by_slot: BTreeMap<(ProviderId, NaiveDate), Vec<Assignment>> = BTreeMap::new();
    for a in store.assignments()? {
        by_slot
            .entry((a.provider_id.clone(), a.date))
            .or_default()
            .push(a);
    }

    let mut out = Vec::new();
    for ((provider, date), group) in by_slot {
        let ids = group.into_iter().map(|a| a.id).collect::<Vec<_>>();
        if !known.contains(&provider) {
            out.push(Violation {
                provider: provider.clone(),
                date,
                assignments: ids.clone(),
                kind: ViolationKind::UnknownProvider,
            });
        }
        if ids.len() > 1 {
            out.push(Violation {
                provider,
                date,
                assignments: ids,
                kind: ViolationKind::DoubleBooking,
            });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Provider, Roster, ShiftName, ShiftType};

    #[test]
    fn reports_double_booking_and_orphans() {
        let mut roster = Roster::default();
        roster.providers.push(Provider::new("alice", "Alice"));
        let shift = ShiftType::new("reg", ShiftName::Regular, "S");
        let day = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();

        // écrit directement dans le roster pour contourner la contrainte d'unicité
        let alice = ProviderId::new("alice");
        roster
            .assignments
            .push(Assignment::generated(alice.clone(), day, &shift));
        roster
            .assignments
            .push(Assignment::generated(alice, day, &shift));
        roster
            .assignments
            .push(Assignment::generated(ProviderId::new("ghost"), day, &shift));

        let violations = check_integrity(&roster).unwrap();
        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .any(|v| v.kind == ViolationKind::DoubleBooking && v.assignments.len() == 2));
        assert!(violations
            .iter()
            .any(|v| v.kind == ViolationKind::UnknownProvider && v.provider.as_str() == "ghost"));
    }
}
