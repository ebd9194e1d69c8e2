use crate::model::{
    Assignment, Provider, ProviderId, Roster, ShiftName, ShiftType, ShiftTypeId,
};
use anyhow::Context;
use chrono::NaiveDate;
use fs2::FileExt;
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Collections persistées.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Provider,
    ShiftType,
    Assignment,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Collection::Provider => "provider",
            Collection::ShiftType => "shifttype",
            Collection::Assignment => "assignment",
        })
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate {collection} key: {key}")]
    Duplicate { collection: Collection, key: String },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Contrat du stockage d'entités consommé par le scheduler.
///
/// Les scans renvoient les enregistrements dans l'ordre défini par le
/// stockage (ordre d'insertion pour les implémentations fournies).
/// `insert_assignment` refuse une seconde assignation pour un même couple
/// (praticien, date) : c'est la contrainte d'unicité qui protège la
/// génération contre le schéma lecture-puis-écriture.
pub trait EntityStore {
    fn find_provider(&self, id: &ProviderId) -> StoreResult<Option<Provider>>;
    fn providers(&self) -> StoreResult<Vec<Provider>>;
    fn insert_provider(&mut self, provider: Provider) -> StoreResult<()>;

    fn find_shift_type(&self, id: &ShiftTypeId) -> StoreResult<Option<ShiftType>>;
    /// Types de shift, filtrés par nom si `name` est fourni.
    fn shift_types(&self, name: Option<ShiftName>) -> StoreResult<Vec<ShiftType>>;
    fn insert_shift_type(&mut self, shift: ShiftType) -> StoreResult<()>;

    fn find_assignment(
        &self,
        provider: &ProviderId,
        date: NaiveDate,
    ) -> StoreResult<Option<Assignment>>;
    fn assignments(&self) -> StoreResult<Vec<Assignment>>;
    fn insert_assignment(&mut self, assignment: Assignment) -> StoreResult<()>;
}

/// Stockage en mémoire : le roster lui-même.
impl EntityStore for Roster {
    fn find_provider(&self, id: &ProviderId) -> StoreResult<Option<Provider>> {
        Ok(self.find_provider_by_id(id).cloned())
    }

    fn providers(&self) -> StoreResult<Vec<Provider>> {
        Ok(self.providers.clone())
    }

    fn insert_provider(&mut self, provider: Provider) -> StoreResult<()> {
        if self.find_provider_by_id(&provider.id).is_some() {
            return Err(StoreError::Duplicate {
                collection: Collection::Provider,
                key: provider.id.as_str().to_string(),
            });
        }
        self.providers.push(provider);
        Ok(())
    }

    fn find_shift_type(&self, id: &ShiftTypeId) -> StoreResult<Option<ShiftType>> {
        Ok(self.find_shift_type_by_id(id).cloned())
    }

    fn shift_types(&self, name: Option<ShiftName>) -> StoreResult<Vec<ShiftType>> {
        Ok(self
            .shift_types
            .iter()
            .filter(|s| name.map_or(true, |n| s.name == n))
            .cloned()
            .collect())
    }

    fn insert_shift_type(&mut self, shift: ShiftType) -> StoreResult<()> {
        if self.find_shift_type_by_id(&shift.id).is_some() {
            return Err(StoreError::Duplicate {
                collection: Collection::ShiftType,
                key: shift.id.as_str().to_string(),
            });
        }
        self.shift_types.push(shift);
        Ok(())
    }

    fn find_assignment(
        &self,
        provider: &ProviderId,
        date: NaiveDate,
    ) -> StoreResult<Option<Assignment>> {
        Ok(Roster::find_assignment(self, provider, date).cloned())
    }

    fn assignments(&self) -> StoreResult<Vec<Assignment>> {
        Ok(self.assignments.clone())
    }

    fn insert_assignment(&mut self, assignment: Assignment) -> StoreResult<()> {
        if Roster::find_assignment(self, &assignment.provider_id, assignment.date).is_some() {
            return Err(StoreError::Duplicate {
                collection: Collection::Assignment,
                key: format!("{}@{}", assignment.provider_id, assignment.date),
            });
        }
        self.assignments.push(assignment);
        Ok(())
    }
}

/// Stockage fichier JSON : chaque insertion est persistée de manière atomique.
///
/// Un verrou exclusif sur `<fichier>.lock` est tenu pendant toute la durée de
/// vie du handle : deux processus ne peuvent pas générer en même temps sur le
/// même fichier, et chaque handle lit l'état laissé par le précédent.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    roster: Roster,
    // libéré à la fermeture du fichier
    _lock: File,
}

impl JsonStore {
    /// Ouvre le fichier s'il existe, sinon démarre sur un roster vide.
    /// Attend que le verrou soit libéré par un autre handle.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock = open_lock_file(&path)?;
        lock.lock_exclusive()
            .with_context(|| format!("locking {}", path.display()))?;
        Self::load(path, lock)
    }

    /// Comme `open`, mais échoue immédiatement si le fichier est déjà verrouillé.
    pub fn try_open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock = open_lock_file(&path)?;
        lock.try_lock_exclusive()
            .with_context(|| format!("{} is locked by another process", path.display()))?;
        Self::load(path, lock)
    }

    fn load(path: PathBuf, lock: File) -> anyhow::Result<Self> {
        let roster = if path.exists() {
            let data =
                fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_slice(&data)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            Roster::default()
        };
        #[cfg(feature = "logging")]
        tracing::debug!(path = %path.display(), "store opened");
        Ok(Self {
            path,
            roster,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Sauvegarde de manière atomique.
    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(&self.roster)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        #[cfg(feature = "logging")]
        tracing::debug!(path = %self.path.display(), "store saved");
        Ok(())
    }

    /// Persiste après une insertion en mémoire ; annule l'insertion si l'écriture échoue.
    fn commit(&mut self, rollback: impl FnOnce(&mut Roster)) -> StoreResult<()> {
        if let Err(err) = self.save() {
            rollback(&mut self.roster);
            return Err(StoreError::Backend(err));
        }
        Ok(())
    }
}

fn open_lock_file(path: &Path) -> anyhow::Result<File> {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    let lock_path = PathBuf::from(name);
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .with_context(|| format!("opening {}", lock_path.display()))
}

impl EntityStore for JsonStore {
    fn find_provider(&self, id: &ProviderId) -> StoreResult<Option<Provider>> {
        self.roster.find_provider(id)
    }

    fn providers(&self) -> StoreResult<Vec<Provider>> {
        self.roster.providers()
    }

    fn insert_provider(&mut self, provider: Provider) -> StoreResult<()> {
        self.roster.insert_provider(provider)?;
        self.commit(|r| {
            r.providers.pop();
        })
    }

    fn find_shift_type(&self, id: &ShiftTypeId) -> StoreResult<Option<ShiftType>> {
        self.roster.find_shift_type(id)
    }

    fn shift_types(&self, name: Option<ShiftName>) -> StoreResult<Vec<ShiftType>> {
        self.roster.shift_types(name)
    }

    fn insert_shift_type(&mut self, shift: ShiftType) -> StoreResult<()> {
        self.roster.insert_shift_type(shift)?;
        self.commit(|r| {
            r.shift_types.pop();
        })
    }

    fn find_assignment(
        &self,
        provider: &ProviderId,
        date: NaiveDate,
    ) -> StoreResult<Option<Assignment>> {
        EntityStore::find_assignment(&self.roster, provider, date)
    }

    fn assignments(&self) -> StoreResult<Vec<Assignment>> {
        self.roster.assignments()
    }

    fn insert_assignment(&mut self, assignment: Assignment) -> StoreResult<()> {
        self.roster.insert_assignment(assignment)?;
        self.commit(|r| {
            r.assignments.pop();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Provider;

    #[test]
    fn roster_rejects_duplicate_assignment_for_same_day() {
        let mut roster = Roster::default();
        let shift = ShiftType::new("reg", ShiftName::Regular, "S");
        let day = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let alice = ProviderId::new("alice");

        roster
            .insert_assignment(Assignment::generated(alice.clone(), day, &shift))
            .unwrap();
        let err = roster
            .insert_assignment(Assignment::generated(alice, day, &shift))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Duplicate {
                collection: Collection::Assignment,
                ..
            }
        ));
        assert_eq!(roster.assignments.len(), 1);
    }

    #[test]
    fn shift_type_scan_filters_by_name_in_insertion_order() {
        let mut roster = Roster::default();
        roster
            .insert_shift_type(ShiftType::new("call", ShiftName::OnCall, "A"))
            .unwrap();
        roster
            .insert_shift_type(ShiftType::new("reg-b", ShiftName::Regular, "B"))
            .unwrap();
        roster
            .insert_shift_type(ShiftType::new("reg-c", ShiftName::Regular, "C"))
            .unwrap();

        let regular = roster.shift_types(Some(ShiftName::Regular)).unwrap();
        let sites: Vec<&str> = regular.iter().map(|s| s.site.as_str()).collect();
        assert_eq!(sites, ["B", "C"]);
        assert_eq!(roster.shift_types(None).unwrap().len(), 3);
    }

    #[test]
    fn provider_ids_are_unique() {
        let mut roster = Roster::default();
        roster.insert_provider(Provider::new("a", "Alice")).unwrap();
        assert!(roster.insert_provider(Provider::new("a", "Other")).is_err());
        assert_eq!(roster.providers.len(), 1);
        let found = roster.find_provider(&ProviderId::new("a")).unwrap();
        assert_eq!(found.map(|p| p.name), Some("Alice".to_string()));
        assert!(roster
            .find_shift_type(&ShiftTypeId::new("missing"))
            .unwrap()
            .is_none());
    }
}
