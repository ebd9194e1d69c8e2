use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifiant fort pour Provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Praticien pouvant recevoir des gardes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    #[serde(default)]
    pub call_sign: Option<String>,
    /// Équivalent temps plein, dans [0, 1].
    pub fte: f64,
    pub acc_target: u32,
    pub call_target: u32,
    /// Sites préférés, par ordre de préférence. Non lu par la génération.
    #[serde(default)]
    pub site_preferences: Vec<String>,
    #[serde(default)]
    pub qualifications: BTreeSet<String>,
    #[serde(default)]
    pub seniority_level: u32,
    #[serde(default)]
    pub politics_weight: f64,
}

impl Provider {
    pub fn new<I: AsRef<str>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: ProviderId::new(id),
            name: name.into(),
            call_sign: None,
            fte: 1.0,
            acc_target: 0,
            call_target: 0,
            site_preferences: Vec::new(),
            qualifications: BTreeSet::new(),
            seniority_level: 0,
            politics_weight: 0.0,
        }
    }

    pub fn with_fte(mut self, fte: f64) -> Self {
        self.fte = fte;
        self
    }

    pub fn with_qualification<Q: Into<String>>(mut self, tag: Q) -> Self {
        self.qualifications.insert(tag.into());
        self
    }

    pub fn is_qualified(&self, tag: &str) -> bool {
        self.qualifications.contains(tag)
    }

    /// Vérifie les champs contraints (id/nom non vides, fte dans [0, 1]).
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("provider id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("provider name cannot be empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.fte) {
            return Err(format!("fte must be within [0, 1], got {}", self.fte));
        }
        Ok(())
    }
}

/// Vocabulaire fixe des types de shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftName {
    /// Journée régulière, seule cible de la génération.
    #[serde(rename = "REG")]
    Regular,
    #[serde(rename = "APS")]
    AfterHours,
    #[serde(rename = "CALL")]
    OnCall,
    #[serde(rename = "OFF")]
    Off,
}

impl ShiftName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftName::Regular => "REG",
            ShiftName::AfterHours => "APS",
            ShiftName::OnCall => "CALL",
            ShiftName::Off => "OFF",
        }
    }
}

impl fmt::Display for ShiftName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REG" => Ok(ShiftName::Regular),
            "APS" => Ok(ShiftName::AfterHours),
            "CALL" => Ok(ShiftName::OnCall),
            "OFF" => Ok(ShiftName::Off),
            other => Err(format!("unknown shift name: {other} (expected REG/APS/CALL/OFF)")),
        }
    }
}

/// Identifiant fort pour ShiftType
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftTypeId(String);

impl ShiftTypeId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gabarit d'un créneau de travail sur un site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftType {
    pub id: ShiftTypeId,
    pub name: ShiftName,
    pub site: String,
    #[serde(default)]
    pub weekly: bool,
    #[serde(default)]
    pub requires_qualification: Option<String>,
}

impl ShiftType {
    pub fn new<I: AsRef<str>, S: Into<String>>(id: I, name: ShiftName, site: S) -> Self {
        Self {
            id: ShiftTypeId::new(id),
            name,
            site: site.into(),
            weekly: false,
            requires_qualification: None,
        }
    }

    pub fn requiring<Q: Into<String>>(mut self, tag: Q) -> Self {
        self.requires_qualification = Some(tag.into());
        self
    }

    /// Qualification exigée ; une étiquette vide vaut absence d'exigence.
    pub fn required_qualification(&self) -> Option<&str> {
        self.requires_qualification
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("shift type id cannot be empty".to_string());
        }
        if self.site.trim().is_empty() {
            return Err("shift type site cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Provenance d'une assignation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeneratedBy {
    #[default]
    #[serde(rename = "AI")]
    Machine,
    Human,
}

impl fmt::Display for GeneratedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratedBy::Machine => f.write_str("AI"),
            GeneratedBy::Human => f.write_str("Human"),
        }
    }
}

/// Identifiant fort pour Assignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentId(String);

impl AssignmentId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Réservation d'un praticien sur un shift à une date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default = "AssignmentId::random")]
    pub id: AssignmentId,
    pub provider_id: ProviderId,
    pub date: NaiveDate,
    pub shift_type: ShiftName,
    pub site: String,
    #[serde(default)]
    pub generated_by: GeneratedBy,
    #[serde(default)]
    pub audited_by: Option<String>,
}

impl Assignment {
    /// Assignation produite par la génération automatique.
    pub fn generated(provider_id: ProviderId, date: NaiveDate, shift: &ShiftType) -> Self {
        Self {
            id: AssignmentId::random(),
            provider_id,
            date,
            shift_type: shift.name,
            site: shift.site.clone(),
            generated_by: GeneratedBy::Machine,
            audited_by: None,
        }
    }
}

/// Soldes trimestriels (persistés, non lus par la génération).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quarter {
    pub year: i32,
    pub quarter: u8,
    #[serde(default)]
    pub acc_balance: i64,
    #[serde(default)]
    pub call_balance: i64,
}

/// Document complet : toutes les collections, dans l'ordre d'insertion.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub shift_types: Vec<ShiftType>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub quarters: Vec<Quarter>,
}

impl Roster {
    pub fn find_provider_by_id<'a>(&'a self, id: &ProviderId) -> Option<&'a Provider> {
        self.providers.iter().find(|p| &p.id == id)
    }
    pub fn find_shift_type_by_id<'a>(&'a self, id: &ShiftTypeId) -> Option<&'a ShiftType> {
        self.shift_types.iter().find(|s| &s.id == id)
    }
    pub fn find_assignment<'a>(
        &'a self,
        provider: &ProviderId,
        date: NaiveDate,
    ) -> Option<&'a Assignment> {
        self.assignments
            .iter()
            .find(|a| &a.provider_id == provider && a.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_fte_must_be_a_fraction() {
        assert!(Provider::new("a", "Alice").with_fte(0.5).validate().is_ok());
        assert!(Provider::new("a", "Alice").with_fte(1.2).validate().is_err());
        assert!(Provider::new("a", "Alice").with_fte(-0.1).validate().is_err());
    }

    #[test]
    fn shift_name_uses_wire_vocabulary() {
        let json = serde_json::to_string(&ShiftName::Regular).unwrap();
        assert_eq!(json, "\"REG\"");
        assert_eq!("call".parse::<ShiftName>().unwrap(), ShiftName::OnCall);
        assert!("night".parse::<ShiftName>().is_err());
    }

    #[test]
    fn blank_qualification_means_no_requirement() {
        let shift = ShiftType::new("reg", ShiftName::Regular, "S");
        assert_eq!(shift.clone().requiring("").required_qualification(), None);
        assert_eq!(shift.clone().requiring("  ").required_qualification(), None);
        assert_eq!(shift.requiring(" X ").required_qualification(), Some("X"));
    }

    #[test]
    fn assignment_defaults_to_machine_provenance() {
        let raw = r#"{"provider_id":"a","date":"2025-10-01","shift_type":"REG","site":"S"}"#;
        let a: Assignment = serde_json::from_str(raw).unwrap();
        assert_eq!(a.generated_by, GeneratedBy::Machine);
        assert!(a.audited_by.is_none());
        assert!(!a.id.as_str().is_empty());
    }
}
