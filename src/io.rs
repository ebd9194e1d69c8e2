use crate::model::{Assignment, Provider, ShiftName, ShiftType};
use crate::scheduler::GenerateReport;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de praticiens depuis CSV.
///
/// Header `id,name,fte[,call_sign][,acc_target][,call_target][,site_preferences][,qualifications][,seniority_level][,politics_weight]`,
/// listes séparées par `;`.
pub fn import_providers_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Provider>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        if id.is_empty() || name.is_empty() {
            bail!("invalid provider row (empty)");
        }
        let fte = rec.get(2).context("missing fte")?.trim();
        let mut provider = Provider::new(id, name);
        provider.fte = fte
            .parse()
            .with_context(|| format!("invalid fte for provider {id}"))?;
        provider.call_sign = optional(&rec, 3).map(str::to_string);
        if let Some(v) = optional(&rec, 4) {
            provider.acc_target = v
                .parse()
                .with_context(|| format!("invalid acc_target for provider {id}"))?;
        }
        if let Some(v) = optional(&rec, 5) {
            provider.call_target = v
                .parse()
                .with_context(|| format!("invalid call_target for provider {id}"))?;
        }
        if let Some(v) = optional(&rec, 6) {
            provider.site_preferences = split_list(v).map(str::to_string).collect();
        }
        if let Some(v) = optional(&rec, 7) {
            provider.qualifications = split_list(v).map(str::to_string).collect();
        }
        if let Some(v) = optional(&rec, 8) {
            provider.seniority_level = v
                .parse()
                .with_context(|| format!("invalid seniority_level for provider {id}"))?;
        }
        if let Some(v) = optional(&rec, 9) {
            provider.politics_weight = v
                .parse()
                .with_context(|| format!("invalid politics_weight for provider {id}"))?;
        }
        out.push(provider);
    }
    Ok(out)
}

/// Import de types de shift: header `id,name,site[,weekly][,requires_qualification]`
pub fn import_shift_types_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ShiftType>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        let site = rec.get(2).context("missing site")?.trim();
        if id.is_empty() || site.is_empty() {
            bail!("invalid shift type row (empty)");
        }
        let name: ShiftName = name.parse().map_err(anyhow::Error::msg)?;
        let mut shift = ShiftType::new(id, name, site);
        if let Some(flag) = optional(&rec, 3) {
            shift.weekly = parse_bool(flag)
                .with_context(|| format!("invalid weekly value for shift type {id}"))?;
        }
        shift.requires_qualification = optional(&rec, 4).map(str::to_string);
        out.push(shift);
    }
    Ok(out)
}

fn optional(rec: &StringRecord, idx: usize) -> Option<&str> {
    rec.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

/// Export JSON des assignations (jolie mise en forme)
pub fn export_assignments_json<P: AsRef<Path>>(
    path: P,
    assignments: &[Assignment],
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(assignments)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des assignations: header `id,provider_id,date,shift_type,site,generated_by,audited_by`
pub fn export_assignments_csv<P: AsRef<Path>>(
    path: P,
    assignments: &[Assignment],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "id",
        "provider_id",
        "date",
        "shift_type",
        "site",
        "generated_by",
        "audited_by",
    ])?;
    for a in assignments {
        let date = a.date.to_string();
        let generated_by = a.generated_by.to_string();
        w.write_record([
            a.id.as_str(),
            a.provider_id.as_str(),
            date.as_str(),
            a.shift_type.as_str(),
            a.site.as_str(),
            generated_by.as_str(),
            a.audited_by.as_deref().unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export JSON du rapport de génération
pub fn export_report_json<P: AsRef<Path>>(path: P, report: &GenerateReport) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(report)?;
    fs::write(path, s)?;
    Ok(())
}
