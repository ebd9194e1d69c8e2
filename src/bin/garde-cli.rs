#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use garde::{
    io,
    model::{Provider, ShiftName, ShiftType},
    scheduler::{GenerateRequest, Scheduler, ViolationKind},
    store::JsonStore,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération de tableaux de garde
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de stockage
    #[arg(long, global = true, default_value = "garde.json")]
    db: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enregistrer un praticien
    AddProvider {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 1.0)]
        fte: f64,
        #[arg(long)]
        call_sign: Option<String>,
        #[arg(long, default_value_t = 0)]
        acc_target: u32,
        #[arg(long, default_value_t = 0)]
        call_target: u32,
        /// liste "tag1,tag2,..."
        #[arg(long)]
        qualifications: Option<String>,
        /// liste "site1,site2,..." par ordre de préférence
        #[arg(long)]
        sites: Option<String>,
        #[arg(long, default_value_t = 0)]
        seniority: u32,
        #[arg(long, default_value_t = 0.0)]
        politics_weight: f64,
    },

    /// Enregistrer un type de shift
    AddShiftType {
        #[arg(long)]
        id: String,
        /// REG, APS, CALL ou OFF
        #[arg(long)]
        name: String,
        #[arg(long)]
        site: String,
        #[arg(long)]
        weekly: bool,
        #[arg(long)]
        requires: Option<String>,
    },

    /// Importer des praticiens depuis un CSV
    ImportProviders {
        #[arg(long)]
        csv: String,
    },

    /// Importer des types de shift depuis un CSV
    ImportShiftTypes {
        #[arg(long)]
        csv: String,
    },

    /// Lister les praticiens
    Providers,

    /// Lister les types de shift
    ShiftTypes,

    /// Générer les gardes REG sur une plage de dates (bornes incluses)
    Generate {
        /// YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end: String,
        /// Export JSON du rapport (optionnel)
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Lister et optionnellement exporter les assignations
    Assignments {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier l'intégrité des assignations
    Check,

    /// État du stockage
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let store = JsonStore::open(&cli.db)?;
    let mut scheduler = Scheduler::new(store);

    let code = match cli.cmd {
        Commands::AddProvider {
            id,
            name,
            fte,
            call_sign,
            acc_target,
            call_target,
            qualifications,
            sites,
            seniority,
            politics_weight,
        } => {
            let mut provider = Provider::new(id, name).with_fte(fte);
            provider.call_sign = call_sign;
            provider.acc_target = acc_target;
            provider.call_target = call_target;
            provider.qualifications = split_list(qualifications.as_deref()).collect();
            provider.site_preferences = split_list(sites.as_deref()).collect();
            provider.seniority_level = seniority;
            provider.politics_weight = politics_weight;
            let provider = scheduler.register_provider(provider)?;
            println!("provider {} registered", provider.id);
            0
        }
        Commands::AddShiftType {
            id,
            name,
            site,
            weekly,
            requires,
        } => {
            let name: ShiftName = name.parse().map_err(anyhow::Error::msg)?;
            let mut shift = ShiftType::new(id, name, site);
            shift.weekly = weekly;
            shift.requires_qualification = requires;
            let shift = scheduler.register_shift_type(shift)?;
            println!("shift type {} registered", shift.id);
            0
        }
        Commands::ImportProviders { csv } => {
            let providers = io::import_providers_csv(csv)?;
            let count = scheduler.register_providers(providers)?;
            println!("{count} provider(s) imported");
            0
        }
        Commands::ImportShiftTypes { csv } => {
            let shifts = io::import_shift_types_csv(csv)?;
            let count = scheduler.register_shift_types(shifts)?;
            println!("{count} shift type(s) imported");
            0
        }
        Commands::Providers => {
            for p in scheduler.providers()? {
                let quals: Vec<&str> = p.qualifications.iter().map(String::as_str).collect();
                println!("{} | {} | fte {} | {}", p.id, p.name, p.fte, quals.join(","));
            }
            0
        }
        Commands::ShiftTypes => {
            for s in scheduler.shift_types()? {
                println!(
                    "{} | {} | {} | {}",
                    s.id,
                    s.name,
                    s.site,
                    s.required_qualification().unwrap_or("-")
                );
            }
            0
        }
        Commands::Generate {
            start,
            end,
            out_json,
        } => {
            let request = GenerateRequest::new(parse_date(&start)?, parse_date(&end)?);
            let report = scheduler.generate(&request)?;
            if let Some(path) = out_json {
                io::export_report_json(path, &report)?;
            }
            println!("created: {}", report.created);
            if report.conflicts.is_empty() {
                0
            } else {
                eprintln!("Found {} conflict(s)", report.conflicts.len());
                for c in &report.conflicts {
                    eprintln!("{c}");
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Assignments { out_json, out_csv } => {
            let assignments = scheduler.assignments()?;
            if let Some(path) = out_json {
                io::export_assignments_json(path, &assignments)?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &assignments)?;
            }
            for a in &assignments {
                println!(
                    "{} | {} | {} | {} | {}",
                    a.date, a.provider_id, a.shift_type, a.site, a.generated_by
                );
            }
            0
        }
        Commands::Check => {
            let violations = scheduler.check_integrity()?;
            if violations.is_empty() {
                println!("OK: no violations");
                0
            } else {
                eprintln!("Found {} violation(s)", violations.len());
                for v in &violations {
                    let kind = match v.kind {
                        ViolationKind::DoubleBooking => "double",
                        ViolationKind::UnknownProvider => "unknown-provider",
                    };
                    eprintln!("{} | {} | {}", v.date, v.provider, kind);
                }
                2
            }
        }
        Commands::Status => {
            let roster = scheduler.store().roster();
            println!("store: {}", scheduler.store().path().display());
            println!("provider: {}", roster.providers.len());
            println!("shifttype: {}", roster.shift_types.len());
            println!("assignment: {}", roster.assignments.len());
            println!("quarter: {}", roster.quarters.len());
            0
        }
    };

    std::process::exit(code);
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date (expected YYYY-MM-DD): {raw}"))
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = String> + '_ {
    raw.unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
