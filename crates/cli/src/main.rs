use billing_core::config::{currency_symbol_from_env_value, recent_window_from_env_value};
use billing_core::constants::{CURRENCY_SYMBOL_ENV, RECENT_WINDOW_ENV};
use billing_core::{
    BillingDepartment, BillingDocument, CoreConfig, InventoryDepartment, PatientAccount,
    PatientRecord, ServiceCatalog, ServiceCategory, ServiceKind, StatusWalk,
};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "billing")]
#[command(about = "Hospital billing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the service catalog
    Catalog {
        /// YAML catalog file (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Build a discharge note from catalog services and print its total
    Discharge {
        /// Document number
        #[arg(long, default_value_t = 101)]
        number: u32,
        /// YAML catalog file (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Catalog ids to post, one line each
        #[arg(long = "service", default_values_t = [1, 2])]
        services: Vec<u32>,
        /// Catalog ids to post to a duplicate of the note only
        #[arg(long = "duplicate-with")]
        duplicate_with: Vec<u32>,
    },
    /// Post services to a patient account and print each department's notices
    Account {
        /// Patient id
        patient_id: String,
        /// Patient name
        name: String,
        /// Service as category:description:amount (repeatable)
        #[arg(long = "post")]
        posts: Vec<String>,
        /// Print the final account as JSON
        #[arg(long)]
        json: bool,
    },
    /// Walk a patient through the status sequence
    Status {
        /// Patient name
        name: String,
        /// Number of advances
        #[arg(long, default_value_t = 4)]
        steps: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = CoreConfig::new(
        recent_window_from_env_value(std::env::var(RECENT_WINDOW_ENV).ok())?,
        currency_symbol_from_env_value(std::env::var(CURRENCY_SYMBOL_ENV).ok()),
    )?;

    match cli.command {
        Some(Commands::Catalog { catalog }) => match load_catalog(catalog.as_deref()) {
            Ok(catalog) => {
                for entry in catalog.entries() {
                    println!(
                        "{:>4}  {:<18} {:<32} {}{}",
                        entry.id(),
                        entry.kind().label(),
                        entry.description(),
                        cfg.currency_symbol(),
                        entry.unit_price()
                    );
                }
            }
            Err(e) => eprintln!("Error loading catalog: {}", e),
        },
        Some(Commands::Discharge {
            number,
            catalog,
            services,
            duplicate_with,
        }) => {
            if let Err(e) = run_discharge(
                &cfg,
                number,
                catalog.as_deref(),
                &services,
                &duplicate_with,
            ) {
                eprintln!("Error building discharge note: {}", e);
            }
        }
        Some(Commands::Account {
            patient_id,
            name,
            posts,
            json,
        }) => {
            if let Err(e) = run_account(&cfg, &patient_id, &name, &posts, json) {
                eprintln!("Error posting services: {}", e);
            }
        }
        Some(Commands::Status { name, steps }) => match PatientRecord::new(1, &name, "") {
            Ok(mut patient) => {
                println!("Initial status: {}", patient.admit());
                for _ in 0..steps {
                    if let Some(status) = StatusWalk::advance(&mut patient) {
                        println!("Status: {}", status);
                    }
                }
            }
            Err(e) => eprintln!("Error creating patient: {}", e),
        },
        None => {
            println!("Use 'billing --help' for commands");
        }
    }

    Ok(())
}

fn builtin_catalog() -> Result<ServiceCatalog, Box<dyn std::error::Error>> {
    let services = [
        (1, ServiceKind::MedicalCare, "Consulta médica", 4000),
        (2, ServiceKind::XRayImaging, "Radiografía", 10000),
        (3, ServiceKind::LabExam, "Análisis de sangre", 3000),
        (4, ServiceKind::MedicationSupply, "Antibióticos", 7550),
        (5, ServiceKind::MedicalProcedure, "Sutura", 12000),
    ];

    let mut catalog = ServiceCatalog::new();
    for (id, kind, description, cents) in services {
        catalog.register(id, kind, description, Decimal::new(cents, 2))?;
    }
    Ok(catalog)
}

fn load_catalog(path: Option<&Path>) -> Result<ServiceCatalog, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(ServiceCatalog::from_yaml(&text)?)
        }
        None => builtin_catalog(),
    }
}

fn run_discharge(
    cfg: &CoreConfig,
    number: u32,
    catalog: Option<&Path>,
    services: &[u32],
    duplicate_with: &[u32],
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(catalog)?;
    let symbol = cfg.currency_symbol();
    let today = chrono::Local::now().date_naive();

    let mut note = BillingDocument::discharge_note(number, today);
    for id in services {
        note.add_service(&catalog.lookup(*id)?)?;
    }

    for line in note.lines() {
        let description = line
            .service()
            .map(|s| s.description().to_string())
            .unwrap_or_default();
        println!(
            "  {} x {:<28} {}{}",
            line.quantity(),
            description,
            symbol,
            line.unit_price()
        );
    }
    println!(
        "Discharge note {} total: {}{:.2}",
        number,
        symbol,
        note.total()
    );

    if !duplicate_with.is_empty() {
        let mut copy = note.duplicate();
        for id in duplicate_with {
            copy.add_service(&catalog.lookup(*id)?)?;
        }
        println!("Original after duplication: {}{:.2}", symbol, note.total());
        println!("Duplicate total: {}{:.2}", symbol, copy.total());
    }

    Ok(())
}

/// Splits `category:description:amount`. The description may itself contain colons.
fn parse_post(raw: &str) -> Result<(ServiceCategory, String, Decimal), Box<dyn std::error::Error>> {
    let (category, rest) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected category:description:amount, got {raw:?}"))?;
    let (description, amount) = rest
        .rsplit_once(':')
        .ok_or_else(|| format!("expected category:description:amount, got {raw:?}"))?;

    let category: ServiceCategory = category.parse()?;
    let amount: Decimal = amount.trim().parse()?;
    Ok((category, description.to_string(), amount))
}

fn run_account(
    cfg: &CoreConfig,
    patient_id: &str,
    name: &str,
    posts: &[String],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut account = PatientAccount::with_config(patient_id, name, cfg)?;
    account.attach(std::rc::Rc::new(BillingDepartment::new(
        "Main",
        cfg,
        std::io::stdout(),
    )));
    account.attach(std::rc::Rc::new(InventoryDepartment::new(
        "Central",
        std::io::stdout(),
    )));

    for raw in posts {
        let (category, description, amount) = parse_post(raw)?;
        account.post_service(category, &description, amount)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&account.summary())?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_post_accepts_colons_in_description() {
        let (category, description, amount) =
            parse_post("suministros:Kit: gasas y vendas:45.00").expect("valid post");
        assert_eq!(category, ServiceCategory::Supplies);
        assert_eq!(description, "Kit: gasas y vendas");
        assert_eq!(amount, Decimal::new(4500, 2));
    }

    #[test]
    fn parse_post_rejects_malformed_input() {
        assert!(parse_post("consulta").is_err());
        assert!(parse_post("consulta:Consulta").is_err());
        assert!(parse_post("cirugia:Apendicectomía:900").is_err());
        assert!(parse_post("consulta:Consulta:cien").is_err());
    }

    #[test]
    fn builtin_catalog_has_the_sample_services() {
        let catalog = builtin_catalog().expect("builtin catalog");
        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.lookup(2).expect("x-ray").unit_price().amount(),
            Decimal::new(10000, 2)
        );
    }

    #[test]
    fn load_catalog_reads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let yaml = r#"services:
  - id: 7
    kind: lab_exam
    description: "Hemograma"
    unit_price: "25.00"
"#;
        file.write_all(yaml.as_bytes()).expect("write catalog");

        let catalog = load_catalog(Some(file.path())).expect("load catalog");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup(7).expect("entry").description(), "Hemograma");
    }

    #[test]
    fn load_catalog_reports_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.yaml");
        assert!(load_catalog(Some(missing.as_path())).is_err());
    }
}
