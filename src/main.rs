use billing_core::config::{currency_symbol_from_env_value, recent_window_from_env_value};
use billing_core::constants::{CURRENCY_SYMBOL_ENV, RECENT_WINDOW_ENV};
use billing_core::{
    BillingDepartment, BillingDocument, CoreConfig, InventoryDepartment, PatientAccount,
    PatientRecord, ServiceCatalog, ServiceCategory, ServiceKind, StatusWalk,
};
use rust_decimal::Decimal;
use std::rc::Rc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Runs the sample hospital billing scenario end to end.
///
/// 1. Builds a discharge note from two catalog services and files it on a patient record
/// 2. Duplicates a discharge note and bills an extra service on the copy only
/// 3. Posts five services to a patient account watched by billing and inventory
/// 4. Walks a patient through the status sequence, one step past discharge
///
/// # Environment Variables
/// - `BILLING_RECENT_WINDOW`: events shown to departments per notification (default: 3)
/// - `BILLING_CURRENCY_SYMBOL`: symbol printed before amounts (default: "$")
/// - `RUST_LOG`: tracing filter (default directive: "billing_core=info")
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("billing_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::new(
        recent_window_from_env_value(std::env::var(RECENT_WINDOW_ENV).ok())?,
        currency_symbol_from_env_value(std::env::var(CURRENCY_SYMBOL_ENV).ok()),
    )?;

    tracing::info!("++ Starting billing sample run");

    discharge_note(&cfg)?;
    duplicated_discharge_note(&cfg)?;
    patient_account(&cfg)?;
    status_walk()?;

    Ok(())
}

fn discharge_note(cfg: &CoreConfig) -> anyhow::Result<()> {
    let mut patient = PatientRecord::new(1, "Juan Pérez", "Historial H001")?;

    let mut catalog = ServiceCatalog::new();
    let consult = catalog.register(
        1,
        ServiceKind::MedicalCare,
        "Consulta médica",
        Decimal::new(4000, 2),
    )?;
    let xray = catalog.register(
        2,
        ServiceKind::XRayImaging,
        "Radiografía",
        Decimal::new(10000, 2),
    )?;

    let mut note = BillingDocument::discharge_note(101, chrono::Local::now().date_naive());
    note.add_service(&consult)?;
    note.add_service(&xray)?;

    println!(
        "Discharge note subtotal: {}{:.2}",
        cfg.currency_symbol(),
        note.total()
    );
    patient.add_document(note);

    Ok(())
}

fn duplicated_discharge_note(cfg: &CoreConfig) -> anyhow::Result<()> {
    let symbol = cfg.currency_symbol();

    let mut catalog = ServiceCatalog::new();
    let general = catalog.register(
        1,
        ServiceKind::MedicalCare,
        "Consulta general",
        Decimal::new(5000, 2),
    )?;
    let blood = catalog.register(
        2,
        ServiceKind::LabExam,
        "Análisis de sangre",
        Decimal::new(3000, 2),
    )?;
    let chest = catalog.register(
        3,
        ServiceKind::XRayImaging,
        "Radiografía de tórax",
        Decimal::new(10000, 2),
    )?;

    let mut note = BillingDocument::discharge_note(101, chrono::Local::now().date_naive());
    note.add_service(&general)?;
    note.add_service(&blood)?;
    println!("Discharge note total: {}{:.2}", symbol, note.total());

    let mut copy = note.duplicate();
    println!(
        "Duplicated discharge note total: {}{:.2}",
        symbol,
        copy.total()
    );

    copy.add_service(&chest)?;
    println!("Original after duplication: {}{:.2}", symbol, note.total());
    println!(
        "Duplicate after adding a service: {}{:.2}",
        symbol,
        copy.total()
    );

    Ok(())
}

fn patient_account(cfg: &CoreConfig) -> anyhow::Result<()> {
    let mut account = PatientAccount::with_config("P001", "Juan Pérez", cfg)?;

    let billing = Rc::new(BillingDepartment::new("Principal", cfg, std::io::stdout()));
    let inventory = Rc::new(InventoryDepartment::new("Central", std::io::stdout()));
    account.attach(billing);
    account.attach(inventory);

    let posts = [
        (
            ServiceCategory::Consultation,
            "Consulta inicial con el doctor",
            15000,
        ),
        (ServiceCategory::Medication, "Antibióticos", 7550),
        (ServiceCategory::Laboratory, "Análisis de sangre", 20000),
        (ServiceCategory::XRay, "Radiografía de tórax", 12000),
        (ServiceCategory::Supplies, "Suministros médicos", 4500),
    ];
    for (category, description, cents) in posts {
        account.post_service(category, description, Decimal::new(cents, 2))?;
    }

    Ok(())
}

fn status_walk() -> anyhow::Result<()> {
    let mut patient = PatientRecord::new(2, "Juan Pérez", "")?;
    println!("\nInitial status: {}", patient.admit());

    for _ in 0..4 {
        if let Some(status) = StatusWalk::advance(&mut patient) {
            println!("Status: {}", status);
        }
    }

    Ok(())
}
