//! Patient accounts: a running log of posted services that departments subscribe to.

use crate::config::CoreConfig;
use crate::constants::MAX_POSTED_AMOUNT;
use crate::notification::{AccountSnapshot, DepartmentListener, NotificationHub};
use crate::validation::validate_posted_amount;
use crate::{BillingError, BillingResult};
use billing_types::NonEmptyText;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::rc::Rc;
use std::str::FromStr;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Category of a service posted to a patient account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Consultation,
    Medication,
    Laboratory,
    XRay,
    Supplies,
}

impl ServiceCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceCategory::Consultation => "consultation",
            ServiceCategory::Medication => "medication",
            ServiceCategory::Laboratory => "laboratory",
            ServiceCategory::XRay => "x_ray",
            ServiceCategory::Supplies => "supplies",
        }
    }

    /// Whether the inventory department has to check stock for this category.
    pub fn requires_inventory_check(self) -> bool {
        matches!(
            self,
            ServiceCategory::Medication | ServiceCategory::Supplies
        )
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = BillingError;

    /// Accepts the English names as well as the hospital's Spanish tags.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "consultation" | "consulta" => Ok(ServiceCategory::Consultation),
            "medication" | "medicamento" => Ok(ServiceCategory::Medication),
            "laboratory" | "laboratorio" => Ok(ServiceCategory::Laboratory),
            "x_ray" | "xray" | "rayos_x" => Ok(ServiceCategory::XRay),
            "supplies" | "suministros" => Ok(ServiceCategory::Supplies),
            other => Err(BillingError::Validation(format!(
                "unknown service category: {other}"
            ))),
        }
    }
}

/// One service posted to an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceEvent {
    pub category: ServiceCategory,
    pub description: NonEmptyText,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub posted_at: DateTime<Utc>,
}

/// Serialisable view of an account, for reporting.
#[derive(Debug, Serialize)]
pub struct AccountSummary<'a> {
    pub patient_id: &'a str,
    pub patient_name: &'a str,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub services: &'a [ServiceEvent],
}

// ============================================================================
// PatientAccount
// ============================================================================

/// Running account for one patient, with departments listening for new services.
#[derive(Debug)]
pub struct PatientAccount {
    patient_id: NonEmptyText,
    patient_name: NonEmptyText,
    services: Vec<ServiceEvent>,
    total: Decimal,
    hub: NotificationHub,
    recent_window: usize,
}

impl PatientAccount {
    /// Creates an account using the default configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the id or name is blank.
    pub fn new(patient_id: &str, patient_name: &str) -> BillingResult<Self> {
        Self::with_config(patient_id, patient_name, &CoreConfig::default())
    }

    /// # Errors
    ///
    /// Returns a validation error if the id or name is blank.
    pub fn with_config(
        patient_id: &str,
        patient_name: &str,
        cfg: &CoreConfig,
    ) -> BillingResult<Self> {
        Ok(Self {
            patient_id: NonEmptyText::new(patient_id)?,
            patient_name: NonEmptyText::new(patient_name)?,
            services: Vec::new(),
            total: Decimal::ZERO,
            hub: NotificationHub::new(),
            recent_window: cfg.recent_window(),
        })
    }

    pub fn patient_id(&self) -> &str {
        self.patient_id.as_str()
    }

    pub fn patient_name(&self) -> &str {
        self.patient_name.as_str()
    }

    /// Every posted service, oldest first.
    pub fn services(&self) -> &[ServiceEvent] {
        &self.services
    }

    /// The last few services, oldest first, as departments see them.
    pub fn recent_services(&self) -> &[ServiceEvent] {
        let start = self.services.len().saturating_sub(self.recent_window);
        &self.services[start..]
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn listener_count(&self) -> usize {
        self.hub.len()
    }

    /// See [`NotificationHub::attach`].
    pub fn attach(&mut self, listener: Rc<dyn DepartmentListener>) -> bool {
        self.hub.attach(listener)
    }

    /// See [`NotificationHub::detach`].
    pub fn detach<L: DepartmentListener + ?Sized>(
        &mut self,
        listener: &Rc<L>,
    ) -> BillingResult<()> {
        self.hub.detach(listener)
    }

    pub fn snapshot(&self) -> AccountSnapshot<'_> {
        AccountSnapshot {
            patient_id: self.patient_id.as_str(),
            patient_name: self.patient_name.as_str(),
            total: self.total,
            recent: self.recent_services(),
        }
    }

    pub fn summary(&self) -> AccountSummary<'_> {
        AccountSummary {
            patient_id: self.patient_id.as_str(),
            patient_name: self.patient_name.as_str(),
            total: self.total,
            services: &self.services,
        }
    }

    /// Records a service, adds it to the running total and notifies every department.
    ///
    /// Posting is stricter than the bare event log, which would take any description and amount:
    /// a blank description, a negative amount or one above [`MAX_POSTED_AMOUNT`] is rejected
    /// before anything is recorded or any department is notified.
    ///
    /// The event stays recorded even if a department fails; that department's error is
    /// returned and departments attached after it are not notified.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a rejected description or amount, or if the running
    /// total would overflow (nothing is recorded in either case), or the first department error.
    pub fn post_service(
        &mut self,
        category: ServiceCategory,
        description: &str,
        amount: Decimal,
    ) -> BillingResult<()> {
        let description = NonEmptyText::new(description)?;
        let amount = validate_posted_amount(amount)?;
        let total = self.total.checked_add(amount).ok_or_else(|| {
            BillingError::Validation(format!(
                "posting {amount} would overflow the account total"
            ))
        })?;

        tracing::info!(
            patient_id = self.patient_id.as_str(),
            category = category.as_str(),
            %amount,
            "service posted: {}",
            description
        );

        self.services.push(ServiceEvent {
            category,
            description,
            amount,
            posted_at: Utc::now(),
        });
        self.total = total;

        self.hub.notify(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Spy {
        seen: RefCell<Vec<(Decimal, Vec<String>)>>,
    }

    impl Spy {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                seen: RefCell::new(Vec::new()),
            })
        }
    }

    impl DepartmentListener for Spy {
        fn department(&self) -> &str {
            "spy"
        }

        fn update(&self, snapshot: &AccountSnapshot<'_>) -> BillingResult<()> {
            let recent = snapshot
                .recent
                .iter()
                .map(|e| e.description.as_str().to_string())
                .collect();
            self.seen.borrow_mut().push((snapshot.total, recent));
            Ok(())
        }
    }

    struct Broken;

    impl DepartmentListener for Broken {
        fn department(&self) -> &str {
            "broken"
        }

        fn update(&self, _snapshot: &AccountSnapshot<'_>) -> BillingResult<()> {
            Err(BillingError::Notification {
                department: "broken".into(),
                source: std::io::Error::other("offline"),
            })
        }
    }

    fn post_five(account: &mut PatientAccount) {
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
            account
                .post_service(category, description, Decimal::new(cents, 2))
                .expect("post service");
        }
    }

    #[test]
    fn running_total_and_log() {
        let mut account = PatientAccount::new("P001", "Juan Pérez").expect("account");
        post_five(&mut account);

        assert_eq!(account.services().len(), 5);
        assert_eq!(account.total(), Decimal::new(59050, 2));
        assert_eq!(account.services()[1].category, ServiceCategory::Medication);
    }

    #[test]
    fn listener_sees_last_three_events_in_order() {
        let mut account = PatientAccount::new("P001", "Juan Pérez").expect("account");
        let spy = Spy::new();
        account.attach(spy.clone());
        post_five(&mut account);

        let seen = spy.seen.borrow();
        assert_eq!(seen.len(), 5);
        let (total, recent) = &seen[4];
        assert_eq!(*total, Decimal::new(59050, 2));
        assert_eq!(
            recent,
            &vec![
                "Análisis de sangre".to_string(),
                "Radiografía de tórax".to_string(),
                "Suministros médicos".to_string(),
            ]
        );
        assert_eq!(
            seen[0].1,
            vec!["Consulta inicial con el doctor".to_string()]
        );
    }

    #[test]
    fn recent_window_follows_config() {
        let cfg = CoreConfig::new(2, "$".into()).expect("config");
        let mut account = PatientAccount::with_config("P002", "Ana Gómez", &cfg).expect("account");
        post_five(&mut account);

        let recent: Vec<&str> = account
            .recent_services()
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert_eq!(recent, vec!["Radiografía de tórax", "Suministros médicos"]);
    }

    #[test]
    fn attaching_same_listener_twice_notifies_once() {
        let mut account = PatientAccount::new("P001", "Juan Pérez").expect("account");
        let spy = Spy::new();
        assert!(account.attach(spy.clone()));
        assert!(!account.attach(spy.clone()));

        account
            .post_service(
                ServiceCategory::Consultation,
                "Consulta",
                Decimal::new(15000, 2),
            )
            .expect("post");
        assert_eq!(spy.seen.borrow().len(), 1);
    }

    #[test]
    fn detached_listener_is_not_notified() {
        let mut account = PatientAccount::new("P001", "Juan Pérez").expect("account");
        let spy = Spy::new();
        account.attach(spy.clone());
        account.detach(&spy).expect("detach");

        account
            .post_service(ServiceCategory::Consultation, "Consulta", Decimal::ONE)
            .expect("post");
        assert!(spy.seen.borrow().is_empty());
        assert!(account.detach(&spy).expect_err("gone").is_not_found());
    }

    #[test]
    fn invalid_post_records_nothing() {
        let mut account = PatientAccount::new("P001", "Juan Pérez").expect("account");
        let spy = Spy::new();
        account.attach(spy.clone());

        let err = account
            .post_service(
                ServiceCategory::Medication,
                "Antibióticos",
                Decimal::NEGATIVE_ONE,
            )
            .expect_err("negative amount");
        assert!(err.is_validation());

        let err = account
            .post_service(ServiceCategory::Supplies, "Equipo", Decimal::MAX)
            .expect_err("amount above maximum");
        assert!(err.is_validation());

        let err = account
            .post_service(ServiceCategory::Medication, " ", Decimal::ONE)
            .expect_err("blank description");
        assert!(err.is_validation());

        assert!(account.services().is_empty());
        assert_eq!(account.total(), Decimal::ZERO);
        assert!(spy.seen.borrow().is_empty());
    }

    #[test]
    fn largest_posts_keep_log_and_total_in_step() {
        let mut account = PatientAccount::new("P001", "Juan Pérez").expect("account");
        for _ in 0..3 {
            account
                .post_service(ServiceCategory::Supplies, "Equipo", MAX_POSTED_AMOUNT)
                .expect("post");
        }

        let logged: Decimal = account.services().iter().map(|e| e.amount).sum();
        assert_eq!(account.services().len(), 3);
        assert_eq!(account.total(), logged);
        assert_eq!(account.total(), MAX_POSTED_AMOUNT * Decimal::from(3));
    }

    #[test]
    fn listener_failure_propagates_after_recording() {
        let mut account = PatientAccount::new("P001", "Juan Pérez").expect("account");
        let before = Spy::new();
        let after = Spy::new();
        account.attach(before.clone());
        account.attach(Rc::new(Broken));
        account.attach(after.clone());

        let err = account
            .post_service(ServiceCategory::Supplies, "Gasas", Decimal::new(500, 2))
            .expect_err("broken listener");
        assert!(matches!(err, BillingError::Notification { .. }));

        assert_eq!(account.services().len(), 1);
        assert_eq!(account.total(), Decimal::new(500, 2));
        assert_eq!(before.seen.borrow().len(), 1);
        assert!(after.seen.borrow().is_empty());
    }

    #[test]
    fn parses_spanish_and_english_categories() {
        let parse = |tag: &str| tag.parse::<ServiceCategory>();

        let medication = parse("medicamento").expect("es");
        assert_eq!(medication, ServiceCategory::Medication);
        assert_eq!(parse("X_RAY").expect("en"), ServiceCategory::XRay);
        assert_eq!(parse("rayos_x").expect("es"), ServiceCategory::XRay);
        assert!(parse("cirugia").expect_err("unknown").is_validation());
    }

    #[test]
    fn summary_serialises_amounts_as_strings() {
        let mut account = PatientAccount::new("P001", "Juan Pérez").expect("account");
        account
            .post_service(
                ServiceCategory::Medication,
                "Antibióticos",
                Decimal::new(7550, 2),
            )
            .expect("post");

        let json = serde_json::to_value(account.summary()).expect("serialise");
        assert_eq!(json["total"], "75.50");
        assert_eq!(json["services"][0]["category"], "medication");
        assert_eq!(json["services"][0]["description"], "Antibióticos");
    }
}
