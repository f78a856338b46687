//! Service catalog: the immutable billable items lines are priced from.
//!
//! Responsibilities:
//! - Own every [`ServiceEntry`] behind an `Rc` so billing lines can keep a weak reference to it
//! - Register entries (logging each one) and look them up by id
//! - Load seed entries from a strict YAML wire model
//!
//! Notes:
//! - Entries are never mutated after registration
//! - Lines snapshot the unit price when they are created, so a catalog entry is only ever read
//!   for display after that point

use crate::{BillingError, BillingResult};
use billing_types::{NonEmptyText, UnitPrice};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::rc::Rc;

// ============================================================================
// Public domain-level types
// ============================================================================

/// The kind of care a catalog entry bills for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    MedicalCare,
    LabExam,
    XRayImaging,
    MedicationSupply,
    MedicalProcedure,
}

impl ServiceKind {
    /// Human-readable label used in registration logs.
    pub fn label(self) -> &'static str {
        match self {
            ServiceKind::MedicalCare => "medical care",
            ServiceKind::LabExam => "laboratory exam",
            ServiceKind::XRayImaging => "x-ray imaging",
            ServiceKind::MedicationSupply => "medication supply",
            ServiceKind::MedicalProcedure => "medical procedure",
        }
    }
}

/// An immutable billable item.
#[derive(Debug, PartialEq, Eq)]
pub struct ServiceEntry {
    id: u32,
    kind: ServiceKind,
    description: NonEmptyText,
    unit_price: UnitPrice,
}

impl ServiceEntry {
    pub fn new(
        id: u32,
        kind: ServiceKind,
        description: NonEmptyText,
        unit_price: UnitPrice,
    ) -> Self {
        Self {
            id,
            kind,
            description,
            unit_price,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn unit_price(&self) -> UnitPrice {
        self.unit_price
    }

    /// Logs the registration of this entry.
    pub fn register(&self) {
        tracing::info!(
            service_id = self.id,
            kind = self.kind.label(),
            "registered service: {} (${})",
            self.description,
            self.unit_price
        );
    }
}

/// Registry of service entries, keyed by id.
#[derive(Debug, Default)]
pub struct ServiceCatalog {
    entries: BTreeMap<u32, Rc<ServiceEntry>>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new entry and returns the shared handle lines should be built from.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the description is blank, the price is negative or above
    /// [`UnitPrice::MAX`], or the id is already registered.
    pub fn register(
        &mut self,
        id: u32,
        kind: ServiceKind,
        description: &str,
        unit_price: Decimal,
    ) -> BillingResult<Rc<ServiceEntry>> {
        let entry = ServiceEntry::new(
            id,
            kind,
            NonEmptyText::new(description)?,
            UnitPrice::new(unit_price)?,
        );
        self.insert(entry)
    }

    fn insert(&mut self, entry: ServiceEntry) -> BillingResult<Rc<ServiceEntry>> {
        if self.entries.contains_key(&entry.id) {
            return Err(BillingError::Validation(format!(
                "service {} is already registered",
                entry.id
            )));
        }

        entry.register();
        let entry = Rc::new(entry);
        self.entries.insert(entry.id, Rc::clone(&entry));
        Ok(entry)
    }

    /// Looks up an entry by id.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NotFound` if no entry has this id.
    pub fn lookup(&self, id: u32) -> BillingResult<Rc<ServiceEntry>> {
        self.entries
            .get(&id)
            .cloned()
            .ok_or_else(|| BillingError::NotFound(format!("service {id} is not in the catalog")))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = &Rc<ServiceEntry>> {
        self.entries.values()
    }

    /// Parse a catalog from YAML text.
    ///
    /// Uses `serde_path_to_error` so a schema mismatch reports the path of the failing field
    /// (for example `services[1].unit_price`).
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::CatalogYaml`] if:
    /// - the YAML does not match the catalog wire schema,
    /// - any unknown keys are present,
    /// - an entry has a blank description or a price outside `0..=UnitPrice::MAX`,
    /// - an id appears twice.
    pub fn from_yaml(yaml_text: &str) -> BillingResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, CatalogWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(BillingError::CatalogYaml(format!("at {path}: {source}")));
            }
        };

        wire_to_domain(wire)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogWire {
    services: Vec<ServiceWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceWire {
    id: u32,
    kind: ServiceKind,
    description: NonEmptyText,
    unit_price: UnitPrice,
}

fn wire_to_domain(wire: CatalogWire) -> BillingResult<ServiceCatalog> {
    let mut catalog = ServiceCatalog::new();

    for service in wire.services {
        catalog
            .insert(ServiceEntry::new(
                service.id,
                service.kind,
                service.description,
                service.unit_price,
            ))
            .map_err(|e| BillingError::CatalogYaml(e.to_string()))?;
    }

    Ok(catalog)
}
