//! # Billing Core
//!
//! Core billing logic for hospital patient accounts.
//!
//! This crate contains pure in-memory operations:
//! - A service catalog of immutable billable items
//! - Billing documents (invoices, discharge notes) as trees of lines and nested documents, with
//!   recursive totals and deep duplication
//! - Patient accounts that fan every posted service out to department listeners
//! - Patient records and their linear status walk
//!
//! **No driver concerns**: seeding sample data, reading the environment and printing results
//! belong in `billing-run` and `billing-cli`.

pub mod account;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod departments;
pub mod document;
pub mod error;
pub mod line;
pub mod notification;
pub mod patient;
pub mod status;
pub mod validation;

pub use account::{AccountSummary, PatientAccount, ServiceCategory, ServiceEvent};
pub use catalog::{ServiceCatalog, ServiceEntry, ServiceKind};
pub use config::CoreConfig;
pub use departments::{BillingDepartment, InventoryDepartment};
pub use document::{Billable, BillingDocument, Component, DocumentKind};
pub use error::{BillingError, BillingResult};
pub use line::BillingLine;
pub use notification::{AccountSnapshot, DepartmentListener, NotificationHub};
pub use patient::PatientRecord;
pub use status::{PatientStatus, StatusWalk};

pub use billing_types::{NonEmptyText, Quantity, UnitPrice};
