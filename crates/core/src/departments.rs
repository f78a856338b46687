//! Hospital departments that listen to patient accounts.
//!
//! Each department renders a short notice to its own output sink every time a service is posted.
//! A failed write is reported as a notification failure for that department.

use crate::config::CoreConfig;
use crate::notification::{AccountSnapshot, DepartmentListener};
use crate::{BillingError, BillingResult};
use std::cell::{Ref, RefCell};
use std::io::Write;

/// Billing prints the running total and the recent services with their amounts.
#[derive(Debug)]
pub struct BillingDepartment<W: Write> {
    name: String,
    label: String,
    currency_symbol: String,
    out: RefCell<W>,
}

impl<W: Write> BillingDepartment<W> {
    pub fn new(name: &str, cfg: &CoreConfig, out: W) -> Self {
        Self {
            name: name.to_string(),
            label: format!("billing/{name}"),
            currency_symbol: cfg.currency_symbol().to_string(),
            out: RefCell::new(out),
        }
    }

    /// Everything written so far.
    pub fn output(&self) -> Ref<'_, W> {
        self.out.borrow()
    }

    pub fn into_output(self) -> W {
        self.out.into_inner()
    }

    fn write_notice(&self, snapshot: &AccountSnapshot<'_>) -> std::io::Result<()> {
        let mut out = self.out.borrow_mut();
        let symbol = &self.currency_symbol;

        writeln!(out)?;
        writeln!(out, "Billing department {} notified:", self.name)?;
        writeln!(out, "Patient: {}", snapshot.patient_name)?;
        writeln!(out, "Total amount: {symbol}{:.2}", snapshot.total)?;
        writeln!(out, "Recent services:")?;
        for event in snapshot.recent {
            writeln!(
                out,
                "- {}: {} ({symbol}{:.2})",
                event.category, event.description, event.amount
            )?;
        }
        out.flush()
    }
}

impl<W: Write> DepartmentListener for BillingDepartment<W> {
    fn department(&self) -> &str {
        &self.label
    }

    fn update(&self, snapshot: &AccountSnapshot<'_>) -> BillingResult<()> {
        self.write_notice(snapshot)
            .map_err(|source| BillingError::Notification {
                department: self.label.clone(),
                source,
            })
    }
}

/// Inventory only cares about recent services that consume stock.
#[derive(Debug)]
pub struct InventoryDepartment<W: Write> {
    name: String,
    label: String,
    out: RefCell<W>,
}

impl<W: Write> InventoryDepartment<W> {
    pub fn new(name: &str, out: W) -> Self {
        Self {
            name: name.to_string(),
            label: format!("inventory/{name}"),
            out: RefCell::new(out),
        }
    }

    pub fn output(&self) -> Ref<'_, W> {
        self.out.borrow()
    }

    pub fn into_output(self) -> W {
        self.out.into_inner()
    }

    fn write_notice(&self, snapshot: &AccountSnapshot<'_>) -> std::io::Result<()> {
        let mut out = self.out.borrow_mut();

        writeln!(out)?;
        writeln!(out, "Inventory department {} notified:", self.name)?;
        writeln!(out, "Patient: {}", snapshot.patient_name)?;
        writeln!(out, "Recent services requiring an inventory check:")?;
        for event in snapshot
            .recent
            .iter()
            .filter(|e| e.category.requires_inventory_check())
        {
            writeln!(out, "- {}: {}", event.category, event.description)?;
        }
        out.flush()
    }
}

impl<W: Write> DepartmentListener for InventoryDepartment<W> {
    fn department(&self) -> &str {
        &self.label
    }

    fn update(&self, snapshot: &AccountSnapshot<'_>) -> BillingResult<()> {
        self.write_notice(snapshot)
            .map_err(|source| BillingError::Notification {
                department: self.label.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{PatientAccount, ServiceCategory};
    use rust_decimal::Decimal;
    use std::rc::Rc;

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).expect("utf-8 output")
    }

    fn post_sample(account: &mut PatientAccount) {
        let posts = [
            ("consulta", "Consulta inicial con el doctor", 15000),
            ("medicamento", "Antibióticos", 7550),
            ("laboratorio", "Análisis de sangre", 20000),
            ("rayos_x", "Radiografía de tórax", 12000),
            ("suministros", "Suministros médicos", 4500),
        ];
        for (tag, description, cents) in posts {
            let category: ServiceCategory = tag.parse().expect("known tag");
            account
                .post_service(category, description, Decimal::new(cents, 2))
                .expect("post");
        }
    }

    #[test]
    fn billing_notice_lists_total_and_last_three_services() {
        let cfg = CoreConfig::default();
        let billing = Rc::new(BillingDepartment::new("Main", &cfg, Vec::new()));
        let mut account = PatientAccount::with_config("P001", "Juan Pérez", &cfg).expect("account");
        account.attach(billing.clone());
        post_sample(&mut account);

        let output = text(&billing.output());
        let last_notice = output
            .rsplit("Billing department Main notified:")
            .next()
            .expect("at least one notice");

        assert!(last_notice.contains("Patient: Juan Pérez"));
        assert!(last_notice.contains("Total amount: $590.50"));
        assert!(last_notice.contains("- laboratory: Análisis de sangre ($200.00)"));
        assert!(last_notice.contains("- supplies: Suministros médicos ($45.00)"));
        assert!(!last_notice.contains("Antibióticos"));
        assert_eq!(output.matches("notified:").count(), 5);
    }

    #[test]
    fn inventory_notice_filters_stock_categories() {
        let cfg = CoreConfig::default();
        let inventory = Rc::new(InventoryDepartment::new("Central", Vec::new()));
        let mut account = PatientAccount::with_config("P001", "Juan Pérez", &cfg).expect("account");
        account.attach(inventory.clone());
        post_sample(&mut account);

        let output = text(&inventory.output());
        let last_notice = output
            .rsplit("Inventory department Central notified:")
            .next()
            .expect("at least one notice");

        assert!(last_notice.contains("- supplies: Suministros médicos"));
        assert!(!last_notice.contains("Análisis de sangre"));
        assert!(!last_notice.contains("Antibióticos"));
    }

    #[test]
    fn currency_symbol_comes_from_config() {
        let cfg = CoreConfig::new(3, "€".into()).expect("config");
        let billing = Rc::new(BillingDepartment::new("Main", &cfg, Vec::new()));
        let mut account = PatientAccount::with_config("P001", "Juan Pérez", &cfg).expect("account");
        account.attach(billing.clone());
        account
            .post_service(
                ServiceCategory::Consultation,
                "Consulta",
                Decimal::new(15000, 2),
            )
            .expect("post");

        assert!(text(&billing.output()).contains("Total amount: €150.00"));
    }

    struct Unplugged;

    impl Write for Unplugged {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_a_notification_error() {
        let inventory = Rc::new(InventoryDepartment::new("Central", Unplugged));
        let billing = Rc::new(BillingDepartment::new("Main", &CoreConfig::default(), Vec::new()));

        let mut account = PatientAccount::new("P001", "Juan Pérez").expect("account");
        account.attach(inventory.clone());
        account.attach(billing.clone());

        let err = account
            .post_service(
                ServiceCategory::Medication,
                "Antibióticos",
                Decimal::new(7550, 2),
            )
            .expect_err("unplugged sink");
        match err {
            BillingError::Notification { department, source } => {
                assert_eq!(department, "inventory/Central");
                assert_eq!(source.kind(), std::io::ErrorKind::BrokenPipe);
            }
            other => panic!("expected Notification error, got {other:?}"),
        }
        assert!(billing.output().is_empty());
    }
}
