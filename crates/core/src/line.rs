//! Billing lines: the leaves of a billing document.

use crate::catalog::ServiceEntry;
use crate::{Billable, BillingResult};
use billing_types::{Quantity, UnitPrice};
use rust_decimal::Decimal;
use std::rc::{Rc, Weak};

/// A quantity of one catalog service at a snapshotted unit price.
///
/// The unit price is copied from the catalog when the line is created; later reads never go back
/// to the catalog for pricing. The catalog entry itself is only held weakly, for display.
#[derive(Debug)]
pub struct BillingLine {
    quantity: Quantity,
    unit_price: UnitPrice,
    service: Weak<ServiceEntry>,
}

impl BillingLine {
    /// # Errors
    ///
    /// Returns a validation error if `quantity` is zero or `unit_price` is negative or above
    /// [`UnitPrice::MAX`].
    pub fn new(
        quantity: u32,
        unit_price: Decimal,
        service: &Rc<ServiceEntry>,
    ) -> BillingResult<Self> {
        Ok(Self {
            quantity: Quantity::new(quantity)?,
            unit_price: UnitPrice::new(unit_price)?,
            service: Rc::downgrade(service),
        })
    }

    /// Builds a line priced at the entry's current catalog price.
    pub fn from_service(service: &Rc<ServiceEntry>, quantity: Quantity) -> Self {
        Self {
            quantity,
            unit_price: service.unit_price(),
            service: Rc::downgrade(service),
        }
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn unit_price(&self) -> UnitPrice {
        self.unit_price
    }

    /// The catalog entry this line was posted from, if it is still alive.
    pub fn service(&self) -> Option<Rc<ServiceEntry>> {
        self.service.upgrade()
    }

    /// # Errors
    ///
    /// Returns a validation error for zero.
    pub fn set_quantity(&mut self, quantity: u32) -> BillingResult<()> {
        self.quantity = Quantity::new(quantity)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a validation error for a negative price or one above [`UnitPrice::MAX`].
    pub fn set_unit_price(&mut self, unit_price: Decimal) -> BillingResult<()> {
        self.unit_price = UnitPrice::new(unit_price)?;
        Ok(())
    }

    pub fn subtotal(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }

    /// Copy of this line that shares no mutable state with it.
    pub fn duplicate(&self) -> Self {
        Self {
            quantity: self.quantity,
            unit_price: self.unit_price,
            service: Weak::clone(&self.service),
        }
    }
}

impl PartialEq for BillingLine {
    fn eq(&self, other: &Self) -> bool {
        self.quantity == other.quantity
            && self.unit_price == other.unit_price
            && Weak::ptr_eq(&self.service, &other.service)
    }
}

impl Eq for BillingLine {}

impl Billable for BillingLine {
    fn amount(&self) -> Decimal {
        self.subtotal()
    }

    fn duplicate(&self) -> Self {
        BillingLine::duplicate(self)
    }
}
