//! Notification hub: synchronous fan-out of account events to department listeners.
//!
//! Listeners are called one after another, in attachment order, on the caller's stack. The first
//! listener that fails stops the loop and its error is returned to the caller; listeners after it
//! do not hear about that event.

use crate::account::ServiceEvent;
use crate::{BillingError, BillingResult};
use rust_decimal::Decimal;
use std::rc::Rc;

/// Read-only view of a patient account handed to listeners.
#[derive(Debug, Clone, Copy)]
pub struct AccountSnapshot<'a> {
    pub patient_id: &'a str,
    pub patient_name: &'a str,
    pub total: Decimal,
    /// Most recent events, oldest first.
    pub recent: &'a [ServiceEvent],
}

/// A department that wants to hear about every service posted to an account.
pub trait DepartmentListener {
    /// Name used in logs and error messages.
    fn department(&self) -> &str;

    /// Called once per posted service.
    ///
    /// # Errors
    ///
    /// Any error aborts the remaining notifications for this event.
    fn update(&self, snapshot: &AccountSnapshot<'_>) -> BillingResult<()>;
}

/// Ordered, identity-unique set of listeners.
#[derive(Default)]
pub struct NotificationHub {
    listeners: Vec<Rc<dyn DepartmentListener>>,
}

fn same_listener<L: DepartmentListener + ?Sized>(
    a: &Rc<dyn DepartmentListener>,
    b: &Rc<L>,
) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a listener. Returns `false` if that same listener is already attached.
    pub fn attach(&mut self, listener: Rc<dyn DepartmentListener>) -> bool {
        if self.listeners.iter().any(|l| same_listener(l, &listener)) {
            tracing::debug!(
                department = listener.department(),
                "listener already attached"
            );
            return false;
        }

        tracing::debug!(department = listener.department(), "listener attached");
        self.listeners.push(listener);
        true
    }

    /// Detaches a previously attached listener.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NotFound` if the listener was never attached.
    pub fn detach<L: DepartmentListener + ?Sized>(
        &mut self,
        listener: &Rc<L>,
    ) -> BillingResult<()> {
        let index = self
            .listeners
            .iter()
            .position(|l| same_listener(l, listener))
            .ok_or_else(|| {
                BillingError::NotFound(format!(
                    "department {} is not attached",
                    listener.department()
                ))
            })?;

        self.listeners.remove(index);
        tracing::debug!(department = listener.department(), "listener detached");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers `snapshot` to every listener in attachment order.
    ///
    /// # Errors
    ///
    /// Returns the first listener error unchanged.
    pub fn notify(&self, snapshot: &AccountSnapshot<'_>) -> BillingResult<()> {
        for listener in &self.listeners {
            tracing::debug!(
                department = listener.department(),
                patient_id = snapshot.patient_id,
                "notifying"
            );
            listener.update(snapshot)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.listeners.iter().map(|l| l.department()))
            .finish()
    }
}
