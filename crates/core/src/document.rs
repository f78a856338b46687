//! Billing documents: invoices and discharge notes as trees of billable components.
//!
//! A document owns its children outright, so a document can never end up inside its own
//! subtree. Totals are computed by walking the tree depth-first in insertion order; the result is
//! cached on every document visited until the next structural change.

use crate::catalog::ServiceEntry;
use crate::line::BillingLine;
use crate::{BillingError, BillingResult};
use billing_types::Quantity;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::rc::Rc;

/// Behaviour shared by every node of a billing tree.
pub trait Billable {
    /// Subtotal of a line or total of a document. Never touches cached totals.
    fn amount(&self) -> Decimal;

    /// Deep copy of this node and everything below it.
    fn duplicate(&self) -> Self
    where
        Self: Sized;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Invoice,
    DischargeNote,
}

impl DocumentKind {
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::DischargeNote => "discharge note",
        }
    }
}

/// A child of a billing document.
#[derive(Debug, PartialEq, Eq)]
pub enum Component {
    Line(BillingLine),
    Document(BillingDocument),
}

impl Component {
    pub fn as_line(&self) -> Option<&BillingLine> {
        match self {
            Component::Line(line) => Some(line),
            Component::Document(_) => None,
        }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut BillingLine> {
        match self {
            Component::Line(line) => Some(line),
            Component::Document(_) => None,
        }
    }

    pub fn as_document(&self) -> Option<&BillingDocument> {
        match self {
            Component::Document(doc) => Some(doc),
            Component::Line(_) => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut BillingDocument> {
        match self {
            Component::Document(doc) => Some(doc),
            Component::Line(_) => None,
        }
    }
}

impl From<BillingLine> for Component {
    fn from(line: BillingLine) -> Self {
        Component::Line(line)
    }
}

impl From<BillingDocument> for Component {
    fn from(doc: BillingDocument) -> Self {
        Component::Document(doc)
    }
}

impl Billable for Component {
    fn amount(&self) -> Decimal {
        match self {
            Component::Line(line) => line.subtotal(),
            Component::Document(doc) => doc.amount(),
        }
    }

    fn duplicate(&self) -> Self {
        match self {
            Component::Line(line) => Component::Line(line.duplicate()),
            Component::Document(doc) => Component::Document(doc.duplicate()),
        }
    }
}

/// An invoice or discharge note.
#[derive(Debug)]
pub struct BillingDocument {
    number: u32,
    kind: DocumentKind,
    issue_date: NaiveDate,
    cached_total: Option<Decimal>,
    children: Vec<Component>,
}

impl BillingDocument {
    pub fn new(kind: DocumentKind, number: u32, issue_date: NaiveDate) -> Self {
        Self {
            number,
            kind,
            issue_date,
            cached_total: None,
            children: Vec::new(),
        }
    }

    pub fn invoice(number: u32, issue_date: NaiveDate) -> Self {
        Self::new(DocumentKind::Invoice, number, issue_date)
    }

    pub fn discharge_note(number: u32, issue_date: NaiveDate) -> Self {
        Self::new(DocumentKind::DischargeNote, number, issue_date)
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn children(&self) -> &[Component] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Mutable access to a direct child. Clears the cached total.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Component> {
        self.cached_total = None;
        self.children.get_mut(index)
    }

    /// Appends a line or nested document.
    ///
    /// The same line may be added more than once; keeping children distinct is up to the caller.
    pub fn add(&mut self, component: impl Into<Component>) {
        self.children.push(component.into());
        self.cached_total = None;
    }

    /// Removes and returns the first child structurally equal to `component`.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NotFound` if no child matches. The document is left unchanged.
    pub fn remove(&mut self, component: &Component) -> BillingResult<Component> {
        let index = self
            .children
            .iter()
            .position(|child| child == component)
            .ok_or_else(|| {
                BillingError::NotFound(format!(
                    "component is not part of {} {}",
                    self.kind.label(),
                    self.number
                ))
            })?;

        self.cached_total = None;
        tracing::debug!(document = self.number, index, "removed component");
        Ok(self.children.remove(index))
    }

    /// Posts a catalog service as a single-quantity line.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` unless this document is a discharge note.
    pub fn add_service(&mut self, service: &Rc<ServiceEntry>) -> BillingResult<()> {
        if self.kind != DocumentKind::DischargeNote {
            return Err(BillingError::Validation(format!(
                "services can only be posted directly to a discharge note, not {} {}",
                self.kind.label(),
                self.number
            )));
        }

        tracing::info!(
            document = self.number,
            service_id = service.id(),
            "posting {} (${})",
            service.description(),
            service.unit_price()
        );
        self.add(BillingLine::from_service(service, Quantity::ONE));
        Ok(())
    }

    /// Recomputes the total of this subtree and caches it on every document visited.
    ///
    /// Each line subtotal is at most `UnitPrice::MAX * u32::MAX` (about 4.3e18), so no tree
    /// that fits in memory can push the sum past `Decimal::MAX`.
    pub fn total(&mut self) -> Decimal {
        let mut sum = Decimal::ZERO;
        for child in &mut self.children {
            sum += match child {
                Component::Line(line) => line.subtotal(),
                Component::Document(doc) => doc.total(),
            };
        }
        self.cached_total = Some(sum);
        sum
    }

    /// The value computed by the last call to [`BillingDocument::total`], or `None` if the
    /// document changed since.
    pub fn cached_total(&self) -> Option<Decimal> {
        self.cached_total
    }

    /// Every line in the subtree, depth-first in insertion order.
    pub fn lines(&self) -> Vec<&BillingLine> {
        let mut out = Vec::new();
        collect_lines(self, &mut out);
        out
    }

    /// Deep copy of this document. The copy starts with no cached total.
    pub fn duplicate(&self) -> Self {
        Self {
            number: self.number,
            kind: self.kind,
            issue_date: self.issue_date,
            cached_total: None,
            children: self.children.iter().map(Billable::duplicate).collect(),
        }
    }
}

fn collect_lines<'a>(doc: &'a BillingDocument, out: &mut Vec<&'a BillingLine>) {
    for child in &doc.children {
        match child {
            Component::Line(line) => out.push(line),
            Component::Document(nested) => collect_lines(nested, out),
        }
    }
}

impl PartialEq for BillingDocument {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
            && self.kind == other.kind
            && self.issue_date == other.issue_date
            && self.children == other.children
    }
}

impl Eq for BillingDocument {}

impl Billable for BillingDocument {
    fn amount(&self) -> Decimal {
        self.children.iter().map(Billable::amount).sum()
    }

    fn duplicate(&self) -> Self {
        BillingDocument::duplicate(self)
    }
}
