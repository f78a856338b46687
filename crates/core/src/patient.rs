//! Patient records and the billing documents they own.

use crate::document::BillingDocument;
use crate::status::PatientStatus;
use crate::BillingResult;
use billing_types::NonEmptyText;
use rust_decimal::Decimal;

/// A patient with the billing documents issued to them.
///
/// Documents are owned exclusively by the record and live exactly as long as it does.
#[derive(Debug)]
pub struct PatientRecord {
    id: u32,
    name: NonEmptyText,
    history: String,
    documents: Vec<BillingDocument>,
    status: Option<PatientStatus>,
}

impl PatientRecord {
    /// Creates a record with no documents and no status attached.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `name` is blank.
    pub fn new(id: u32, name: &str, history: &str) -> BillingResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyText::new(name)?,
            history: history.to_string(),
            documents: Vec::new(),
            status: None,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Free-text medical history reference.
    pub fn history(&self) -> &str {
        &self.history
    }

    pub fn status(&self) -> Option<PatientStatus> {
        self.status
    }

    /// Attaches the status walk at `Registered`. A record that already has a status keeps it.
    pub fn admit(&mut self) -> PatientStatus {
        *self.status.get_or_insert(PatientStatus::Registered)
    }

    pub(crate) fn set_status(&mut self, status: PatientStatus) {
        self.status = Some(status);
    }

    pub fn add_document(&mut self, document: BillingDocument) {
        tracing::debug!(
            patient_id = self.id,
            document = document.number(),
            kind = document.kind().label(),
            "document added to patient record"
        );
        self.documents.push(document);
    }

    pub fn documents(&self) -> &[BillingDocument] {
        &self.documents
    }

    /// First document with the given number.
    pub fn document_mut(&mut self, number: u32) -> Option<&mut BillingDocument> {
        self.documents.iter_mut().find(|d| d.number() == number)
    }

    /// Sum of the totals of every document, recomputing each one.
    pub fn total_billed(&mut self) -> Decimal {
        self.documents.iter_mut().map(BillingDocument::total).sum()
    }
}
