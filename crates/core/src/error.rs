#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("invalid text: {0}")]
    Text(#[from] billing_types::TextError),
    #[error("invalid quantity: {0}")]
    Quantity(#[from] billing_types::QuantityError),
    #[error("invalid price: {0}")]
    Price(#[from] billing_types::PriceError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("service catalog schema mismatch: {0}")]
    CatalogYaml(String),

    #[error("department {department} failed to handle notification: {source}")]
    Notification {
        department: String,
        #[source]
        source: std::io::Error,
    },
}

impl BillingError {
    /// True for every variant raised by invalid construction arguments.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BillingError::Validation(_)
                | BillingError::Text(_)
                | BillingError::Quantity(_)
                | BillingError::Price(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BillingError::NotFound(_))
    }
}

pub type BillingResult<T> = std::result::Result<T, BillingError>;
