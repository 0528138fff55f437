use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanSathiError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Balance will not be paid off: {context} at period {period} (payment {payment} <= interest {interest})")]
    NonConvergent {
        context: String,
        period: u32,
        payment: Decimal,
        interest: Decimal,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanSathiError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanSathiError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanSathiError {
    fn from(e: serde_json::Error) -> Self {
        LoanSathiError::SerializationError(e.to_string())
    }
}
