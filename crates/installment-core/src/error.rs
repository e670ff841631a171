use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallmentError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl InstallmentError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        InstallmentError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        InstallmentError::Overflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for InstallmentError {
    fn from(e: serde_json::Error) -> Self {
        InstallmentError::SerializationError(e.to_string())
    }
}
