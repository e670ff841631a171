pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "financing")]
pub mod financing;

pub use error::InstallmentError;
pub use types::*;

/// Standard result type for all installment-core operations
pub type InstallmentResult<T> = Result<T, InstallmentError>;
