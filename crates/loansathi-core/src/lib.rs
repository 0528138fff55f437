pub mod error;
pub mod format;
pub mod time_value;
pub mod types;
pub mod validation;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "cards")]
pub mod cards;

#[cfg(feature = "investments")]
pub mod investments;

#[cfg(feature = "insurance")]
pub mod insurance;

pub use error::LoanSathiError;
pub use types::*;

/// Standard result type for all loansathi operations
pub type LoanSathiResult<T> = Result<T, LoanSathiError>;
