mod cadence;

pub use cadence::{ApiErrorBody, ApiErrorObject, CadenceError};

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
