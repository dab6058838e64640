//! Errors raised by the network model.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EchelonError {
    /// Stage data that cannot be planned (negative lead time, cycles found
    /// during validation)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Structural problems: unknown stages, self loops, cycles
    #[error("Network error: {0}")]
    Network(String),
}

pub type EchelonResult<T> = Result<T, EchelonError>;
