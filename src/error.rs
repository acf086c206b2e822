//! Diagnostic error types for the text-parsing boundary.
//!
//! The core arithmetic and mutation API keeps the boolean-flag contract
//! described by SPEC_FULL §7 everywhere it is load-bearing (`reserve`,
//! `new_element`, `set_term_vector`, ...). These two enums exist only for
//! callers who opt into richer diagnostics at the textual-form boundary
//! (SPEC_FULL §4.11); they do not change any boolean-returning signature.

use thiserror::Error;

/// Failure detail for [`crate::scalar::parse_err`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScalarParseError {
    #[error("no input to parse")]
    EmptyInput,
    #[error("no valid scalar at byte offset {at}")]
    NoProgress { at: usize },
    #[error("value out of range for the target type")]
    OutOfRange,
}

/// Failure detail for parsing the textual vector form (SPEC_FULL §6).
#[derive(Debug, Error)]
pub enum VectorTextError {
    #[error("textual vector form must start with '#<'")]
    MissingOpenDelimiter,
    #[error("textual vector form must end with '>'")]
    MissingCloseDelimiter,
    #[error("unrecognized vector type tag {0:?}")]
    UnknownType(String),
    #[error("malformed index:value pair {0:?}")]
    MalformedPair(String),
    #[error("malformed scalar field {field:?} in {context:?}")]
    MalformedScalar { field: String, context: String },
}

pub type ScalarResult<T> = Result<T, ScalarParseError>;
pub type VectorTextResult<T> = Result<T, VectorTextError>;
