//! Result type alias for OfficeOps operations

use crate::error::OoError;

/// Standard Result type for OfficeOps operations
pub type OoResult<T> = Result<T, OoError>;
