//! Result type alias for equivalency operations

use crate::error::LikenessError;

/// Standard Result type for equivalency operations
pub type Result<T> = std::result::Result<T, LikenessError>;
