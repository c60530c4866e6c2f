//! Error types for the tagged cache
//!
//! Provides unified error handling using thiserror.
//!
//! Each variant corresponds to one error kind of the cache contract and
//! carries the structured context needed to render its message, so callers
//! can match on the kind instead of parsing strings.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The tags argument to `set` was not an array
    #[error("The tags argument has to be an array.")]
    TagsType,

    /// The ttl argument was not an integer number
    #[error("The ttl argument has to be of type `number`. Found: `{found}`")]
    TtlType {
        /// Type name of the offending ttl value
        found: String,
    },

    /// The ttl argument was negative
    #[error("The ttl argument cannot be negative.")]
    TtlNegative,

    /// A tag lookup with error-on-miss requested found no matches
    #[error("Tags not found.")]
    TagsNotFound,

    /// A key lookup with error-on-miss requested found no live entry
    #[error("Key `{key}` not found")]
    NotFound {
        /// The key that was looked up
        key: String,
    },

    /// The configured key-count limit has been reached
    #[error("Cache max keys amount of `{limit}` exceeded")]
    CacheFull {
        /// The configured limit
        limit: usize,
    },
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
