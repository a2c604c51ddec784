// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error type carried through keyflow streams.
//!
//! Errors travel in-band as [`StreamItem::Error`](crate::StreamItem::Error) and
//! terminate the stream that carries them.
//!
//! # Examples
//!
//! ```
//! use keyflow_core::{KeyflowError, Result};
//!
//! fn key_of(line: &str) -> Result<char> {
//!     line.chars()
//!         .next()
//!         .ok_or_else(|| KeyflowError::key_error("empty line has no key"))
//! }
//!
//! assert_eq!(key_of("abc").unwrap(), 'a');
//! assert!(key_of("").is_err());
//! ```

/// Root error type for keyflow operations.
#[derive(Debug, thiserror::Error)]
pub enum KeyflowError {
    /// The upstream source reported a failure.
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong upstream
        context: String,
    },

    /// A key function could not produce a key for an item.
    #[error("Key extraction error: {context}")]
    KeyExtractionError {
        /// Description of the item or the reason the key was unavailable
        context: String,
    },

    /// Error raised by user code and wrapped for propagation.
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl KeyflowError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Create a key extraction error with the given context
    pub fn key_error(context: impl Into<String>) -> Self {
        Self::KeyExtractionError {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Returns `true` if the error was produced by a key function.
    #[must_use]
    pub const fn is_key_error(&self) -> bool {
        matches!(self, Self::KeyExtractionError { .. })
    }
}

/// Specialized Result type for keyflow operations
pub type Result<T> = std::result::Result<T, KeyflowError>;

/// Conversion of arbitrary errors into [`KeyflowError`].
///
/// Implemented for every `std::error::Error + Send + Sync + 'static`, which lets
/// fallible key functions use `map_err(IntoKeyflowError::into_keyflow)`.
pub trait IntoKeyflowError {
    /// Convert this error into a `KeyflowError`
    fn into_keyflow(self) -> KeyflowError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoKeyflowError for E {
    fn into_keyflow(self) -> KeyflowError {
        KeyflowError::user_error(self)
    }
}

impl Clone for KeyflowError {
    fn clone(&self) -> Self {
        match self {
            Self::StreamProcessingError { context } => Self::StreamProcessingError {
                context: context.clone(),
            },
            Self::KeyExtractionError { context } => Self::KeyExtractionError {
                context: context.clone(),
            },
            // The boxed source cannot be cloned; keep its message
            Self::UserError(e) => Self::StreamProcessingError {
                context: format!("User error: {e}"),
            },
        }
    }
}
