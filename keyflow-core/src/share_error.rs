// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt;

/// Lifecycle errors of a shared (multicast) source.
///
/// Kept separate from [`KeyflowError`](crate::KeyflowError): these are returned
/// to the caller of `subscribe`, never emitted into a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// The upstream has terminated or was released; no new subscriptions are accepted.
    Closed,
}

impl fmt::Display for ShareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Shared source is closed"),
        }
    }
}

impl std::error::Error for ShareError {}
