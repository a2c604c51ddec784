// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the keyflow crates.
//!
//! This crate provides helper types, test data structures, and utilities for testing
//! stream operators. It is designed for use in development and testing only.
//!
//! # Key Types
//!
//! ## `Sequenced<T>`
//!
//! A wrapper that stamps test values with a global sequence number, so items with
//! equal payloads remain distinguishable:
//!
//! ```rust
//! use keyflow_test_utils::Sequenced;
//!
//! let first = Sequenced::new("a");
//! let second = Sequenced::new("a");
//! assert!(first.sequence() < second.sequence());
//! assert_ne!(first, second);
//! ```
//!
//! ## TestData fixtures
//!
//! ```rust
//! use keyflow_test_utils::test_data::{animal_dog, person_alice, DataVariant};
//!
//! assert_eq!(person_alice().variant(), DataVariant::Person);
//! assert_eq!(animal_dog().variant(), DataVariant::Animal);
//! ```
//!
//! ## `SubscriptionProbe`
//!
//! Counts how often a source stream is subscribed to (first poll) and released (drop).
//!
//! # Module Organization
//!
//! - `sequenced` - `Sequenced<T>` wrapper
//! - `test_data`, `person`, `animal` - fixture types
//! - `helpers` - assertion and utility functions
//! - `subscription_probe` - lifecycle counting wrapper

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod animal;
pub mod helpers;
pub mod person;
pub mod sequenced;
pub mod subscription_probe;
pub mod test_data;

use futures::{Stream, StreamExt};
use keyflow_core::StreamItem;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

// Re-export commonly used test utilities
pub use helpers::{
    assert_no_element_emitted, assert_stream_ended, collect_values, unwrap_stream, unwrap_value,
};
pub use sequenced::Sequenced;
pub use subscription_probe::{ProbedStream, SubscriptionProbe};
pub use test_data::{DataVariant, TestData};

/// Creates a test channel that automatically wraps values in `StreamItem::Value`.
///
/// # Example
///
/// ```rust
/// use keyflow_test_utils::{test_channel, Sequenced};
/// use keyflow_test_utils::test_data::person_alice;
/// use futures::StreamExt;
///
/// # async fn example() {
/// let (tx, mut stream) = test_channel();
///
/// tx.send(Sequenced::new(person_alice())).unwrap();
///
/// let item = stream.next().await.unwrap().unwrap(); // Option -> StreamItem -> Value
/// # }
/// ```
pub fn test_channel<T: Send + 'static>() -> (
    mpsc::UnboundedSender<T>,
    impl Stream<Item = StreamItem<T>> + Send + Unpin,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx).map(StreamItem::Value);
    (tx, stream)
}

/// Creates a test channel that accepts `StreamItem<T>` for testing error propagation.
///
/// # Example
///
/// ```rust
/// use keyflow_test_utils::test_channel_with_errors;
/// use keyflow_core::{KeyflowError, StreamItem};
/// use futures::StreamExt;
///
/// # async fn example() {
/// let (tx, mut stream) = test_channel_with_errors();
///
/// tx.send(StreamItem::Value(42)).unwrap();
/// tx.send(StreamItem::Error(KeyflowError::stream_error("test error"))).unwrap();
///
/// let value = stream.next().await.unwrap();
/// let error = stream.next().await.unwrap();
/// # }
/// ```
pub fn test_channel_with_errors<T: Send + 'static>() -> (
    mpsc::UnboundedSender<StreamItem<T>>,
    impl Stream<Item = StreamItem<T>> + Send + Unpin,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx);
    (tx, stream)
}
