// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Key-boundary windowing for async streams.
//!
//! The central operator is [`window_by`](WindowByExt::window_by): it cuts a stream of
//! [`StreamItem`]s into consecutive windows, starting a new window whenever an item's
//! key differs from the key of the item before it.
//!
//! # Architecture
//!
//! - **Extension traits**: each operator is provided via an extension trait on
//!   `Stream<Item = StreamItem<T>>` for composability
//! - **Pull-driven**: no operator spawns a task; whoever polls drives the source
//! - **Errors in-band**: errors travel as [`StreamItem::Error`] and terminate the stream
//!   that carries them
//!
//! ## Operators
//!
//! - **[`window_by`](WindowByExt::window_by)** / **[`try_window_by`](WindowByExt::try_window_by)**:
//!   key-boundary windows
//! - **[`share`](ShareExt::share)**: lazily connected, reference-counted multicast
//! - **[`distinct_until_changed_by`](DistinctUntilChangedByExt::distinct_until_changed_by)**:
//!   suppress adjacent duplicates under a custom comparison
//! - **[`group_by_until`](GroupByUntilExt::group_by_until)**: keyed groups with a
//!   per-group termination trigger
//! - **[`skip_items`](SkipItemsExt::skip_items)**: drop the first n items
//!
//! # Example
//!
//! ```
//! use futures::{stream, StreamExt};
//! use keyflow_core::StreamItem;
//! use keyflow_stream::WindowByExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let readings = stream::iter(vec![("kitchen", 21), ("kitchen", 22), ("garage", 9), ("kitchen", 23)])
//!     .map(StreamItem::Value);
//!
//! let mut windows = readings.window_by(|reading: &(&'static str, i32)| reading.0);
//!
//! let mut rooms = Vec::new();
//! while let Some(StreamItem::Value(window)) = windows.next().await {
//!     let room = *window.key();
//!     let temps: Vec<i32> = window.map(|item| item.unwrap().1).collect().await;
//!     rooms.push((room, temps));
//! }
//!
//! assert_eq!(
//!     rooms,
//!     vec![("kitchen", vec![21, 22]), ("garage", vec![9]), ("kitchen", vec![23])]
//! );
//! # }
//! ```
//!
//! # Feature flags
//!
//! - `tracing`: emit diagnostics through the `tracing` crate instead of `eprintln!`

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
mod logging;
pub mod distinct_until_changed_by;
pub mod group_by_until;
pub mod prelude;
pub mod share;
pub mod skip_items;
pub mod window_by;

// Re-export commonly used types
pub use distinct_until_changed_by::DistinctUntilChangedByExt;
pub use group_by_until::{GroupByUntilExt, GroupedStream, GroupedStreams};
pub use keyflow_core::{KeyflowError, ShareError, StreamItem};
pub use share::{ShareExt, SharedSource, SharedSubscription};
pub use skip_items::SkipItemsExt;
pub use window_by::{Window, WindowByExt};
