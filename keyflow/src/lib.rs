// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Keyflow
//!
//! Splits an asynchronous stream into consecutive windows of adjacent items that
//! share a key.
//!
//! ## Overview
//!
//! Keyflow works on streams of [`StreamItem<T>`]: each element is either a value or
//! an in-band [`KeyflowError`]. The [`window_by`](WindowByExt::window_by) operator
//! turns such a stream into a stream of [`Window`]s. A new window starts whenever
//! the key of an item differs from the key of the item before it.
//!
//! The building blocks behind the operator are public as well:
//!
//! - [`ShareExt::share`] turns a stream into a lazily connected multicast source.
//! - [`GroupByUntilExt::group_by_until`] groups by key, with a per-group trigger
//!   that closes each group.
//! - [`DistinctUntilChangedByExt`] and [`SkipItemsExt`] are the small filters used
//!   to derive window boundaries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keyflow::prelude::*;
//! use futures::StreamExt;
//! use tokio::sync::mpsc;
//! use tokio_stream::wrappers::UnboundedReceiverStream;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (tx, rx) = mpsc::unbounded_channel::<(u32, &'static str)>();
//!     let events = UnboundedReceiverStream::new(rx).map(StreamItem::Value);
//!
//!     // One window per run of events from the same session
//!     let mut sessions = events.window_by(|event: &(u32, &'static str)| event.0);
//!
//!     tx.send((1, "login")).unwrap();
//!     tx.send((1, "view")).unwrap();
//!     tx.send((2, "login")).unwrap();
//!     drop(tx);
//!
//!     while let Some(StreamItem::Value(mut session)) = sessions.next().await {
//!         let id = *session.key();
//!         while let Some(StreamItem::Value(event)) = session.next().await {
//!             println!("session {id}: {}", event.1);
//!         }
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - `tracing`: routes the operators' diagnostics through the `tracing` crate.

// Re-export core types
pub use keyflow_core::{IntoKeyflowError, KeyflowError, Result, ShareError, StreamItem};

// Re-export the operators
pub use keyflow_stream::{
    DistinctUntilChangedByExt, GroupByUntilExt, GroupedStream, GroupedStreams, ShareExt,
    SharedSource, SharedSubscription, SkipItemsExt, Window, WindowByExt,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use keyflow_core::IntoKeyflowError;
    pub use keyflow_stream::prelude::*;
}
