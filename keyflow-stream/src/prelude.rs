// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude module re-exporting all commonly used traits and types.
//!
//! ```
//! use keyflow_stream::prelude::*;
//! ```
//!
//! # Contents
//!
//! - [`WindowByExt`] - Split a stream into key-boundary windows
//! - [`ShareExt`] - Convert a stream into a multi-subscriber source
//! - [`DistinctUntilChangedByExt`] - Suppress adjacent duplicates by custom comparison
//! - [`GroupByUntilExt`] - Group by key with per-group termination
//! - [`SkipItemsExt`] - Skip first n items
//! - [`StreamItem`], [`KeyflowError`] - Stream item and error types

pub use crate::distinct_until_changed_by::DistinctUntilChangedByExt;
pub use crate::group_by_until::{GroupByUntilExt, GroupedStream, GroupedStreams};
pub use crate::share::{ShareExt, SharedSource, SharedSubscription};
pub use crate::skip_items::SkipItemsExt;
pub use crate::window_by::{Window, WindowByExt};
pub use keyflow_core::{KeyflowError, StreamItem};
