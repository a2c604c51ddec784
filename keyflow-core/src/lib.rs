// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core types shared by the keyflow crates.
//!
//! - [`StreamItem`]: a value or an error flowing through a stream
//! - [`KeyflowError`]: the error carried by [`StreamItem::Error`]
//! - [`ShareError`]: lifecycle errors of multicast sources
//! - [`WakerSet`]: a registry of wakers that can be woken as one

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod keyflow_error;
pub mod share_error;
pub mod stream_item;
pub mod waker_set;

pub use self::keyflow_error::{IntoKeyflowError, KeyflowError, Result};
pub use self::share_error::ShareError;
pub use self::stream_item::StreamItem;
pub use self::waker_set::WakerSet;
