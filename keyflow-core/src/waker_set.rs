// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A registry of task wakers that can be woken together.
//!
//! Pull-driven multicast operators have several consumers waiting on one
//! upstream, but a stream can only hand a single [`Waker`] to its upstream on
//! each poll. A [`WakerSet`] collects the wakers of every waiting consumer and
//! exposes itself as one fan-out [`Waker`]: waking it wakes them all.
//!
//! ```
//! use futures::task::noop_waker;
//! use keyflow_core::WakerSet;
//! use std::sync::Arc;
//!
//! let set = Arc::new(WakerSet::new());
//! set.register(&noop_waker());
//! assert_eq!(set.len(), 1);
//!
//! set.waker().wake_by_ref();
//! assert!(set.is_empty());
//! ```

use core::mem::take;
use core::task::Waker;
use futures::task::{waker, ArcWake};
use parking_lot::Mutex;
use std::sync::Arc;

/// Wakers of consumers waiting for progress on a shared source.
#[derive(Debug, Default)]
pub struct WakerSet {
    wakers: Mutex<Vec<Waker>>,
}

impl WakerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `waker` unless an equivalent waker is already present.
    pub fn register(&self, waker: &Waker) {
        let mut wakers = self.wakers.lock();
        if !wakers.iter().any(|w| w.will_wake(waker)) {
            wakers.push(waker.clone());
        }
    }

    /// Wakes and removes every registered waker.
    ///
    /// The internal lock is released before any waker runs.
    pub fn wake_all(&self) {
        let wakers = take(&mut *self.wakers.lock());
        for waker in wakers {
            waker.wake();
        }
    }

    /// Number of registered wakers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.wakers.lock().len()
    }

    /// Returns `true` if no waker is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wakers.lock().is_empty()
    }

    /// A [`Waker`] that wakes every waker registered at wake time.
    #[must_use]
    pub fn waker(self: &Arc<Self>) -> Waker {
        waker(Arc::clone(self))
    }
}

impl ArcWake for WakerSet {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.wake_all();
    }
}
