// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Observing how often a stream is subscribed to and released.
//!
//! Streams are lazy, so a [`ProbedStream`] counts a *subscription* the first time
//! it is polled and an *unsubscription* when it is dropped after having been
//! polled. A probe handle can be cloned into the code under test and queried
//! afterwards.
//!
//! ```
//! use futures::{stream, FutureExt, StreamExt};
//! use keyflow_test_utils::SubscriptionProbe;
//!
//! let probe = SubscriptionProbe::new();
//! let mut source = probe.wrap(stream::iter(vec![1, 2]));
//! assert_eq!(probe.subscriptions(), 0);
//!
//! assert_eq!(source.next().now_or_never(), Some(Some(1)));
//! assert_eq!(probe.subscriptions(), 1);
//!
//! drop(source);
//! assert_eq!(probe.unsubscriptions(), 1);
//! ```

use core::pin::Pin;
use core::task::{Context, Poll};
use futures::Stream;
use pin_project::{pin_project, pinned_drop};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    subscriptions: AtomicUsize,
    unsubscriptions: AtomicUsize,
    items: AtomicUsize,
}

/// Shared counters for every stream wrapped by this probe.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionProbe {
    counters: Arc<Counters>,
}

impl SubscriptionProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `stream` so that its lifecycle is recorded by this probe.
    pub fn wrap<S: Stream>(&self, stream: S) -> ProbedStream<S> {
        ProbedStream {
            inner: stream,
            probe: self.clone(),
            subscribed: false,
        }
    }

    /// Number of wrapped streams that have been polled at least once.
    #[must_use]
    pub fn subscriptions(&self) -> usize {
        self.counters.subscriptions.load(Ordering::SeqCst)
    }

    /// Number of subscribed streams that have since been dropped.
    #[must_use]
    pub fn unsubscriptions(&self) -> usize {
        self.counters.unsubscriptions.load(Ordering::SeqCst)
    }

    /// Number of items yielded by wrapped streams.
    #[must_use]
    pub fn items(&self) -> usize {
        self.counters.items.load(Ordering::SeqCst)
    }

    /// Returns `true` while some subscribed stream is still alive.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscriptions() > self.unsubscriptions()
    }
}

/// A stream whose subscription and release are recorded by a [`SubscriptionProbe`].
#[pin_project(PinnedDrop)]
pub struct ProbedStream<S> {
    #[pin]
    inner: S,
    probe: SubscriptionProbe,
    subscribed: bool,
}

impl<S: Stream> Stream for ProbedStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if !*this.subscribed {
            *this.subscribed = true;
            this.probe
                .counters
                .subscriptions
                .fetch_add(1, Ordering::SeqCst);
        }

        let polled = this.inner.poll_next(cx);
        if let Poll::Ready(Some(_)) = &polled {
            this.probe.counters.items.fetch_add(1, Ordering::SeqCst);
        }
        polled
    }
}

#[pinned_drop]
impl<S> PinnedDrop for ProbedStream<S> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        if *this.subscribed {
            this.probe
                .counters
                .unsubscriptions
                .fetch_add(1, Ordering::SeqCst);
        }
    }
}
