// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lazily connected, reference-counted multicast for keyflow streams.
//!
//! A [`SharedSource`] lets several consumers read one upstream stream while the
//! upstream is subscribed to at most once.
//!
//! ## Characteristics
//!
//! - **Lazy**: the upstream is not polled until the first driving subscription is polled.
//! - **Hot**: a subscriber sees only items pulled after it subscribed.
//! - **Pull-driven**: no task is spawned. A driving subscription with an empty queue
//!   polls the upstream itself and fans the item out to every subscriber queue.
//! - **Passive subscriptions** ([`subscribe_passive`](SharedSource::subscribe_passive))
//!   never poll the upstream; they only observe items other subscribers pulled.
//! - **Reference-counted**: the upstream is dropped when it terminates, or when the last
//!   subscription is dropped after the upstream was started.
//! - **Error/close**: an error is delivered to every subscriber and ends the share.
//! - **Unbounded queues**: a subscriber that is not polled buffers what others pull.
//!
//! ## Example
//!
//! ```rust
//! use futures::{stream, FutureExt, StreamExt};
//! use keyflow_core::StreamItem;
//! use keyflow_stream::ShareExt;
//!
//! let shared = stream::iter(vec![StreamItem::Value(1), StreamItem::Value(2)]).share();
//! let mut driver = shared.subscribe().unwrap();
//! let mut observer = shared.subscribe_passive().unwrap();
//!
//! // The observer has nothing until the driver pulls
//! assert!(observer.next().now_or_never().is_none());
//!
//! assert_eq!(driver.next().now_or_never(), Some(Some(StreamItem::Value(1))));
//! assert_eq!(observer.next().now_or_never(), Some(Some(StreamItem::Value(1))));
//! ```

use crate::logging::debug;
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use keyflow_core::{ShareError, StreamItem, WakerSet};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

enum Upstream<T> {
    Idle(BoxStream<'static, StreamItem<T>>),
    Running(BoxStream<'static, StreamItem<T>>),
    Terminated,
}

struct ShareState<T> {
    upstream: Upstream<T>,
    queues: HashMap<u64, VecDeque<StreamItem<T>>>,
    next_id: u64,
    wakers: Arc<WakerSet>,
}

impl<T: Clone> ShareState<T> {
    fn broadcast(&mut self, item: &StreamItem<T>) {
        for queue in self.queues.values_mut() {
            queue.push_back(item.clone());
        }
    }

    /// Moves the upstream out so the caller can drop it after unlocking.
    fn retire(&mut self) -> Option<BoxStream<'static, StreamItem<T>>> {
        match core::mem::replace(&mut self.upstream, Upstream::Terminated) {
            Upstream::Running(stream) => {
                debug!("share: upstream released");
                Some(stream)
            }
            Upstream::Idle(stream) => Some(stream),
            Upstream::Terminated => None,
        }
    }

    fn poll_subscriber(
        &mut self,
        id: u64,
        passive: bool,
        cx: &mut Context<'_>,
    ) -> (
        Poll<Option<StreamItem<T>>>,
        Option<BoxStream<'static, StreamItem<T>>>,
    ) {
        loop {
            if let Some(item) = self.queues.get_mut(&id).and_then(VecDeque::pop_front) {
                return (Poll::Ready(Some(item)), None);
            }

            if passive {
                if matches!(self.upstream, Upstream::Terminated) {
                    return (Poll::Ready(None), None);
                }
                self.wakers.register(cx.waker());
                return (Poll::Pending, None);
            }

            if let Upstream::Idle(_) = self.upstream {
                if let Upstream::Idle(stream) =
                    core::mem::replace(&mut self.upstream, Upstream::Terminated)
                {
                    debug!("share: subscribing upstream");
                    self.upstream = Upstream::Running(stream);
                }
            }

            let Upstream::Running(stream) = &mut self.upstream else {
                return (Poll::Ready(None), None);
            };

            self.wakers.register(cx.waker());
            let fan_out = self.wakers.waker();
            let polled = stream
                .as_mut()
                .poll_next(&mut Context::from_waker(&fan_out));

            match polled {
                Poll::Pending => return (Poll::Pending, None),
                Poll::Ready(Some(item)) => {
                    let terminal = item.is_error();
                    self.broadcast(&item);
                    let retired = if terminal { self.retire() } else { None };
                    self.wakers.wake_all();
                    if retired.is_some() {
                        return (
                            Poll::Ready(self.queues.get_mut(&id).and_then(VecDeque::pop_front)),
                            retired,
                        );
                    }
                }
                Poll::Ready(None) => {
                    let retired = self.retire();
                    self.wakers.wake_all();
                    return (Poll::Ready(None), retired);
                }
            }
        }
    }
}

/// A multicast handle over one upstream stream.
///
/// Cloning the handle is cheap; all clones share the same upstream and subscriber set.
/// See the [module-level documentation](crate::share) for the subscription model.
pub struct SharedSource<T> {
    state: Arc<Mutex<ShareState<T>>>,
}

impl<T> Clone for SharedSource<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Clone + Send + 'static> SharedSource<T> {
    /// Wraps `source` without polling it.
    ///
    /// Prefer [`ShareExt::share`].
    pub fn new<S>(source: S) -> Self
    where
        S: Stream<Item = StreamItem<T>> + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(ShareState {
                upstream: Upstream::Idle(source.boxed()),
                queues: HashMap::new(),
                next_id: 0,
                wakers: Arc::new(WakerSet::new()),
            })),
        }
    }

    /// Subscribes with permission to pull the upstream when this subscription's queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Closed`] once the upstream has terminated or been released.
    pub fn subscribe(&self) -> Result<SharedSubscription<T>, ShareError> {
        self.attach(false)
    }

    /// Subscribes without ever pulling the upstream.
    ///
    /// The subscription yields items pulled by driving subscriptions and returns
    /// `Pending` while its queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Closed`] once the upstream has terminated or been released.
    pub fn subscribe_passive(&self) -> Result<SharedSubscription<T>, ShareError> {
        self.attach(true)
    }

    fn attach(&self, passive: bool) -> Result<SharedSubscription<T>, ShareError> {
        let mut state = self.state.lock();
        if matches!(state.upstream, Upstream::Terminated) {
            return Err(ShareError::Closed);
        }

        let id = state.next_id;
        state.next_id += 1;
        state.queues.insert(id, VecDeque::new());

        Ok(SharedSubscription {
            id,
            passive,
            state: Arc::clone(&self.state),
        })
    }

    /// Returns `true` once the upstream has terminated or been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.state.lock().upstream, Upstream::Terminated)
    }

    /// Number of live subscriptions, driving and passive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().queues.len()
    }
}

/// One consumer's view of a [`SharedSource`].
pub struct SharedSubscription<T> {
    id: u64,
    passive: bool,
    state: Arc<Mutex<ShareState<T>>>,
}

impl<T> SharedSubscription<T> {
    /// Returns `true` if this subscription never pulls the upstream.
    #[must_use]
    pub const fn is_passive(&self) -> bool {
        self.passive
    }
}

impl<T: Clone> Stream for SharedSubscription<T> {
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let (polled, retired) = this.state.lock().poll_subscriber(this.id, this.passive, cx);
        drop(retired);
        polled
    }
}

impl<T> Drop for SharedSubscription<T> {
    fn drop(&mut self) {
        let retired = {
            let mut state = self.state.lock();
            state.queues.remove(&self.id);
            if state.queues.is_empty() && matches!(state.upstream, Upstream::Running(_)) {
                debug!("share: last subscriber left");
                match core::mem::replace(&mut state.upstream, Upstream::Terminated) {
                    Upstream::Running(stream) => Some(stream),
                    _ => None,
                }
            } else {
                None
            }
        };
        drop(retired);
    }
}

/// Extension trait for sharing a stream among multiple subscribers.
pub trait ShareExt<T: Clone + Send + 'static>: Stream<Item = StreamItem<T>> {
    /// Converts this stream into a lazily connected, reference-counted [`SharedSource`].
    ///
    /// See the [module-level documentation](crate::share) for usage examples.
    fn share(self) -> SharedSource<T>
    where
        Self: Sized + Send + 'static;
}

impl<S, T> ShareExt<T> for S
where
    S: Stream<Item = StreamItem<T>>,
    T: Clone + Send + 'static,
{
    fn share(self) -> SharedSource<T>
    where
        Self: Sized + Send + 'static,
    {
        SharedSource::new(self)
    }
}
