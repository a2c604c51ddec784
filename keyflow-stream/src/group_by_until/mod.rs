// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Group-by operator whose groups close on a per-group termination trigger.
//!
//! [`group_by_until`](GroupByUntilExt::group_by_until) routes every value to the
//! group of its key and emits each group as a [`GroupedStream`] the moment it is
//! created. Each group owns a *termination trigger*, built by a factory when the
//! group opens; the first item the trigger emits closes the group. A later value
//! with the same key opens a fresh group.
//!
//! ## Per-item order of operations
//!
//! For every source value `x` with key `k`:
//!
//! 1. If no group with key `k` is open, one is created and its trigger obtained.
//! 2. Every open trigger is polled once. A trigger that emits closes its group;
//!    a trigger that ends without emitting leaves its group open.
//! 3. `x` is delivered to the open group for `k`, opening a fresh one if the
//!    previous group for `k` was just closed.
//!
//! Because triggers are polled before the item is delivered, a trigger that fires
//! in response to `x` closes its group before `x` could reach it.
//!
//! ## Errors and completion
//!
//! - A source error is delivered to every open group, which then terminates; the
//!   outer stream emits the same error after any groups not yet taken, then ends.
//! - Source completion completes every open group and then the outer stream.
//!
//! ## Pull-driven execution
//!
//! No task is spawned. Polling the outer stream or any group handle pulls the next
//! source event. A group handle that is not polled buffers its items without bound.
//!
//! ## Cancellation
//!
//! - Dropping a group handle discards that group's future items; routing continues.
//! - Dropping the outer stream stops new groups from being created. Items whose
//!   group is no longer open are discarded.
//! - Once the outer stream and every open group's handle are gone, the source and
//!   all triggers are dropped.
//!
//! ## Example
//!
//! ```rust
//! use futures::{stream, StreamExt};
//! use keyflow_core::StreamItem;
//! use keyflow_stream::GroupByUntilExt;
//!
//! # async fn example() {
//! let source = stream::iter(vec![1, 2, 3, 4, 5, 6]).map(StreamItem::Value);
//!
//! // Groups never close on their own here
//! let mut groups = source.group_by_until(|n: &i32| n % 2, |_| stream::pending::<()>());
//!
//! let mut odd = groups.next().await.unwrap().unwrap();
//! let mut even = groups.next().await.unwrap().unwrap();
//! assert_eq!(*odd.key(), 1);
//! assert_eq!(*even.key(), 0);
//!
//! assert_eq!(odd.next().await.unwrap().unwrap(), 1);
//! assert_eq!(even.next().await.unwrap().unwrap(), 2);
//! # }
//! ```

mod engine;

use crate::logging::trace;
use core::fmt::{self, Debug};
use core::pin::Pin;
use core::task::{Context, Poll};
use engine::{Engine, SharedGroup, Step};
use futures::{Stream, StreamExt};
use keyflow_core::StreamItem;
use parking_lot::Mutex;
use std::sync::Arc;

/// Extension trait providing the `group_by_until` operator.
pub trait GroupByUntilExt<T>: Stream<Item = StreamItem<T>> + Sized {
    /// Splits the stream into keyed groups that close when their trigger emits.
    ///
    /// `key_fn` is called once per value. `termination` is called once per opened
    /// group with that group's key; the returned stream's first item closes the group.
    ///
    /// See the [module-level documentation](crate::group_by_until) for the routing rules.
    fn group_by_until<K, KF, D, DF>(self, key_fn: KF, termination: DF) -> GroupedStreams<K, T>
    where
        K: Clone + PartialEq + Send + 'static,
        KF: Fn(&T) -> K + Send + 'static,
        D: Stream + Send + 'static,
        DF: FnMut(&K) -> D + Send + 'static;
}

impl<S, T> GroupByUntilExt<T> for S
where
    S: Stream<Item = StreamItem<T>> + Send + 'static,
    T: Send + 'static,
{
    fn group_by_until<K, KF, D, DF>(self, key_fn: KF, mut termination: DF) -> GroupedStreams<K, T>
    where
        K: Clone + PartialEq + Send + 'static,
        KF: Fn(&T) -> K + Send + 'static,
        D: Stream + Send + 'static,
        DF: FnMut(&K) -> D + Send + 'static,
    {
        let factory = move |key: &K| termination(key).map(|_| ()).boxed();
        let engine = Engine::new(self.boxed(), Box::new(key_fn), Box::new(factory));

        GroupedStreams {
            engine: Arc::new(Mutex::new(engine)),
        }
    }
}

/// The outer stream of [`group_by_until`](GroupByUntilExt::group_by_until): one
/// [`GroupedStream`] per opened group, in creation order.
pub struct GroupedStreams<K, T> {
    engine: Arc<Mutex<Engine<K, T>>>,
}

impl<K, T> Stream for GroupedStreams<K, T>
where
    K: Clone + PartialEq + Send + 'static,
    T: Send + 'static,
{
    type Item = StreamItem<GroupedStream<K, T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let mut engine = this.engine.lock();

        loop {
            if let Some((key, state)) = engine.ready.pop_front() {
                let group = GroupedStream {
                    key,
                    state,
                    engine: Arc::clone(&this.engine),
                };
                return Poll::Ready(Some(StreamItem::Value(group)));
            }

            if let Some(outcome) = engine.take_outcome() {
                return Poll::Ready(outcome.map(StreamItem::Error));
            }

            match engine.poll_step(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Step::Advanced) => continue,
                Poll::Ready(Step::Exhausted) => return Poll::Ready(None),
            }
        }
    }
}

impl<K, T> Drop for GroupedStreams<K, T> {
    fn drop(&mut self) {
        trace!("group_by_until: outer stream dropped");
        self.engine.lock().detach_outer();
    }
}

/// One group emitted by [`GroupedStreams`].
///
/// Yields the values routed to this group and ends when the group's trigger fires
/// or the source terminates.
pub struct GroupedStream<K, T> {
    key: K,
    state: SharedGroup<T>,
    engine: Arc<Mutex<Engine<K, T>>>,
}

impl<K, T> Unpin for GroupedStream<K, T> {}

impl<K, T> GroupedStream<K, T> {
    /// The key shared by every value of this group.
    pub const fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Debug, T> Debug for GroupedStream<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedStream")
            .field("key", &self.key)
            .field("closed", &self.state.lock().closed)
            .finish()
    }
}

impl<K, T> Stream for GroupedStream<K, T>
where
    K: Clone + PartialEq + Send + 'static,
    T: Send + 'static,
{
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let mut engine = this.engine.lock();

        loop {
            {
                let mut state = this.state.lock();
                if let Some(item) = state.queue.pop_front() {
                    return Poll::Ready(Some(item));
                }
                if state.closed {
                    return Poll::Ready(None);
                }
            }

            match engine.poll_step(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Step::Advanced) => continue,
                Poll::Ready(Step::Exhausted) => return Poll::Ready(None),
            }
        }
    }
}

impl<K, T> Drop for GroupedStream<K, T> {
    fn drop(&mut self) {
        self.engine.lock().detach_group(&self.state);
    }
}
