// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Key-boundary windowing operator.
//!
//! [`window_by`](WindowByExt::window_by) splits a stream into consecutive,
//! non-overlapping windows. A new window starts whenever an item's key differs
//! from the key of the item right before it; the first item always starts the
//! first window. Keys are only ever compared between adjacent items, so a key
//! that reappears later starts a new window of its own.
//!
//! ```text
//! keys:    a  a  b  b  a  |
//! windows: [a  a] [b  b] [a] |
//! ```
//!
//! ## Composition
//!
//! The operator is built from the primitives in this crate:
//!
//! 1. The source is mapped to keyed items (the key function runs once per item) and
//!    [`share`](crate::ShareExt::share)d, so the source is subscribed to exactly once.
//! 2. A passive view of the share, deduplicated by key with
//!    [`distinct_until_changed_by`](crate::DistinctUntilChangedByExt::distinct_until_changed_by),
//!    is the *boundary signal*. It is shared as well.
//! 3. The driving view is grouped with
//!    [`group_by_until`](crate::GroupByUntilExt::group_by_until). Each group's
//!    termination trigger is a fresh subscription to the boundary signal with its
//!    first emission skipped: that emission is the boundary that created the group,
//!    the next one ends it.
//!
//! ## Errors
//!
//! A source error, or a key function failure with
//! [`try_window_by`](WindowByExt::try_window_by), is delivered to the open window
//! and then to the outer stream. Both end; no further windows are created.
//!
//! ## Consumption
//!
//! No task is spawned. Polling either the outer stream or a window pulls the
//! source, so a window can be read to its end before the next window is requested.
//! A window that is never polled buffers its items; a dropped window discards them.

use crate::distinct_until_changed_by::DistinctUntilChangedByExt;
use crate::group_by_until::{GroupByUntilExt, GroupedStream};
use crate::logging::warn;
use crate::share::ShareExt;
use crate::skip_items::SkipItemsExt;
use core::fmt::{self, Debug};
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::future::Either;
use futures::stream::{self, Stream, StreamExt};
use keyflow_core::{KeyflowError, StreamItem};

#[derive(Clone)]
pub(crate) struct Keyed<K, T> {
    key: K,
    item: T,
}

/// A key-tagged run of adjacent items that share the same key.
///
/// The key is that of the item that opened the window. The window ends when an
/// item with a different key arrives or the source terminates.
pub struct Window<K, T> {
    inner: GroupedStream<K, Keyed<K, T>>,
}

impl<K, T> Window<K, T> {
    fn new(inner: GroupedStream<K, Keyed<K, T>>) -> Self {
        Self { inner }
    }

    /// The key of the first item of this window.
    pub const fn key(&self) -> &K {
        self.inner.key()
    }
}

impl<K: Debug, T> Debug for Window<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window").field("key", self.key()).finish()
    }
}

impl<K, T> Stream for Window<K, T>
where
    K: Clone + PartialEq + Send + 'static,
    T: Send + 'static,
{
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut()
            .inner
            .poll_next_unpin(cx)
            .map(|next| next.map(|keyed| keyed.map(|keyed| keyed.item)))
    }
}

/// Extension trait providing the `window_by` operator.
pub trait WindowByExt<T>: Stream<Item = StreamItem<T>> + Sized
where
    T: Clone + Send + 'static,
{
    /// Splits the stream into windows of adjacent items with equal keys.
    ///
    /// `key_fn` is called once per item. See the
    /// [module-level documentation](crate::window_by) for the windowing rules.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use keyflow_core::StreamItem;
    /// use keyflow_stream::WindowByExt;
    ///
    /// # async fn example() {
    /// let words = stream::iter(vec!["ant", "ape", "bee", "asp"]).map(StreamItem::Value);
    /// let mut windows = words.window_by(|w: &&str| w.chars().next());
    ///
    /// let first = windows.next().await.unwrap().unwrap();
    /// assert_eq!(*first.key(), Some('a'));
    /// let items: Vec<_> = first.map(StreamItem::unwrap).collect().await;
    /// assert_eq!(items, vec!["ant", "ape"]);
    /// # }
    /// ```
    fn window_by<K, F>(
        self,
        key_fn: F,
    ) -> impl Stream<Item = StreamItem<Window<K, T>>> + Send + Unpin
    where
        K: Clone + PartialEq + Send + 'static,
        F: Fn(&T) -> K + Send + 'static;

    /// Like [`window_by`](WindowByExt::window_by), with a key function that can fail.
    ///
    /// A failed key extraction travels exactly like a source error: the open window
    /// and the outer stream both receive it and end.
    fn try_window_by<K, F>(
        self,
        key_fn: F,
    ) -> impl Stream<Item = StreamItem<Window<K, T>>> + Send + Unpin
    where
        K: Clone + PartialEq + Send + 'static,
        F: Fn(&T) -> Result<K, KeyflowError> + Send + 'static;
}

impl<S, T> WindowByExt<T> for S
where
    S: Stream<Item = StreamItem<T>> + Send + 'static,
    T: Clone + Send + 'static,
{
    fn window_by<K, F>(
        self,
        key_fn: F,
    ) -> impl Stream<Item = StreamItem<Window<K, T>>> + Send + Unpin
    where
        K: Clone + PartialEq + Send + 'static,
        F: Fn(&T) -> K + Send + 'static,
    {
        self.try_window_by(move |item| Ok(key_fn(item)))
    }

    fn try_window_by<K, F>(
        self,
        key_fn: F,
    ) -> impl Stream<Item = StreamItem<Window<K, T>>> + Send + Unpin
    where
        K: Clone + PartialEq + Send + 'static,
        F: Fn(&T) -> Result<K, KeyflowError> + Send + 'static,
    {
        let keyed = self.map(move |item| {
            item.and_then(|item| match key_fn(&item) {
                Ok(key) => StreamItem::Value(Keyed { key, item }),
                Err(error) => {
                    warn!("window_by: key extraction failed: {}", error);
                    StreamItem::Error(error)
                }
            })
        });

        let shared = keyed.share();
        let items = shared
            .subscribe()
            .unwrap_or_else(|_| unreachable!("fresh share should allow subscription"));
        let boundaries = shared
            .subscribe_passive()
            .unwrap_or_else(|_| unreachable!("fresh share should allow subscription"))
            .distinct_until_changed_by(|a: &Keyed<K, T>, b: &Keyed<K, T>| a.key == b.key)
            .share();

        items
            .group_by_until(
                |keyed: &Keyed<K, T>| keyed.key.clone(),
                move |_: &K| match boundaries.subscribe() {
                    Ok(boundary) => Either::Left(boundary.skip_items(1)),
                    Err(error) => {
                        warn!("window_by: boundary signal unavailable: {}", error);
                        Either::Right(stream::empty::<StreamItem<Keyed<K, T>>>())
                    }
                },
            )
            .map(|group| group.map(Window::new))
    }
}
