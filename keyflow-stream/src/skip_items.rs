// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Skip-items operator that skips the first n items from a stream.

use futures::{Stream, StreamExt};
use keyflow_core::StreamItem;

/// Extension trait providing the `skip_items` operator for streams.
pub trait SkipItemsExt<T>: Stream<Item = StreamItem<T>> + Sized {
    /// Skips the first `n` items from the stream.
    ///
    /// If the stream has fewer than `n` items, no items are emitted and the result
    /// completes when the source does.
    ///
    /// # Error Handling
    ///
    /// Errors count as items for the purpose of skipping. Skipping 2 items of
    /// `[Error, Error, Value]` emits only the value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use keyflow_core::StreamItem;
    /// use keyflow_stream::SkipItemsExt;
    ///
    /// # async fn example() {
    /// let rest: Vec<_> = stream::iter(vec![1, 2, 3])
    ///     .map(StreamItem::Value)
    ///     .skip_items(2)
    ///     .collect()
    ///     .await;
    ///
    /// assert_eq!(rest, vec![StreamItem::Value(3)]);
    /// # }
    /// ```
    fn skip_items(self, n: usize) -> impl Stream<Item = StreamItem<T>> + Send
    where
        Self: Send;
}

impl<S, T> SkipItemsExt<T> for S
where
    S: Stream<Item = StreamItem<T>>,
{
    fn skip_items(self, n: usize) -> impl Stream<Item = StreamItem<T>> + Send
    where
        Self: Send,
    {
        StreamExt::skip(self, n)
    }
}
