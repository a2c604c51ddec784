// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::future::ready;
use futures::stream::StreamExt;
use futures::Stream;
use keyflow_core::StreamItem;

/// Extension trait providing the `distinct_until_changed_by` operator for streams.
///
/// This operator filters out consecutive duplicate values using a custom comparison
/// function, emitting only when the value changes from the previous emission according
/// to the provided comparer.
pub trait DistinctUntilChangedByExt<T>: Stream<Item = StreamItem<T>> + Sized
where
    T: Clone + Send + 'static,
{
    /// Emits values only when they differ from the previous emitted value according
    /// to a custom comparison function.
    ///
    /// # Behavior
    ///
    /// - First value is always emitted (no previous value to compare)
    /// - Subsequent values are compared to the last *emitted* value using `compare`
    /// - Only values where `compare(current, previous) == false` are emitted
    /// - The comparer should return `true` if values are considered equal/same
    /// - Errors are always propagated immediately and do not reset the last value
    ///
    /// # Arguments
    ///
    /// * `compare` - Returns `true` if the two values should be considered equal
    ///   (and the current one filtered), `false` if the current one should be emitted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use keyflow_core::StreamItem;
    /// use keyflow_stream::DistinctUntilChangedByExt;
    ///
    /// # async fn example() {
    /// let source = stream::iter(vec!["apple", "avocado", "banana", "blueberry", "apricot"])
    ///     .map(StreamItem::Value);
    ///
    /// // Only care about changes to the first letter
    /// let heads: Vec<_> = source
    ///     .distinct_until_changed_by(|a: &&str, b: &&str| a.chars().next() == b.chars().next())
    ///     .map(StreamItem::unwrap)
    ///     .collect()
    ///     .await;
    ///
    /// assert_eq!(heads, vec!["apple", "banana", "apricot"]);
    /// # }
    /// ```
    ///
    /// # See Also
    ///
    /// - [`WindowByExt::window_by`](crate::WindowByExt::window_by) - uses this operator
    ///   to detect key boundaries
    fn distinct_until_changed_by<F>(self, compare: F) -> impl Stream<Item = StreamItem<T>> + Send
    where
        F: Fn(&T, &T) -> bool + Send + 'static;
}

impl<T, S> DistinctUntilChangedByExt<T> for S
where
    S: Stream<Item = StreamItem<T>> + Send + 'static,
    T: Clone + Send + 'static,
{
    fn distinct_until_changed_by<F>(self, compare: F) -> impl Stream<Item = StreamItem<T>> + Send
    where
        F: Fn(&T, &T) -> bool + Send + 'static,
    {
        let mut last_emitted: Option<T> = None;

        let stream = self.filter_map(move |item| {
            let forwarded = match item {
                StreamItem::Value(value) => {
                    let should_emit = match last_emitted.as_ref() {
                        None => true,
                        Some(prev) => !compare(&value, prev),
                    };

                    if should_emit {
                        last_emitted = Some(value.clone());
                        Some(StreamItem::Value(value))
                    } else {
                        None
                    }
                }
                StreamItem::Error(e) => Some(StreamItem::Error(e)),
            };
            ready(forwarded)
        });

        Box::pin(stream)
    }
}
