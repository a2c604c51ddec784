// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream::{Stream, StreamExt};
use keyflow_core::StreamItem;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Asserts that `stream` does not yield anything within `timeout_ms`.
pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        _state = stream.next() => {
            panic!("Unexpected item emitted, expected no output.");
        }
        _ = sleep(Duration::from_millis(timeout_ms)) => {}
    }
}

/// Waits for the next item of `stream`.
///
/// # Panics
///
/// Panics if the stream ends or nothing arrives within `timeout_ms`.
pub async fn unwrap_stream<S, T>(stream: &mut S, timeout_ms: u64) -> StreamItem<T>
where
    S: Stream<Item = StreamItem<T>> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(Some(item)) => item,
        Ok(None) => panic!("Expected StreamItem but stream ended"),
        Err(_) => panic!("Timeout: No item received within {timeout_ms} ms"),
    }
}

/// Extracts the value of a polled item.
///
/// # Panics
///
/// Panics if the item is missing or is an error.
pub fn unwrap_value<T>(item: Option<StreamItem<T>>) -> T {
    match item {
        Some(StreamItem::Value(value)) => value,
        Some(StreamItem::Error(e)) => panic!("Expected Value but got Error: {e}"),
        None => panic!("Expected Value but stream ended"),
    }
}

/// Asserts that `stream` reports its end within `timeout_ms`.
pub async fn assert_stream_ended<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(None) => {}
        Ok(Some(_)) => panic!("Expected stream to end but it emitted an item"),
        Err(_) => panic!("Timeout: stream did not end within {timeout_ms} ms"),
    }
}

/// Drains a finite stream of values, panicking on the first error.
pub async fn collect_values<S, T>(stream: S) -> Vec<T>
where
    S: Stream<Item = StreamItem<T>>,
{
    stream.map(|item| unwrap_value(Some(item))).collect().await
}
