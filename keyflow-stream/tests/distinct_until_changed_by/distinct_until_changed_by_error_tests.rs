// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::{stream, StreamExt};
use keyflow_core::{KeyflowError, StreamItem};
use keyflow_stream::DistinctUntilChangedByExt;
use keyflow_test_utils::{test_channel_with_errors, unwrap_stream, Sequenced};

#[tokio::test]
async fn test_errors_pass_through_without_resetting_state() {
    // Arrange
    let source = stream::iter(vec![
        StreamItem::Value(1),
        StreamItem::Error(KeyflowError::stream_error("boom")),
        StreamItem::Value(1),
        StreamItem::Value(2),
    ]);

    // Act
    let result: Vec<_> = source
        .distinct_until_changed_by(|a: &i32, b| a == b)
        .collect()
        .await;

    // Assert - the repeated 1 after the error is still a duplicate
    assert_eq!(result.len(), 3);
    assert!(matches!(result[0], StreamItem::Value(1)));
    assert!(matches!(result[1], StreamItem::Error(_)));
    assert!(matches!(result[2], StreamItem::Value(2)));
}

#[tokio::test]
async fn test_error_as_first_item_is_propagated() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel_with_errors::<Sequenced<i32>>();
    let mut result = stream.distinct_until_changed_by(|a: &Sequenced<i32>, b| a.value == b.value);

    // Act
    tx.send(StreamItem::Error(KeyflowError::stream_error("first")))?;
    tx.send(StreamItem::Value(Sequenced::new(4)))?;

    // Assert
    assert!(unwrap_stream(&mut result, 500).await.is_error());
    assert_eq!(unwrap_stream(&mut result, 500).await.unwrap().value, 4);

    Ok(())
}
