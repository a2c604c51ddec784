// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use keyflow_core::{KeyflowError, StreamItem};
use keyflow_stream::SkipItemsExt;
use keyflow_test_utils::{test_channel_with_errors, unwrap_stream, Sequenced};

#[tokio::test]
async fn test_skip_counts_errors_as_items() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel_with_errors::<Sequenced<i32>>();
    let mut result = stream.skip_items(2);

    // Act
    tx.send(StreamItem::Value(Sequenced::new(1)))?; // Skipped
    tx.send(StreamItem::Error(KeyflowError::stream_error("error")))?; // Skipped
    tx.send(StreamItem::Value(Sequenced::new(2)))?; // Emitted
    tx.send(StreamItem::Error(KeyflowError::stream_error("error2")))?; // Emitted

    // Assert
    assert_eq!(unwrap_stream(&mut result, 500).await.unwrap().value, 2);
    assert!(unwrap_stream(&mut result, 500).await.is_error());

    Ok(())
}
