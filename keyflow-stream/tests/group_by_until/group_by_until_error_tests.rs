// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream;
use keyflow_core::{KeyflowError, StreamItem};
use keyflow_stream::GroupByUntilExt;
use keyflow_test_utils::test_data::{animal_dog, person_alice, TestData};
use keyflow_test_utils::{
    assert_stream_ended, test_channel_with_errors, unwrap_stream, unwrap_value, Sequenced,
};

#[tokio::test]
async fn test_error_reaches_every_open_group_then_outer() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel_with_errors::<Sequenced<TestData>>();
    let mut groups = stream.group_by_until(
        |item: &Sequenced<TestData>| item.variant(),
        |_| stream::pending::<()>(),
    );

    tx.send(StreamItem::Value(Sequenced::new(person_alice())))?;
    tx.send(StreamItem::Value(Sequenced::new(animal_dog())))?;
    let mut people = unwrap_value(Some(unwrap_stream(&mut groups, 500).await));
    let mut animals = unwrap_value(Some(unwrap_stream(&mut groups, 500).await));

    // Act
    tx.send(StreamItem::Error(KeyflowError::stream_error("source failed")))?;

    // Assert
    assert_eq!(unwrap_stream(&mut people, 500).await.unwrap().value, person_alice());
    assert!(unwrap_stream(&mut people, 500).await.is_error());
    assert_stream_ended(&mut people, 500).await;

    assert_eq!(unwrap_stream(&mut animals, 500).await.unwrap().value, animal_dog());
    assert!(unwrap_stream(&mut animals, 500).await.is_error());
    assert_stream_ended(&mut animals, 500).await;

    assert!(unwrap_stream(&mut groups, 500).await.is_error());
    assert_stream_ended(&mut groups, 500).await;

    Ok(())
}

#[tokio::test]
async fn test_error_before_any_value_only_reaches_outer() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel_with_errors::<Sequenced<TestData>>();
    let mut groups = stream.group_by_until(
        |item: &Sequenced<TestData>| item.variant(),
        |_| stream::pending::<()>(),
    );

    // Act
    tx.send(StreamItem::Error(KeyflowError::stream_error("early")))?;
    tx.send(StreamItem::Value(Sequenced::new(person_alice())))?;

    // Assert - nothing after the error opens a group
    assert!(unwrap_stream(&mut groups, 500).await.is_error());
    assert_stream_ended(&mut groups, 500).await;

    Ok(())
}
