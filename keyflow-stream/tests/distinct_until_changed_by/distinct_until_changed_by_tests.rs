// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::{stream, StreamExt};
use keyflow_core::StreamItem;
use keyflow_stream::DistinctUntilChangedByExt;
use keyflow_test_utils::test_data::{
    animal_cat, animal_dog, person_alice, person_bob, person_charlie, TestData,
};
use keyflow_test_utils::{
    assert_no_element_emitted, collect_values, test_channel, unwrap_stream, Sequenced,
};

#[tokio::test]
async fn test_distinct_until_changed_by_variant() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel::<Sequenced<TestData>>();
    let mut result = stream.distinct_until_changed_by(|a: &Sequenced<TestData>, b| {
        a.variant() == b.variant()
    });

    // Act & Assert
    tx.send(Sequenced::new(person_alice()))?;
    assert_eq!(unwrap_stream(&mut result, 500).await.unwrap().value, person_alice());

    tx.send(Sequenced::new(person_bob()))?; // same variant, filtered
    assert_no_element_emitted(&mut result, 100).await;

    tx.send(Sequenced::new(animal_dog()))?;
    assert_eq!(unwrap_stream(&mut result, 500).await.unwrap().value, animal_dog());

    tx.send(Sequenced::new(animal_cat()))?; // same variant, filtered
    tx.send(Sequenced::new(person_charlie()))?;
    assert_eq!(unwrap_stream(&mut result, 500).await.unwrap().value, person_charlie());

    Ok(())
}

#[tokio::test]
async fn test_adjacent_duplicates_suppressed_but_reappearing_values_emitted() {
    // Arrange
    let source = stream::iter(vec![1, 1, 2, 2, 2, 1]).map(StreamItem::Value);

    // Act
    let result = collect_values(source.distinct_until_changed_by(|a: &i32, b| a == b)).await;

    // Assert
    assert_eq!(result, vec![1, 2, 1]);
}

#[tokio::test]
async fn test_compares_against_last_emitted_value() {
    // Arrange - values within 5 of the last emitted one are "the same"
    let source = stream::iter(vec![1, 3, 5, 7, 8, 13]).map(StreamItem::Value);

    // Act
    let result =
        collect_values(source.distinct_until_changed_by(|a: &i32, b| (a - b).abs() < 5)).await;

    // Assert - 3 and 5 are close to 1, 8 is close to 7
    assert_eq!(result, vec![1, 7, 13]);
}

#[tokio::test]
async fn test_single_value_is_emitted() {
    // Arrange
    let source = stream::iter(vec!["only"]).map(StreamItem::Value);

    // Act
    let result =
        collect_values(source.distinct_until_changed_by(|a: &&str, b| a.len() == b.len())).await;

    // Assert
    assert_eq!(result, vec!["only"]);
}
