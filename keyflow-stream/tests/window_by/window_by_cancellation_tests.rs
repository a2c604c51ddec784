// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use keyflow_stream::WindowByExt;
use keyflow_test_utils::test_data::{
    animal_cat, animal_dog, person_alice, person_bob, person_charlie, DataVariant, TestData,
};
use keyflow_test_utils::{
    assert_stream_ended, test_channel, unwrap_stream, unwrap_value, Sequenced, SubscriptionProbe,
};

#[tokio::test]
async fn test_dropping_a_window_keeps_outer_producing() -> anyhow::Result<()> {
    // Arrange
    let probe = SubscriptionProbe::new();
    let (tx, stream) = test_channel::<Sequenced<TestData>>();
    let mut windows = probe
        .wrap(stream)
        .window_by(|item: &Sequenced<TestData>| item.variant());

    tx.send(Sequenced::new(person_alice()))?;
    let people = unwrap_value(Some(unwrap_stream(&mut windows, 500).await));

    // Act
    drop(people);
    tx.send(Sequenced::new(person_bob()))?;
    tx.send(Sequenced::new(animal_dog()))?;
    tx.send(Sequenced::new(person_charlie()))?;

    // Assert
    let mut animals = unwrap_value(Some(unwrap_stream(&mut windows, 500).await));
    assert_eq!(*animals.key(), DataVariant::Animal);
    assert_eq!(unwrap_stream(&mut animals, 500).await.unwrap().value, animal_dog());

    let mut people_again = unwrap_value(Some(unwrap_stream(&mut windows, 500).await));
    assert_eq!(unwrap_stream(&mut people_again, 500).await.unwrap().value, person_charlie());
    assert_eq!(probe.subscriptions(), 1);
    assert_eq!(probe.unsubscriptions(), 0);

    Ok(())
}

#[tokio::test]
async fn test_dropping_outer_lets_open_window_finish_then_releases_source() -> anyhow::Result<()> {
    // Arrange
    let probe = SubscriptionProbe::new();
    let (tx, stream) = test_channel::<Sequenced<TestData>>();
    let mut windows = probe
        .wrap(stream)
        .window_by(|item: &Sequenced<TestData>| item.variant());

    tx.send(Sequenced::new(person_alice()))?;
    let mut people = unwrap_value(Some(unwrap_stream(&mut windows, 500).await));

    // Act
    drop(windows);
    tx.send(Sequenced::new(person_bob()))?;
    tx.send(Sequenced::new(animal_cat()))?;
    tx.send(Sequenced::new(person_charlie()))?;

    // Assert - the open window runs to its boundary, then nothing needs the source
    assert_eq!(unwrap_stream(&mut people, 500).await.unwrap().value, person_alice());
    assert_eq!(unwrap_stream(&mut people, 500).await.unwrap().value, person_bob());
    assert_stream_ended(&mut people, 500).await;
    assert_eq!(probe.subscriptions(), 1);
    assert_eq!(probe.unsubscriptions(), 1);

    Ok(())
}

#[tokio::test]
async fn test_dropping_outer_and_windows_releases_source() -> anyhow::Result<()> {
    // Arrange
    let probe = SubscriptionProbe::new();
    let (tx, stream) = test_channel::<Sequenced<TestData>>();
    let mut windows = probe
        .wrap(stream)
        .window_by(|item: &Sequenced<TestData>| item.variant());

    tx.send(Sequenced::new(person_alice()))?;
    let people = unwrap_value(Some(unwrap_stream(&mut windows, 500).await));
    assert!(probe.is_active());

    // Act
    drop(people);
    drop(windows);

    // Assert
    assert_eq!(probe.subscriptions(), 1);
    assert_eq!(probe.unsubscriptions(), 1);
    assert!(!probe.is_active());

    Ok(())
}
