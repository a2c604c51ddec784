// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::channel::mpsc;
use futures::stream;
use keyflow_stream::GroupByUntilExt;
use keyflow_test_utils::test_data::{
    animal_dog, animal_spider, person_alice, person_bob, person_charlie, DataVariant, TestData,
};
use keyflow_test_utils::{
    assert_stream_ended, test_channel, unwrap_stream, unwrap_value, Sequenced, SubscriptionProbe,
};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_dropped_group_discards_items_while_routing_continues() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel::<Sequenced<TestData>>();
    let mut groups = stream.group_by_until(
        |item: &Sequenced<TestData>| item.variant(),
        |_| stream::pending::<()>(),
    );

    tx.send(Sequenced::new(person_alice()))?;
    let people = unwrap_value(Some(unwrap_stream(&mut groups, 500).await));

    // Act
    drop(people);
    tx.send(Sequenced::new(person_bob()))?;
    tx.send(Sequenced::new(animal_dog()))?;

    // Assert - bob went to the dropped group, the dog still opens a new one
    let mut animals = unwrap_value(Some(unwrap_stream(&mut groups, 500).await));
    assert_eq!(*animals.key(), DataVariant::Animal);
    assert_eq!(unwrap_stream(&mut animals, 500).await.unwrap().value, animal_dog());

    Ok(())
}

#[tokio::test]
async fn test_dropping_outer_stops_new_groups_but_open_group_continues() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel::<Sequenced<TestData>>();
    let mut groups = stream.group_by_until(
        |item: &Sequenced<TestData>| item.variant(),
        |_| stream::pending::<()>(),
    );

    tx.send(Sequenced::new(person_alice()))?;
    let mut people = unwrap_value(Some(unwrap_stream(&mut groups, 500).await));

    // Act
    drop(groups);
    tx.send(Sequenced::new(person_bob()))?;
    tx.send(Sequenced::new(animal_dog()))?; // no consumer for a new group
    tx.send(Sequenced::new(person_charlie()))?;
    drop(tx);

    // Assert
    assert_eq!(unwrap_stream(&mut people, 500).await.unwrap().value, person_alice());
    assert_eq!(unwrap_stream(&mut people, 500).await.unwrap().value, person_bob());
    assert_eq!(unwrap_stream(&mut people, 500).await.unwrap().value, person_charlie());
    assert_stream_ended(&mut people, 500).await;

    Ok(())
}

#[tokio::test]
async fn test_source_released_once_no_open_group_is_observed() -> anyhow::Result<()> {
    // Arrange
    let probe = SubscriptionProbe::new();
    let closers: Arc<Mutex<Vec<mpsc::UnboundedSender<()>>>> = Arc::default();
    let registry = Arc::clone(&closers);
    let (tx, stream) = test_channel::<Sequenced<TestData>>();
    let mut groups = probe.wrap(stream).group_by_until(
        |item: &Sequenced<TestData>| item.variant(),
        move |_| {
            let (close_tx, close_rx) = mpsc::unbounded::<()>();
            registry.lock().unwrap().push(close_tx);
            close_rx
        },
    );

    tx.send(Sequenced::new(animal_dog()))?;
    let mut closed_group = unwrap_value(Some(unwrap_stream(&mut groups, 500).await));
    closers.lock().unwrap()[0].unbounded_send(())?;
    tx.send(Sequenced::new(animal_spider()))?;
    let open_group = unwrap_value(Some(unwrap_stream(&mut groups, 500).await));

    // Act - keep the closed group's handle, drop everything else
    drop(open_group);
    drop(groups);

    // Assert
    assert_eq!(probe.subscriptions(), 1);
    assert_eq!(probe.unsubscriptions(), 1);
    assert_eq!(unwrap_stream(&mut closed_group, 500).await.unwrap().value, animal_dog());
    assert_stream_ended(&mut closed_group, 500).await;

    Ok(())
}
