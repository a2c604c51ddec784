// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::{stream, FutureExt, StreamExt};
use keyflow_core::{KeyflowError, ShareError, StreamItem};
use keyflow_stream::ShareExt;
use keyflow_test_utils::{
    assert_stream_ended, test_channel_with_errors, unwrap_stream, Sequenced, SubscriptionProbe,
};

#[tokio::test]
async fn test_error_is_broadcast_and_closes_share() -> anyhow::Result<()> {
    // Arrange
    let probe = SubscriptionProbe::new();
    let (tx, stream) = test_channel_with_errors::<Sequenced<i32>>();
    let shared = probe.wrap(stream).share();
    let mut first = shared.subscribe()?;
    let mut second = shared.subscribe()?;

    // Act
    tx.send(StreamItem::Value(Sequenced::new(1)))?;
    tx.send(StreamItem::Error(KeyflowError::stream_error("upstream failed")))?;
    tx.send(StreamItem::Value(Sequenced::new(2)))?;

    // Assert
    assert!(unwrap_stream(&mut first, 500).await.is_value());
    assert!(unwrap_stream(&mut first, 500).await.is_error());
    assert!(unwrap_stream(&mut second, 500).await.is_value());
    assert!(unwrap_stream(&mut second, 500).await.is_error());

    // Assert - nothing after the error
    assert_stream_ended(&mut first, 500).await;
    assert_stream_ended(&mut second, 500).await;
    assert!(shared.is_closed());
    assert_eq!(probe.unsubscriptions(), 1);

    Ok(())
}

#[test]
fn test_completion_releases_upstream_and_rejects_new_subscribers() -> anyhow::Result<()> {
    // Arrange
    let probe = SubscriptionProbe::new();
    let shared = probe.wrap(stream::iter(vec![StreamItem::Value(1)])).share();
    let mut subscriber = shared.subscribe()?;

    // Act
    let first = subscriber.next().now_or_never();
    let end = subscriber.next().now_or_never();

    // Assert
    assert_eq!(first, Some(Some(StreamItem::Value(1))));
    assert_eq!(end, Some(None));
    assert_eq!(probe.subscriptions(), 1);
    assert_eq!(probe.unsubscriptions(), 1);
    assert_eq!(shared.subscribe_passive().err(), Some(ShareError::Closed));

    Ok(())
}
