// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::logging::trace;
use core::task::{Context, Poll};
use futures::stream::BoxStream;
use keyflow_core::{KeyflowError, StreamItem, WakerSet};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

pub(super) type Trigger = BoxStream<'static, ()>;
pub(super) type KeyFn<K, T> = Box<dyn Fn(&T) -> K + Send>;
pub(super) type TriggerFactory<K> = Box<dyn FnMut(&K) -> Trigger + Send>;

/// Per-group buffer shared between the engine and the group's handle.
#[derive(Debug)]
pub(super) struct GroupState<T> {
    pub(super) queue: VecDeque<StreamItem<T>>,
    pub(super) closed: bool,
    pub(super) attached: bool,
}

impl<T> GroupState<T> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            closed: false,
            attached: true,
        }
    }

    fn push(&mut self, item: StreamItem<T>) {
        if self.attached {
            self.queue.push_back(item);
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

pub(super) type SharedGroup<T> = Arc<Mutex<GroupState<T>>>;

struct OpenGroup<K, T> {
    key: K,
    state: SharedGroup<T>,
    trigger: Option<Trigger>,
}

enum Outcome {
    Running,
    Completed,
    Failed(Option<KeyflowError>),
}

/// What a call to [`Engine::poll_step`] achieved.
pub(super) enum Step {
    /// One source event was processed.
    Advanced,
    /// The source is gone; no further progress is possible.
    Exhausted,
}

/// Routing state shared by the outer stream and every group handle.
///
/// Whoever polls drives the source, one event per step. Lock order is
/// engine first, then group state.
pub(super) struct Engine<K, T> {
    source: Option<BoxStream<'static, StreamItem<T>>>,
    key_fn: KeyFn<K, T>,
    factory: Option<TriggerFactory<K>>,
    open: Vec<OpenGroup<K, T>>,
    pub(super) ready: VecDeque<(K, SharedGroup<T>)>,
    pub(super) outer_attached: bool,
    outcome: Outcome,
    wakers: Arc<WakerSet>,
}

impl<K, T> Engine<K, T>
where
    K: Clone + PartialEq + Send + 'static,
    T: Send + 'static,
{
    pub(super) fn new(
        source: BoxStream<'static, StreamItem<T>>,
        key_fn: KeyFn<K, T>,
        factory: TriggerFactory<K>,
    ) -> Self {
        Self {
            source: Some(source),
            key_fn,
            factory: Some(factory),
            open: Vec::new(),
            ready: VecDeque::new(),
            outer_attached: true,
            outcome: Outcome::Running,
            wakers: Arc::new(WakerSet::new()),
        }
    }

    /// Pulls at most one event from the source and routes it.
    pub(super) fn poll_step(&mut self, cx: &mut Context<'_>) -> Poll<Step> {
        let Some(source) = self.source.as_mut() else {
            return Poll::Ready(Step::Exhausted);
        };

        self.wakers.register(cx.waker());
        let fan_out = self.wakers.waker();
        let mut fan_cx = Context::from_waker(&fan_out);

        let polled = source.as_mut().poll_next(&mut fan_cx);
        match polled {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Some(StreamItem::Value(value))) => self.route(value, &mut fan_cx),
            Poll::Ready(Some(StreamItem::Error(error))) => self.fail(error),
            Poll::Ready(None) => self.complete(),
        }

        self.wakers.wake_all();
        Poll::Ready(Step::Advanced)
    }

    /// Takes the terminal result for the outer stream.
    ///
    /// `None` while the source is still running. An error is handed out once,
    /// after which the outer stream is reported as completed.
    pub(super) fn take_outcome(&mut self) -> Option<Option<KeyflowError>> {
        match &mut self.outcome {
            Outcome::Running => None,
            Outcome::Completed => Some(None),
            Outcome::Failed(error) => {
                let error = error.take();
                if error.is_none() {
                    self.outcome = Outcome::Completed;
                }
                Some(error)
            }
        }
    }

    fn route(&mut self, value: T, cx: &mut Context<'_>) {
        let key = (self.key_fn)(&value);

        // Keys need not equal themselves (`f64::NAN`): route by handle, not by a second lookup
        let existing = self
            .open
            .iter()
            .find(|group| group.key == key)
            .map(|group| Arc::clone(&group.state));
        let mut target = existing.or_else(|| self.open_group(&key));

        self.poll_triggers(cx);

        if target.as_ref().is_some_and(|state| state.lock().closed) {
            target = self.open_group(&key);
        }

        match target {
            Some(state) => state.lock().push(StreamItem::Value(value)),
            None => trace!("group_by_until: no consumer for item, dropped"),
        }

        self.release_if_idle();
    }

    fn open_group(&mut self, key: &K) -> Option<SharedGroup<T>> {
        if !self.outer_attached {
            return None;
        }
        let factory = self.factory.as_mut()?;

        trace!("group_by_until: opening group");
        let state = Arc::new(Mutex::new(GroupState::new()));
        let trigger = factory(key);

        self.ready.push_back((key.clone(), Arc::clone(&state)));
        self.open.push(OpenGroup {
            key: key.clone(),
            state: Arc::clone(&state),
            trigger: Some(trigger),
        });
        Some(state)
    }

    /// Polls every open group's trigger once, closing the groups whose trigger fired.
    fn poll_triggers(&mut self, cx: &mut Context<'_>) {
        self.open.retain_mut(|group| {
            let Some(trigger) = group.trigger.as_mut() else {
                return true;
            };

            match trigger.as_mut().poll_next(cx) {
                Poll::Ready(Some(())) => {
                    trace!("group_by_until: closing group");
                    group.state.lock().close();
                    false
                }
                Poll::Ready(None) => {
                    group.trigger = None;
                    true
                }
                Poll::Pending => true,
            }
        });
    }

    fn fail(&mut self, error: KeyflowError) {
        for group in self.open.drain(..) {
            let mut state = group.state.lock();
            state.push(StreamItem::Error(error.clone()));
            state.close();
        }
        self.shut_down(Outcome::Failed(Some(error)));
    }

    fn complete(&mut self) {
        self.shut_down(Outcome::Completed);
    }
}

impl<K, T> Engine<K, T> {
    pub(super) fn detach_outer(&mut self) {
        self.outer_attached = false;
        self.ready.clear();
        self.release_if_idle();
    }

    pub(super) fn detach_group(&mut self, group: &SharedGroup<T>) {
        {
            let mut state = group.lock();
            state.attached = false;
            state.queue.clear();
        }
        self.release_if_idle();
    }

    /// Releases the source once nobody can observe further routing.
    fn release_if_idle(&mut self) {
        if self.outer_attached || self.source.is_none() {
            return;
        }

        let observed = self.open.iter().any(|group| group.state.lock().attached);
        if observed {
            return;
        }

        trace!("group_by_until: no observers left, releasing source");
        self.shut_down(Outcome::Completed);
    }

    /// Closes every open group, then drops the factory before the source.
    ///
    /// Trigger factories can hold subscriptions on the source.
    fn shut_down(&mut self, outcome: Outcome) {
        for group in self.open.drain(..) {
            group.state.lock().close();
        }
        self.outcome = outcome;
        self.factory = None;
        self.source = None;
    }
}
