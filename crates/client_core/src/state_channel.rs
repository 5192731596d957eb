//! Replaying state channels.
//!
//! A [`StateChannel`] keeps the latest value and fans every update out to its
//! subscribers. A new [`StateSubscription`] first yields the value that was
//! current when it subscribed, then every later update in publish order.

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    Stream, StreamExt,
};

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateRecvError {
    #[error("state channel closed")]
    Closed,
    #[error("subscriber lagged behind by {0} updates")]
    Lagged(u64),
}

pub struct StateChannel<T> {
    current: Mutex<Option<T>>,
    tx: broadcast::Sender<T>,
}

impl<T: Clone> StateChannel<T> {
    pub fn new(initial: T) -> Self {
        Self::with_current(Some(initial), DEFAULT_CAPACITY)
    }

    /// Replay-one channel with nothing to replay until the first publish.
    pub fn empty() -> Self {
        Self::with_current(None, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(initial: Option<T>, capacity: usize) -> Self {
        Self::with_current(initial, capacity)
    }

    fn with_current(current: Option<T>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            current: Mutex::new(current),
            tx,
        }
    }

    pub fn publish(&self, value: T) {
        // Store and send under one lock so `subscribe` never sees a value
        // twice or misses one.
        let mut current = self.lock();
        *current = Some(value.clone());
        let _ = self.tx.send(value);
    }

    pub fn current(&self) -> Option<T> {
        self.lock().clone()
    }

    pub fn subscribe(&self) -> StateSubscription<T> {
        let current = self.lock();
        StateSubscription {
            pending: current.clone(),
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> std::fmt::Debug for StateChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateChannel")
            .field("subscribers", &self.tx.receiver_count())
            .finish_non_exhaustive()
    }
}

pub struct StateSubscription<T> {
    pending: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone> StateSubscription<T> {
    pub async fn recv(&mut self) -> Result<T, StateRecvError> {
        if let Some(value) = self.pending.take() {
            return Ok(value);
        }
        match self.rx.recv().await {
            Ok(value) => Ok(value),
            Err(RecvError::Closed) => Err(StateRecvError::Closed),
            Err(RecvError::Lagged(skipped)) => Err(StateRecvError::Lagged(skipped)),
        }
    }

    /// Non-blocking receive; `Ok(None)` means nothing new has been published.
    pub fn try_recv(&mut self) -> Result<Option<T>, StateRecvError> {
        if let Some(value) = self.pending.take() {
            return Ok(Some(value));
        }
        match self.rx.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(StateRecvError::Closed),
            Err(TryRecvError::Lagged(skipped)) => Err(StateRecvError::Lagged(skipped)),
        }
    }

    /// Stream view of the subscription. Lag surfaces as an
    /// `Err(StateRecvError::Lagged)` item, as with [`Self::recv`].
    pub fn into_stream(self) -> impl Stream<Item = Result<T, StateRecvError>>
    where
        T: Send + 'static,
    {
        let live = BroadcastStream::new(self.rx).map(|update| {
            update.map_err(|BroadcastStreamRecvError::Lagged(skipped)| {
                StateRecvError::Lagged(skipped)
            })
        });
        tokio_stream::iter(self.pending.map(Ok)).chain(live)
    }
}

#[cfg(test)]
#[path = "tests/state_channel_tests.rs"]
mod tests;
