//! Replay-of-one broadcast of asynchronous results.
//!
//! A `ResultChannel` keeps only the most recent result. Each subscriber gets
//! its own single-slot `watch` channel, so a subscriber that falls behind
//! skips straight to the latest value instead of queueing history, and never
//! holds up the producer or the other subscribers.

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::models::error::Error;

pub type Outcome<T> = Result<T, Error>;

type Slot<T> = watch::Sender<Option<Outcome<T>>>;

struct Inner<T> {
    latest: Option<Outcome<T>>,
    subscribers: Vec<Slot<T>>,
}

pub struct ResultChannel<T> {
    name: &'static str,
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> ResultChannel<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(Inner {
                latest: None,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Store `outcome` as the latest value and hand it to every current
    /// subscriber, in subscription order. Failures are logged first.
    pub fn push(&self, outcome: Outcome<T>) {
        let mut inner = self.inner.lock();
        self.publish(&mut inner, outcome);
    }

    /// Push only if nothing has been pushed yet. Returns whether it did.
    pub fn seed_if_empty(&self, outcome: Outcome<T>) -> bool {
        let mut inner = self.inner.lock();
        if inner.latest.is_some() {
            return false;
        }
        self.publish(&mut inner, outcome);
        true
    }

    /// Subscribe; the current value, if any, is delivered first.
    pub fn subscribe(&self) -> Subscription<T> {
        let mut inner = self.inner.lock();
        let (tx, rx) = watch::channel(None);
        if let Some(latest) = inner.latest.clone() {
            // The receiver is alive, so this marks the value as unseen.
            let _ = tx.send(Some(latest));
        }
        inner.subscribers.push(tx);
        Subscription { rx }
    }

    pub fn latest(&self) -> Option<Outcome<T>> {
        self.inner.lock().latest.clone()
    }

    /// Subscribers still attached as of the last push.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    fn publish(&self, inner: &mut Inner<T>, outcome: Outcome<T>) {
        if let Err(ref e) = outcome {
            log::error!("{}: {}", self.name, e);
        }
        // A failed send means the subscription was dropped.
        inner
            .subscribers
            .retain(|tx| tx.send(Some(outcome.clone())).is_ok());
        inner.latest = Some(outcome);
    }
}

/// Receiving half of a `ResultChannel` subscription.
pub struct Subscription<T> {
    rx: watch::Receiver<Option<Outcome<T>>>,
}

impl<T: Clone> Subscription<T> {
    /// Wait for the next value not yet seen by this subscriber.
    ///
    /// Returns `None` once the channel is gone.
    pub async fn recv(&mut self) -> Option<Outcome<T>> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(outcome) = self.rx.borrow_and_update().clone() {
                return Some(outcome);
            }
        }
    }

    /// The next unseen value, without waiting.
    pub fn try_recv(&mut self) -> Option<Outcome<T>> {
        if !self.rx.has_changed().unwrap_or(false) {
            return None;
        }
        self.rx.borrow_and_update().clone()
    }
}
