use super::messages::ChannelEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

/// Fan-out of channel events to registered listeners.
///
/// Every listener receives every event in emission order. Listeners are
/// unbounded so a slow consumer never causes an event to be dropped.
#[derive(Debug, Default)]
pub struct EventHub {
    listeners: Mutex<Vec<mpsc::UnboundedSender<ChannelEvent>>>,
    closed: AtomicBool,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Dropping the returned [`Subscription`]
    /// deregisters it. After [`close`](Self::close) the subscription is
    /// already ended.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listeners = self.lock();
        if !self.closed.load(Ordering::Acquire) {
            listeners.push(tx);
        }
        Subscription { rx }
    }

    /// End the event stream. Every subscription drains what it already
    /// received and then yields `None`; later emits reach nobody.
    pub fn close(&self) {
        let mut listeners = self.lock();
        self.closed.store(true, Ordering::Release);
        listeners.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Deliver an event to every live listener, returning how many got it
    pub fn emit(&self, event: ChannelEvent) -> usize {
        let mut listeners = self.lock();
        if self.closed.load(Ordering::Acquire) {
            debug!("Dropping channel event {:?} on closed hub", event);
            return 0;
        }

        listeners.retain(|tx| tx.send(event.clone()).is_ok());

        if listeners.is_empty() {
            debug!("No listeners for channel event {:?}", event);
        }

        listeners.len()
    }

    /// Number of listeners whose subscription is still held
    pub fn listener_count(&self) -> usize {
        let mut listeners = self.lock();
        listeners.retain(|tx| !tx.is_closed());
        listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<ChannelEvent>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped registration on an [`EventHub`]
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl Subscription {
    /// Next event, or `None` once the hub is gone
    pub async fn next(&mut self) -> Option<ChannelEvent> {
        self.rx.recv().await
    }

    /// Next already-delivered event, without waiting
    pub fn try_next(&mut self) -> Option<ChannelEvent> {
        self.rx.try_recv().ok()
    }
}
