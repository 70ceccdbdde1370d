//! # Event bus: single intake channel shared by all running workers.
//!
//! [`Bus`] is a thin wrapper around a bounded [`tokio::sync::mpsc`] channel plus a
//! close token. Every running worker holds a clone and publishes its [`Event`]s into it;
//! exactly one dispatcher drains the receiving end.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                   Consumer (one):
//!   Worker 1 ──┐
//!   Worker 2 ──┼──────► Bus ──────────► dispatcher ──► ChainExecutor (task per event)
//!   Worker N ──┘   (mpsc + close token)
//! ```
//!
//! ## Rules
//! - **Per-sender FIFO**: events from one worker arrive in the order it published them.
//! - **No cross-sender order**: interleaving between workers is unspecified.
//! - **Backpressure**: `publish().await` waits while the channel is full.
//! - **Close is final**: after [`Bus::close`], `publish` returns [`BusClosed`] and the
//!   dispatcher stops receiving; nothing published afterwards reaches chains.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::event::Event;
use crate::error::BusClosed;

/// Cloneable publishing handle for the event bus.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: mpsc::Sender<Event>,
    closed: CancellationToken,
}

/// Receiving end of the bus, owned by the dispatcher.
#[derive(Debug)]
pub struct BusReceiver {
    rx: mpsc::Receiver<Event>,
    closed: CancellationToken,
}

impl Bus {
    /// Creates a new bus with the given capacity (min 1) and its single receiver.
    pub fn new(capacity: usize) -> (Self, BusReceiver) {
        let (tx, rx) = mpsc::channel::<Event>(capacity.max(1));
        let closed = CancellationToken::new();
        (
            Self {
                tx,
                closed: closed.clone(),
            },
            BusReceiver { rx, closed },
        )
    }

    /// Submits an event to the dispatcher.
    ///
    /// Waits for capacity if the channel is full; the wait is abandoned when the bus closes.
    pub async fn publish(&self, ev: Event) -> Result<(), BusClosed> {
        if self.closed.is_cancelled() {
            return Err(BusClosed);
        }
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(BusClosed),
            res = self.tx.send(ev) => res.map_err(|_| BusClosed),
        }
    }

    /// Closes the bus for every holder of a clone.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// True once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled() || self.tx.is_closed()
    }
}

impl BusReceiver {
    /// Receives the next event, or `None` once the bus is closed.
    ///
    /// Close wins over queued events: anything still buffered at close time is dropped.
    pub async fn recv(&mut self) -> Option<Event> {
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => {
                self.rx.close();
                None
            }
            ev = self.rx.recv() => ev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_in_publish_order() {
        let (bus, mut rx) = Bus::new(8);
        for i in 0..3 {
            bus.publish(Event::new("w", format!("e{i}"))).await.unwrap();
        }
        for i in 0..3 {
            assert_eq!(rx.recv().await.unwrap().name, format!("e{i}"));
        }
    }

    #[tokio::test]
    async fn publish_after_close_is_rejected() {
        let (bus, mut rx) = Bus::new(8);
        let other = bus.clone();
        bus.close();

        assert!(other.is_closed());
        assert_eq!(other.publish(Event::new("w", "late")).await, Err(BusClosed));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn close_unblocks_a_full_channel() {
        let (bus, _rx) = Bus::new(1);
        bus.publish(Event::new("w", "fills")).await.unwrap();

        let waiting = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.publish(Event::new("w", "blocked")).await })
        };
        tokio::task::yield_now().await;
        bus.close();

        assert_eq!(waiting.await.unwrap(), Err(BusClosed));
    }
}
