//! Ordered fire-and-forget message bus
//!
//! Publishing never waits for or hears back from consumers. Every subscriber
//! sees envelopes in publish order; a subscriber that falls behind loses the
//! oldest envelopes and is told how many.

use crate::error::ProtocolError;
use crate::protocol::{Envelope, Message};
use tokio::sync::broadcast;

/// Channel transport between the rendering context and its consumers
pub trait MessageBus: Send + Sync + std::fmt::Debug {
    /// Publish a raw envelope
    fn publish(&self, envelope: Envelope);

    /// Open a new subscription that sees every later envelope
    fn subscribe(&self) -> Subscription;

    /// Encode and publish a typed message
    ///
    /// # Errors
    /// `ProtocolError::MalformedPayload` if encoding fails; nothing is sent
    fn send(&self, message: &Message) -> Result<(), ProtocolError> {
        self.publish(message.encode()?);
        Ok(())
    }
}

/// In-process bus backed by `tokio::sync::broadcast`
#[derive(Debug, Clone)]
pub struct ChannelBus {
    tx: broadcast::Sender<Envelope>,
}

impl ChannelBus {
    /// Bus retaining up to `capacity` undelivered envelopes per subscriber
    #[inline]
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Current number of live subscriptions
    #[inline]
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChannelBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl MessageBus for ChannelBus {
    fn publish(&self, envelope: Envelope) {
        let event = envelope.event.clone();
        if self.tx.send(envelope).is_err() {
            tracing::trace!(%event, "published with no subscribers");
        }
    }

    fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving end of a [`MessageBus`]
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<Envelope>,
}

impl Subscription {
    /// Wait for the next envelope; `None` once the bus is gone
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged; oldest messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-delivered envelope, without waiting
    pub fn try_next(&mut self) -> Option<Envelope> {
        loop {
            match self.rx.try_recv() {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged; oldest messages dropped");
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }

    /// Drain everything currently queued, in order
    pub fn drain(&mut self) -> Vec<Envelope> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{HighlightRemoval, HIGHLIGHT_REMOVE_EVENT};

    fn removal(id: &str) -> Message {
        Message::HighlightRemove(HighlightRemoval { id: id.into() })
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = ChannelBus::new(4);
        assert!(bus.send(&removal("a")).is_ok());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn subscribers_see_messages_in_order() {
        let bus = ChannelBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        for id in ["a", "b", "c"] {
            bus.send(&removal(id)).unwrap();
        }

        for sub in [&mut first, &mut second] {
            let ids: Vec<_> = sub
                .drain()
                .into_iter()
                .map(|e| e.payload["id"].as_str().unwrap().to_string())
                .collect();
            assert_eq!(ids, ["a", "b", "c"]);
        }
    }

    #[test]
    fn lagging_subscriber_keeps_newest() {
        let bus = ChannelBus::new(2);
        let mut sub = bus.subscribe();
        for id in ["a", "b", "c", "d"] {
            bus.send(&removal(id)).unwrap();
        }
        let drained = sub.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].payload["id"], "d");
        assert_eq!(drained[0].event, HIGHLIGHT_REMOVE_EVENT);
    }

    #[tokio::test]
    async fn recv_ends_when_bus_dropped() {
        let bus = ChannelBus::new(2);
        let mut sub = bus.subscribe();
        bus.send(&removal("x")).unwrap();
        drop(bus);
        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_none());
    }
}
