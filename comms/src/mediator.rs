use std::collections::HashMap;

use log::debug;
use parking_lot::RwLock;
use tokio::sync::broadcast;

/// Informational receipt returned on subscription.
///
/// Carries no delivery guarantee; consumers treat it as log material only.
#[derive(Debug, Clone)]
pub struct SubscribeAck {
    topic: String,
    subscribers: usize,
}

impl SubscribeAck {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Subscriber count on the topic at the time of subscription, this
    /// subscription included.
    pub fn subscribers(&self) -> usize {
        self.subscribers
    }
}

/// Topic-addressed pub/sub fabric for in-process broadcasts.
///
/// Delivery is best-effort: publishing never blocks or awaits receivers, a
/// topic without subscribers swallows the message, and a subscriber that
/// lags beyond the channel capacity loses the oldest messages.
pub struct Mediator<T> {
    topics: RwLock<HashMap<String, broadcast::Sender<T>>>,
    capacity: usize,
}

impl<T: Clone> Mediator<T> {
    /// Creates a new mediator.
    ///
    /// # Arguments
    /// * `capacity` - Per-topic buffer size before slow subscribers lag.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Registers a subscriber on `topic`, creating the topic if needed.
    pub fn subscribe(&self, topic: &str) -> (broadcast::Receiver<T>, SubscribeAck) {
        let mut topics = self.topics.write();
        let sender = topics
            .entry(topic.to_owned())
            .or_insert_with(|| broadcast::channel(self.capacity).0);

        let rx = sender.subscribe();
        let ack = SubscribeAck {
            topic: topic.to_owned(),
            subscribers: sender.receiver_count(),
        };

        (rx, ack)
    }

    /// Publishes `msg` to every current subscriber of `topic`, fire-and-forget.
    ///
    /// # Returns
    /// The number of subscribers the message was handed to. Zero means the
    /// message went nowhere, which is not an error.
    pub fn publish(&self, topic: &str, msg: T) -> usize {
        let topics = self.topics.read();
        let Some(sender) = topics.get(topic) else {
            debug!(topic = topic; "publish on unknown topic dropped");
            return 0;
        };

        match sender.send(msg) {
            Ok(delivered) => delivered,
            Err(_) => {
                debug!(topic = topic; "publish without subscribers dropped");
                0
            }
        }
    }

    /// Current subscriber count on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .get(topic)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let mediator = Mediator::new(8);
        let (mut rx1, ack1) = mediator.subscribe("updates");
        let (mut rx2, ack2) = mediator.subscribe("updates");

        assert_eq!(ack1.subscribers(), 1);
        assert_eq!(ack2.subscribers(), 2);
        assert_eq!(ack2.topic(), "updates");

        assert_eq!(mediator.publish("updates", 17u32), 2);
        assert_eq!(rx1.recv().await.unwrap(), 17);
        assert_eq!(rx2.recv().await.unwrap(), 17);
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let mediator = Mediator::<u32>::new(8);
        assert_eq!(mediator.publish("nowhere", 1), 0);

        let (rx, _) = mediator.subscribe("somewhere");
        drop(rx);
        assert_eq!(mediator.publish("somewhere", 1), 0);
    }

    #[test]
    fn topics_are_isolated() {
        let mediator = Mediator::new(8);
        let (mut rx, _) = mediator.subscribe("a");
        mediator.publish("b", 5u32);
        assert!(rx.try_recv().is_err());
    }
}
