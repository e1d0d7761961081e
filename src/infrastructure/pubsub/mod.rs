//! Relay Publishers
//!
//! Two ways of fanning relay events out to user topics:
//!
//! - [`LocalPublisher`] hands events straight to the in-process sink.
//!   Used when no Redis URL is configured.
//! - [`RedisPublisher`] publishes to `{prefix}{user_id}` channels; a
//!   subscriber task started with [`spawn_subscriber`] in every process
//!   feeds matching events back into that process's sink. The task
//!   resubscribes with backoff when the pub/sub connection drops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::{ConnectionManager, PubSub};
use redis::AsyncCommands;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::events::{EventPublisher, EventSink, RelayEvent};
use crate::infrastructure::metrics;

/// Record the local fan-out of one event.
fn deliver_locally(sink: &dyn EventSink, topic: Uuid, event: &RelayEvent) {
    let delivered = sink.deliver(topic, event);
    if delivered == 0 {
        debug!(%topic, event = event.name(), "No subscriber for topic, event dropped");
        metrics::record_relay_event(event.name(), "dropped");
    } else {
        metrics::record_relay_event(event.name(), "delivered");
    }
}

/// Single-process publisher.
#[derive(Clone)]
pub struct LocalPublisher {
    sink: Arc<dyn EventSink>,
}

impl LocalPublisher {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl EventPublisher for LocalPublisher {
    async fn publish(&self, topic: Uuid, event: RelayEvent) {
        metrics::record_relay_event(event.name(), "published");
        deliver_locally(self.sink.as_ref(), topic, &event);
    }
}

/// Publisher backed by Redis pub/sub.
#[derive(Clone)]
pub struct RedisPublisher {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisPublisher {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    fn channel(&self, topic: Uuid) -> String {
        channel_name(&self.prefix, topic)
    }
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish(&self, topic: Uuid, event: RelayEvent) {
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, event = event.name(), "Failed to encode relay event");
                metrics::record_relay_event(event.name(), "failed");
                return;
            }
        };

        let mut conn = self.conn.clone();
        let result: redis::RedisResult<i64> = conn.publish(self.channel(topic), payload).await;
        match result {
            Ok(_) => metrics::record_relay_event(event.name(), "published"),
            Err(e) => {
                warn!(error = %e, %topic, event = event.name(), "Failed to publish relay event");
                metrics::record_relay_event(event.name(), "failed");
            }
        }
    }
}

/// Channel carrying the events of one user.
pub fn channel_name(prefix: &str, topic: Uuid) -> String {
    format!("{prefix}{topic}")
}

/// Parse the user id back out of a channel name.
pub fn topic_from_channel(prefix: &str, channel: &str) -> Option<Uuid> {
    channel
        .strip_prefix(prefix)
        .and_then(|rest| Uuid::parse_str(rest).ok())
}

const RESUBSCRIBE_INITIAL_DELAY: Duration = Duration::from_millis(500);
const RESUBSCRIBE_MAX_DELAY: Duration = Duration::from_secs(30);

/// Whether the relay subscription is currently receiving events.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionStatus(Arc<AtomicBool>);

impl SubscriptionStatus {
    pub fn is_live(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn set_live(&self, live: bool) {
        self.0.store(live, Ordering::Relaxed);
    }
}

/// Doubles the wait between resubscribe attempts, up to the cap.
fn next_delay(current: Duration) -> Duration {
    (current * 2).min(RESUBSCRIBE_MAX_DELAY)
}

async fn subscribe(client: &redis::Client, pattern: &str) -> Result<PubSub, redis::RedisError> {
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.psubscribe(pattern).await?;
    info!(%pattern, "Subscribed to relay channels");
    Ok(pubsub)
}

/// Forward events until the pub/sub connection closes.
async fn forward(pubsub: &mut PubSub, prefix: &str, sink: &dyn EventSink) {
    let mut messages = pubsub.on_message();
    while let Some(msg) = messages.next().await {
        let channel = msg.get_channel_name().to_string();
        let Some(topic) = topic_from_channel(prefix, &channel) else {
            warn!(%channel, "Ignoring relay message on unexpected channel");
            continue;
        };

        let payload: String = match msg.get_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, %channel, "Unreadable relay payload");
                continue;
            }
        };

        match serde_json::from_str::<RelayEvent>(&payload) {
            Ok(event) => deliver_locally(sink, topic, &event),
            Err(e) => warn!(error = %e, %channel, "Malformed relay event"),
        }
    }
}

/// Subscribe to every user channel and forward events into `sink`.
///
/// The first subscription must succeed. After that the task keeps
/// resubscribing whenever the connection drops, and `status` tracks
/// whether it is currently live.
pub async fn spawn_subscriber(
    client: redis::Client,
    prefix: String,
    sink: Arc<dyn EventSink>,
    status: SubscriptionStatus,
) -> Result<JoinHandle<()>, redis::RedisError> {
    let pattern = format!("{prefix}*");
    let mut pubsub = subscribe(&client, &pattern).await?;
    status.set_live(true);

    let handle = tokio::spawn(async move {
        loop {
            forward(&mut pubsub, &prefix, sink.as_ref()).await;
            status.set_live(false);
            warn!("Relay subscription closed, resubscribing");

            let mut delay = RESUBSCRIBE_INITIAL_DELAY;
            pubsub = loop {
                tokio::time::sleep(delay).await;
                match subscribe(&client, &pattern).await {
                    Ok(pubsub) => break pubsub,
                    Err(e) => {
                        delay = next_delay(delay);
                        warn!(error = %e, retry_in_ms = delay.as_millis() as u64, "Resubscribe failed");
                    }
                }
            };
            status.set_live(true);
        }
    });

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CollectingSink {
        seen: Mutex<Vec<(Uuid, RelayEvent)>>,
        subscribers: usize,
    }

    impl EventSink for CollectingSink {
        fn deliver(&self, topic: Uuid, event: &RelayEvent) -> usize {
            self.seen.lock().push((topic, event.clone()));
            self.subscribers
        }
    }

    #[test]
    fn test_resubscribe_delay_doubles_up_to_cap() {
        assert_eq!(next_delay(Duration::from_millis(500)), Duration::from_secs(1));
        assert_eq!(next_delay(Duration::from_secs(20)), RESUBSCRIBE_MAX_DELAY);
        assert_eq!(next_delay(RESUBSCRIBE_MAX_DELAY), RESUBSCRIBE_MAX_DELAY);
    }

    #[test]
    fn test_subscription_status_is_shared() {
        let status = SubscriptionStatus::default();
        let observer = status.clone();
        assert!(!observer.is_live());

        status.set_live(true);
        assert!(observer.is_live());

        status.set_live(false);
        assert!(!observer.is_live());
    }

    #[test]
    fn test_channel_round_trip() {
        let topic = Uuid::new_v4();
        let channel = channel_name("relay:user:", topic);

        assert_eq!(topic_from_channel("relay:user:", &channel), Some(topic));
        assert_eq!(topic_from_channel("other:", &channel), None);
        assert_eq!(topic_from_channel("relay:user:", "relay:user:nope"), None);
    }

    #[tokio::test]
    async fn test_local_publisher_delivers_to_sink() {
        let sink = Arc::new(CollectingSink {
            subscribers: 1,
            ..Default::default()
        });
        let publisher = LocalPublisher::new(sink.clone());
        let topic = Uuid::new_v4();
        let event = RelayEvent::MessagesRead {
            reader: Uuid::new_v4(),
        };

        publisher.publish(topic, event.clone()).await;

        assert_eq!(sink.seen.lock().as_slice(), &[(topic, event)]);
    }

    #[tokio::test]
    async fn test_local_publisher_without_subscribers_is_silent() {
        let sink = Arc::new(CollectingSink::default());
        let publisher = LocalPublisher::new(sink.clone());

        publisher
            .publish(
                Uuid::new_v4(),
                RelayEvent::MessagesRead {
                    reader: Uuid::new_v4(),
                },
            )
            .await;

        assert_eq!(sink.seen.lock().len(), 1);
    }
}
