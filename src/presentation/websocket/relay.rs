//! Relay Hub
//!
//! Tracks open sockets by user and hands topic events to each of them.
//! A user may hold several connections; every one of them receives the
//! events of the user's topic.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::ServerEvent;
use crate::application::events::{EventSink, RelayEvent};
use crate::infrastructure::metrics;

/// An open socket subscribed to its user's topic
#[derive(Debug)]
struct Connection {
    user_id: Uuid,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Subscriber registry for the sockets of this process
#[derive(Debug, Default)]
pub struct Relay {
    /// Connection id -> connection
    connections: DashMap<Uuid, Connection>,
    /// User id (topic) -> connection ids
    topics: DashMap<Uuid, Vec<Uuid>>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a socket to the topic of `user_id`. Returns its connection id.
    pub fn subscribe(&self, user_id: Uuid, sender: mpsc::UnboundedSender<ServerEvent>) -> Uuid {
        let connection_id = Uuid::new_v4();
        self.connections
            .insert(connection_id, Connection { user_id, sender });
        self.topics.entry(user_id).or_default().push(connection_id);

        metrics::set_relay_connections(self.connections.len());
        tracing::info!(
            user_id = %user_id,
            connection_id = %connection_id,
            "Relay connection subscribed"
        );
        connection_id
    }

    /// Drop a socket from its topic.
    pub fn unsubscribe(&self, connection_id: Uuid) {
        let Some((_, connection)) = self.connections.remove(&connection_id) else {
            return;
        };

        if let Some(mut ids) = self.topics.get_mut(&connection.user_id) {
            ids.retain(|id| *id != connection_id);
        }
        self.topics
            .remove_if(&connection.user_id, |_, ids| ids.is_empty());

        metrics::set_relay_connections(self.connections.len());
        tracing::info!(
            user_id = %connection.user_id,
            connection_id = %connection_id,
            "Relay connection unsubscribed"
        );
    }

    /// Queue an event on every socket subscribed to `topic`.
    pub fn send_to_topic(&self, topic: Uuid, event: &ServerEvent) -> usize {
        let Some(ids) = self.topics.get(&topic) else {
            return 0;
        };

        ids.iter()
            .filter_map(|id| self.connections.get(id))
            .filter(|connection| connection.sender.send(event.clone()).is_ok())
            .count()
    }

    /// Number of open sockets.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Whether `user_id` has at least one open socket.
    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.topics
            .get(&user_id)
            .map(|ids| !ids.is_empty())
            .unwrap_or(false)
    }
}

impl EventSink for Relay {
    fn deliver(&self, topic: Uuid, event: &RelayEvent) -> usize {
        self.send_to_topic(topic, &ServerEvent::from(event.clone()))
    }
}
