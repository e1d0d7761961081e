//! WebSocket Session Management

use std::time::Instant;

use uuid::Uuid;

/// State of one relay connection
#[derive(Debug)]
pub struct SessionState {
    pub connection_id: Uuid,
    pub user_id: Uuid,
    pub sequence: u64,
    pub connected_at: Instant,
}

impl SessionState {
    pub fn new(connection_id: Uuid, user_id: Uuid) -> Self {
        Self {
            connection_id,
            user_id,
            sequence: 0,
            connected_at: Instant::now(),
        }
    }

    /// Stamp for the next outbound frame. Starts at 1.
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}
