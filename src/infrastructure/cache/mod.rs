//! Redis Connection
//!
//! Connection management for the Redis instance that carries relay
//! events between processes.

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

/// Creates a Redis connection manager with automatic reconnection.
///
/// # Returns
/// * `Ok((Client, ConnectionManager))` - The client is kept for opening
///   dedicated pub/sub connections
/// * `Err(redis::RedisError)` - If the URL is invalid or the server unreachable
#[instrument(skip(url))]
pub async fn create_redis_client(url: &str) -> Result<(Client, ConnectionManager), redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(url)?;
    let manager = ConnectionManager::new(client.clone()).await?;
    info!("Redis connection established");
    Ok((client, manager))
}

/// Round-trip a PING through the managed connection.
pub async fn ping(conn: &ConnectionManager) -> Result<(), redis::RedisError> {
    let mut conn = conn.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(())
}
