//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;

use crate::application::events::EventPublisher;
use crate::application::images::{ImageHost, ImageStore};
use crate::application::services::{
    AuthService, AuthServiceImpl, MessageService, MessageServiceImpl, NotificationService,
    NotificationServiceImpl, PostService, PostServiceImpl, UserService, UserServiceImpl,
};
use crate::config::{Settings, StoreBackend};
use crate::domain::{
    FollowRepository, MessageRepository, NotificationRepository, PostRepository, UserRepository,
};
use crate::infrastructure::images::{CloudImageHost, DisabledImageHost};
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::pubsub::{
    spawn_subscriber, LocalPublisher, RedisPublisher, SubscriptionStatus,
};
use crate::infrastructure::repositories::{
    PgFollowRepository, PgMessageRepository, PgNotificationRepository, PgPostRepository,
    PgUserRepository,
};
use crate::infrastructure::{cache, database};
use crate::presentation::http::{create_router, handlers::health};
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::Relay;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub posts: Arc<dyn PostService>,
    pub notifications: Arc<dyn NotificationService>,
    pub messages: Arc<dyn MessageService>,
    pub relay: Arc<Relay>,
    pub settings: Arc<Settings>,
    /// Present with the postgres backend
    pub db: Option<PgPool>,
    /// Present when the relay is distributed through Redis
    pub redis: Option<ConnectionManager>,
    /// Liveness of the Redis relay subscription
    pub relay_subscription: Option<SubscriptionStatus>,
}

/// One implementation of every repository trait.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

impl Stores {
    /// All repositories backed by one in-memory store.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            follows: store.clone(),
            posts: store.clone(),
            notifications: store.clone(),
            messages: store,
        }
    }

    /// All repositories backed by PostgreSQL.
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            follows: Arc::new(PgFollowRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pool.clone())),
            messages: Arc::new(PgMessageRepository::new(pool.clone())),
        }
    }
}

impl AppState {
    /// Wire services over the given stores.
    pub fn assemble(
        settings: Arc<Settings>,
        stores: Stores,
        image_host: Arc<dyn ImageHost>,
        relay: Arc<Relay>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let images = ImageStore::new(image_host, settings.images.default_image_url.clone());

        let auth = Arc::new(AuthServiceImpl::new(
            stores.users.clone(),
            stores.follows.clone(),
            settings.jwt.clone(),
            settings.images.default_image_url.clone(),
        ));
        let users = Arc::new(UserServiceImpl::new(
            stores.users.clone(),
            stores.follows.clone(),
            stores.posts.clone(),
            stores.notifications.clone(),
            images.clone(),
        ));
        let posts = Arc::new(PostServiceImpl::new(
            stores.posts.clone(),
            stores.users.clone(),
            stores.follows.clone(),
            stores.notifications.clone(),
            images,
        ));
        let notifications = Arc::new(NotificationServiceImpl::new(
            stores.notifications.clone(),
            stores.users.clone(),
        ));
        let messages = Arc::new(MessageServiceImpl::new(
            stores.messages,
            stores.users,
            publisher,
        ));

        Self {
            auth,
            users,
            posts,
            notifications,
            messages,
            relay,
            settings,
            db: None,
            redis: None,
            relay_subscription: None,
        }
    }

    /// Single-process state over the in-memory store.
    pub fn in_memory(settings: Settings, image_host: Arc<dyn ImageHost>) -> Self {
        let relay = Arc::new(Relay::new());
        let publisher = Arc::new(LocalPublisher::new(relay.clone()));
        Self::assemble(
            Arc::new(settings),
            Stores::memory(),
            image_host,
            relay,
            publisher,
        )
    }
}

/// Image host described by the settings.
fn image_host(settings: &Settings) -> Arc<dyn ImageHost> {
    match CloudImageHost::from_settings(&settings.images) {
        Some(host) => {
            tracing::info!("Image uploads enabled");
            Arc::new(host)
        }
        None => {
            tracing::warn!("No image host configured, uploads are disabled");
            Arc::new(DisabledImageHost)
        }
    }
}

/// Build the full router with middleware. CORS is the outermost layer.
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);
    create_router(state)
        .layer(CompressionLayer::new())
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    subscriber: Option<JoinHandle<()>>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let (stores, db) = match settings.database.backend {
            StoreBackend::Postgres => {
                let pool = database::create_pool(&settings.database)
                    .await
                    .context("Failed to connect to PostgreSQL")?;
                tracing::info!("Database connection pool created");

                if settings.database.run_migrations {
                    database::run_migrations(&pool)
                        .await
                        .context("Failed to run migrations")?;
                    tracing::info!("Database migrations applied");
                }
                (Stores::postgres(&pool), Some(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store, data is lost on restart");
                (Stores::memory(), None)
            }
        };

        let relay = Arc::new(Relay::new());
        let mut redis = None;
        let mut subscription = None;
        let mut subscriber = None;
        let publisher: Arc<dyn EventPublisher> = match &settings.redis.url {
            Some(url) => {
                let (client, conn) = cache::create_redis_client(url)
                    .await
                    .context("Failed to connect to Redis")?;
                let status = SubscriptionStatus::default();
                let handle = spawn_subscriber(
                    client,
                    settings.redis.channel_prefix.clone(),
                    relay.clone(),
                    status.clone(),
                )
                .await
                .context("Failed to subscribe to relay channels")?;
                subscriber = Some(handle);
                subscription = Some(status);
                redis = Some(conn.clone());
                Arc::new(RedisPublisher::new(
                    conn,
                    settings.redis.channel_prefix.clone(),
                ))
            }
            None => {
                tracing::info!("No Redis configured, relay is process-local");
                Arc::new(LocalPublisher::new(relay.clone()))
            }
        };

        let image_host = image_host(&settings);
        let addr = settings
            .server
            .socket_addr()
            .context("Invalid server address")?;

        let mut state = AppState::assemble(
            Arc::new(settings),
            stores,
            image_host,
            relay,
            publisher,
        );
        state.db = db;
        state.redis = redis;
        state.relay_subscription = subscription;

        let router = build_router(state);

        // Bind to address
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self {
            listener,
            router,
            subscriber,
        })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        if let Some(subscriber) = self.subscriber {
            subscriber.abort();
        }
        tracing::info!("Server shut down");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
