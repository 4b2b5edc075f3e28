//! Runtime services and shared state for slackline.

use std::net::{IpAddr, SocketAddr};

use tokio::{net::TcpListener, signal};
use tokio_util::task::TaskTracker;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    ingress::{self, IngressState},
    routing::Routing,
    service::chat::ChatClient,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the routing tables, and the chat client.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The routing tables.
    pub routing: Routing,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// Fails if the routing configuration is malformed.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Build the routing tables.
        let routing = Routing::from_config(&config)?;

        // Initialize the slack client.
        let chat = ChatClient::slack(&config)?;

        Ok(Self { config, routing, chat })
    }

    /// Serve the ingress endpoint until interrupted.
    pub async fn start(&self) -> Void {
        let addr = SocketAddr::new(self.config.host.parse::<IpAddr>()?, self.config.port);
        let listener = TcpListener::bind(addr).await?;

        info!("Listening on {} ...", addr);

        let tasks = TaskTracker::new();
        let app = ingress::router(IngressState {
            routing: self.routing.clone(),
            chat: self.chat.clone(),
            tasks: tasks.clone(),
        });

        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        // Let in-flight relays finish their deliveries.
        tasks.close();
        info!("Waiting for {} relays ...", tasks.len());
        tasks.wait().await;

        info!("Shutdown complete.");

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down ..."),
        _ = terminate => info!("Received SIGTERM, shutting down ..."),
    }
}
