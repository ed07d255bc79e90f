//! `CardwireServer` builder and accept loop.
//!
//! This is the entry point for running a Cardwire relay. It ties the
//! layers together: transport → protocol → router → room services.

use std::sync::Arc;

use cardwire_protocol::JsonCodec;
use cardwire_room::{
    DeckProvider, EventBroadcaster, MatchmakingService, RoomRegistry,
};
use cardwire_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::router::Router;
use crate::CardwireError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it clones cheaply across tasks. The registry
/// mutex inside is the single serialization point for all room
/// mutations; both services hold a handle to it.
pub(crate) struct GatewayState<D: DeckProvider> {
    pub(crate) registry: Arc<Mutex<RoomRegistry<D>>>,
    pub(crate) matchmaking: MatchmakingService<D>,
    pub(crate) broadcaster: EventBroadcaster<D>,
    pub(crate) codec: JsonCodec,
    pub(crate) router: Router<D>,
}

/// Builder for configuring and starting a Cardwire server.
///
/// # Example
///
/// ```rust,ignore
/// let server = CardwireServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(MyDeckProvider)
///     .await?;
/// server.run().await
/// ```
pub struct CardwireServerBuilder {
    bind_addr: String,
}

impl CardwireServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Builds and starts the server with the given deck provider.
    pub async fn build<D: DeckProvider>(
        self,
        provider: D,
    ) -> Result<CardwireServer<D>, CardwireError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let registry = Arc::new(Mutex::new(RoomRegistry::new(provider)));
        let state = Arc::new(GatewayState {
            matchmaking: MatchmakingService::new(Arc::clone(&registry)),
            broadcaster: EventBroadcaster::new(Arc::clone(&registry)),
            registry,
            codec: JsonCodec,
            router: Router::new(),
        });

        Ok(CardwireServer { transport, state })
    }
}

impl Default for CardwireServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Cardwire relay.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CardwireServer<D: DeckProvider> {
    transport: WebSocketTransport,
    state: Arc<GatewayState<D>>,
}

impl<D: DeckProvider> CardwireServer<D> {
    /// Creates a new builder.
    pub fn builder() -> CardwireServerBuilder {
        CardwireServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), CardwireError> {
        tracing::info!("Cardwire relay running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
