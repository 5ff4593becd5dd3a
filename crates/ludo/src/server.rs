//! `LudoServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → rooms.

use std::net::SocketAddr;
use std::sync::Arc;

use ludo_protocol::JsonCodec;
use ludo_room::RoomManager;
use ludo_transport::{Transport, WebSocketTransport};

use crate::LudoError;
use crate::handler::handle_connection;

/// Address the builder binds to unless told otherwise.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) rooms: RoomManager,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Ludo server.
///
/// # Example
///
/// ```rust,no_run
/// use ludo::prelude::*;
///
/// # async fn start() -> Result<(), LudoError> {
/// let server = LudoServer::builder()
///     .bind("0.0.0.0:3001")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct LudoServerBuilder {
    bind_addr: String,
    seed: Option<u64>,
}

impl LudoServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            seed: None,
        }
    }

    /// Sets the address to bind to. Port `0` picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Seeds room codes and dice so a run can be replayed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Binds the listener and prepares an empty registry.
    pub async fn build(self) -> Result<LudoServer, LudoError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let rooms = match self.seed {
            Some(seed) => RoomManager::with_seed(seed),
            None => RoomManager::new(),
        };
        let state = Arc::new(ServerState {
            rooms,
            codec: JsonCodec,
        });

        Ok(LudoServer { transport, state })
    }
}

impl Default for LudoServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Ludo server. Call [`run()`](Self::run) to start serving.
pub struct LudoServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl LudoServer {
    pub fn builder() -> LudoServerBuilder {
        LudoServerBuilder::new()
    }

    pub fn local_addr(&self) -> Result<SocketAddr, LudoError> {
        Ok(self.transport.local_addr()?)
    }

    /// Accepts connections forever, one handler task per connection.
    ///
    /// A peer that fails its upgrade is logged and skipped.
    pub async fn run(mut self) -> Result<(), LudoError> {
        tracing::info!(addr = %self.local_addr()?, "Ludo server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
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
