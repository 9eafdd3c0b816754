//! UDP module: subscribes discovered command handlers to the listener.

use super::Module;
use crate::registry::HandlerRegistry;
use crate::server::UdpListener;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Registry key prefix under which UDP command handlers are registered.
pub const EVENT_KEY_PREFIX: &str = "udp.events.";

/// Bridges the handler registry and the UDP listener.
///
/// At registration time the registry is queried once for every handler
/// under [`EVENT_KEY_PREFIX`]; each handler is subscribed under its own
/// declared command name. Nothing is re-queried per datagram.
pub struct UdpModule {
    server_name: String,
    registry: Arc<HandlerRegistry>,
}

impl UdpModule {
    /// Create a module that wires handlers to the server with the given
    /// section name.
    pub fn new(server_name: impl Into<String>, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            server_name: server_name.into(),
            registry,
        }
    }
}

#[async_trait]
impl Module for UdpModule {
    fn name(&self) -> &'static str {
        "udp"
    }

    async fn register(&self, server: &UdpListener) -> Result<()> {
        // Not our server; leave it to another module.
        if server.name() != Some(self.server_name.as_str()) {
            return Ok(());
        }

        let handlers = self.registry.query_prefix(EVENT_KEY_PREFIX);
        debug!(
            "Subscribing {} handler(s) to '{}'",
            handlers.len(),
            self.server_name
        );
        for handler in handlers {
            server.subscribe(handler.name(), handler).await;
        }
        Ok(())
    }
}
