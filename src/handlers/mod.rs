//! Command handlers for datagram commands
//!
//! Each handler declares the command token it reacts to and an async
//! action that may reply to the sender. Handlers are discovered through
//! the registry at startup; adding a command means adding a handler,
//! with no changes to the listener or the registration module.

mod uppercase;

pub use uppercase::Uppercase;

use crate::server::ReplySender;
use anyhow::Result;
use async_trait::async_trait;
use std::net::SocketAddr;

/// Context passed to command handlers
#[derive(Clone)]
pub struct HandlerContext {
    /// Address and port the datagram came from.
    pub peer: SocketAddr,
    /// Reply capability bound to the listener's socket.
    pub sender: ReplySender,
}

/// A handler for a single datagram command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command token this handler reacts to.
    fn name(&self) -> &'static str;

    /// React to one datagram carrying this handler's command.
    ///
    /// Errors are logged by the dispatcher with the handler's name and
    /// never reach the receive loop or other handlers.
    async fn handle(&self, ctx: &HandlerContext, payload: &str) -> Result<()>;
}
