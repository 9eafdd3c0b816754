//! Registration modules
//!
//! A module is the composition step that attaches independently defined
//! command handlers to a server at startup. The listener iterates its
//! module list in a fixed order during `start`, awaiting each
//! registration before the next begins and before the socket binds.

mod udp;

pub use udp::{UdpModule, EVENT_KEY_PREFIX};

use crate::server::UdpListener;
use anyhow::Result;
use async_trait::async_trait;

/// A composition-time module that can attach itself to a server.
#[async_trait]
pub trait Module: Send + Sync {
    /// Module name, used in registration logs and errors.
    fn name(&self) -> &'static str;

    /// Attach to the given server.
    ///
    /// A module is free to no-op when the server is not one it serves,
    /// e.g. when the server's section name belongs to another transport.
    async fn register(&self, server: &UdpListener) -> Result<()>;
}
