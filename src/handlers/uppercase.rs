//! Uppercase command handler

use super::{CommandHandler, HandlerContext};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

/// Replies to the sender with the payload converted to uppercase.
pub struct Uppercase;

impl Uppercase {
    /// Create the handler.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Uppercase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for Uppercase {
    fn name(&self) -> &'static str {
        "uppercase"
    }

    async fn handle(&self, ctx: &HandlerContext, payload: &str) -> Result<()> {
        debug!("Got UPPERCASE from {}", ctx.peer);
        let reply = Bytes::from(payload.to_uppercase());
        ctx.sender.send(ctx.peer.port(), ctx.peer.ip(), reply).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_name() {
        assert_eq!(Uppercase::new().name(), "uppercase");
    }
}
