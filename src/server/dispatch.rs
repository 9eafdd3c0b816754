//! Datagram parsing and the command dispatch table.
//!
//! The table is an explicit mapping from command token to the handlers
//! subscribed under it, built during the registration phase and
//! inspectable afterwards.

use crate::handlers::CommandHandler;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// A datagram body parsed into its command token and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// First whitespace-delimited token, case-sensitive.
    pub command: String,
    /// Remaining tokens rejoined with single spaces.
    pub payload: String,
}

/// Parse a datagram body into a command and payload.
///
/// Empty and whitespace-only datagrams produce no command. The body is
/// decoded as UTF-8 with invalid sequences replaced.
pub fn parse_datagram(data: &[u8]) -> Option<ParsedCommand> {
    if data.is_empty() {
        return None;
    }

    let text = String::from_utf8_lossy(data);
    let mut tokens = text.split_whitespace();
    let command = tokens.next()?.to_string();
    let payload = tokens.collect::<Vec<_>>().join(" ");

    Some(ParsedCommand { command, payload })
}

/// Mapping from command token to the handlers subscribed under it.
///
/// Several handlers may subscribe to the same command; dispatch fans out
/// to all of them in subscription order.
#[derive(Default)]
pub struct DispatchTable {
    entries: HashMap<String, Vec<Arc<dyn CommandHandler>>>,
}

impl DispatchTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler under a command token.
    pub fn subscribe(&mut self, command: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        let command = command.into();
        let handlers = self.entries.entry(command.clone()).or_default();
        if !handlers.is_empty() {
            warn!(
                "Command '{}' already has {} subscriber(s); fanning out to all",
                command,
                handlers.len()
            );
        }
        handlers.push(handler);
    }

    /// Handlers subscribed under a command token, in subscription order.
    pub fn handlers_for(&self, command: &str) -> &[Arc<dyn CommandHandler>] {
        self.entries.get(command).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Subscribed command tokens.
    pub fn commands(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Whether no handler is subscribed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerContext;
    use anyhow::Result;
    use async_trait::async_trait;

    struct NullHandler(&'static str);

    #[async_trait]
    impl CommandHandler for NullHandler {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn handle(&self, _ctx: &HandlerContext, _payload: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_empty_datagram() {
        assert_eq!(parse_datagram(b""), None);
    }

    #[test]
    fn test_parse_whitespace_only_datagram() {
        assert_eq!(parse_datagram(b"   \t  "), None);
    }

    #[test]
    fn test_parse_command_without_payload() {
        let parsed = parse_datagram(b"uppercase").unwrap();
        assert_eq!(parsed.command, "uppercase");
        assert_eq!(parsed.payload, "");
    }

    #[test]
    fn test_parse_command_with_payload() {
        let parsed = parse_datagram(b"uppercase hello world").unwrap();
        assert_eq!(parsed.command, "uppercase");
        assert_eq!(parsed.payload, "hello world");
    }

    #[test]
    fn test_parse_rejoins_with_single_spaces() {
        let parsed = parse_datagram(b"uppercase   hello\t world ").unwrap();
        assert_eq!(parsed.command, "uppercase");
        assert_eq!(parsed.payload, "hello world");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let parsed = parse_datagram(b"UPPERCASE x").unwrap();
        assert_eq!(parsed.command, "UPPERCASE");
    }

    #[test]
    fn test_parse_invalid_utf8_is_replaced() {
        let parsed = parse_datagram(&[0x75, 0x70, 0xff, 0x20, 0x78]).unwrap();
        assert_eq!(parsed.payload, "x");
    }

    #[test]
    fn test_handlers_for_unknown_command_is_empty() {
        let table = DispatchTable::new();
        assert!(table.handlers_for("uppercase").is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_subscribe_and_fan_out_order() {
        let mut table = DispatchTable::new();
        table.subscribe("greet", Arc::new(NullHandler("first")));
        table.subscribe("greet", Arc::new(NullHandler("second")));
        table.subscribe("other", Arc::new(NullHandler("third")));

        let names: Vec<_> = table
            .handlers_for("greet")
            .iter()
            .map(|h| h.name())
            .collect();
        assert_eq!(names, vec!["first", "second"]);

        let mut commands = table.commands();
        commands.sort();
        assert_eq!(commands, vec!["greet", "other"]);
    }
}
