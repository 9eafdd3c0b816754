//! Typed registry of command handlers.
//!
//! Handlers are registered under stable string keys at composition time
//! and looked up once per startup, never per datagram. Registration
//! order is preserved so queries return handlers deterministically.

use crate::handlers::CommandHandler;
use std::sync::Arc;

/// Insertion-ordered registry mapping stable keys to command handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: Vec<(String, Arc<dyn CommandHandler>)>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a stable key.
    ///
    /// Re-registering an existing key replaces the handler in place,
    /// keeping its original position in the order.
    pub fn register(&mut self, key: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            entry.1 = handler;
        } else {
            self.entries.push((key, handler));
        }
    }

    /// Look up a handler by exact key.
    pub fn lookup(&self, key: &str) -> Option<Arc<dyn CommandHandler>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, handler)| handler.clone())
    }

    /// All handlers whose key satisfies the predicate, in registration order.
    pub fn query<F>(&self, predicate: F) -> Vec<Arc<dyn CommandHandler>>
    where
        F: Fn(&str) -> bool,
    {
        self.entries
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(_, handler)| handler.clone())
            .collect()
    }

    /// All handlers registered under keys starting with the prefix.
    pub fn query_prefix(&self, prefix: &str) -> Vec<Arc<dyn CommandHandler>> {
        self.query(|key| key.starts_with(prefix))
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no handlers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
