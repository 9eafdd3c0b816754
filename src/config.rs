//! Server configuration
//!
//! Typed configuration sections consumed by the listener at start time.
//! Loading these from files or command-line flags is the composition
//! root's concern, not this crate's.

use std::collections::HashMap;

/// Configuration for one listener section.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind address.
    pub host: String,
    /// UDP port to bind. Use 0 for an OS-assigned port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 4000,
        }
    }
}

/// Named configuration sections, one per server instance.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    sections: HashMap<String, ListenerConfig>,
}

impl ServerConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named section.
    pub fn with_section(mut self, name: impl Into<String>, config: ListenerConfig) -> Self {
        self.sections.insert(name.into(), config);
        self
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&ListenerConfig> {
        self.sections.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_config_defaults() {
        let config = ListenerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 4000);
    }

    #[test]
    fn test_section_lookup() {
        let config = ServerConfig::new().with_section(
            "udp",
            ListenerConfig {
                host: "0.0.0.0".into(),
                port: 5000,
            },
        );

        let section = config.section("udp").unwrap();
        assert_eq!(section.host, "0.0.0.0");
        assert_eq!(section.port, 5000);
        assert!(config.section("tcp").is_none());
    }

    #[test]
    fn test_with_section_replaces() {
        let config = ServerConfig::new()
            .with_section("udp", ListenerConfig::default())
            .with_section(
                "udp",
                ListenerConfig {
                    port: 6000,
                    ..Default::default()
                },
            );

        assert_eq!(config.section("udp").unwrap().port, 6000);
    }
}
