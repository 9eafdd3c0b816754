//! State enumeration for the UDP listener.

/// Lifecycle state of the UDP listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ListenerState {
    /// Listener exists but has not been initialized.
    #[default]
    Created,
    /// Dispatch plumbing is wired; the socket is not yet bound.
    Initialized,
    /// Socket is bound and receiving datagrams.
    Listening,
    /// Socket has been closed; a fresh `init` is required to start again.
    Closed,
}

impl std::fmt::Display for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerState::Created => write!(f, "Created"),
            ListenerState::Initialized => write!(f, "Initialized"),
            ListenerState::Listening => write!(f, "Listening"),
            ListenerState::Closed => write!(f, "Closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(ListenerState::Created.to_string(), "Created");
        assert_eq!(ListenerState::Initialized.to_string(), "Initialized");
        assert_eq!(ListenerState::Listening.to_string(), "Listening");
        assert_eq!(ListenerState::Closed.to_string(), "Closed");
    }

    #[test]
    fn test_default_state() {
        assert_eq!(ListenerState::default(), ListenerState::Created);
    }
}
