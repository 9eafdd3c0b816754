//! Error types and the process-exit capability.
//!
//! Bind-time socket errors are classified so the operator sees a
//! meaningful message; post-bind transport errors are recoverable and
//! only logged by the receive loop.

use std::io;
use thiserror::Error;
use tracing::error;

/// Exit code used when the listener cannot perform its basic function.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Capability for terminating the process on a fatal error.
///
/// Passed to the listener at construction instead of being reached
/// through any ambient accessor.
pub trait ProcessExit: Send + Sync {
    /// Terminate the process with the given exit code and message.
    fn terminate(&self, code: i32, message: &str) -> !;
}

/// Standard terminator: logs the message and exits the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct FatalExit;

impl ProcessExit for FatalExit {
    fn terminate(&self, code: i32, message: &str) -> ! {
        error!("Fatal: {}", message);
        std::process::exit(code);
    }
}

/// Errors surfaced by the UDP listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// `start`/`stop` called with a name other than the `init`-time name.
    #[error("server '{0}' was not properly initialized")]
    NameMismatch(String),

    #[error("server is already initialized")]
    AlreadyInitialized,

    #[error("server must be initialized before starting")]
    NotInitialized,

    #[error("server is already listening")]
    AlreadyListening,

    #[error("UDP server is not listening")]
    NotListening,

    #[error("no configuration section for server '{0}'")]
    MissingSection(String),

    #[error("could not bind to UDP port")]
    BindPermission(#[source] io::Error),

    #[error("UDP port is already in use")]
    AddrInUse(#[source] io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

/// Classify a bind-time socket error into its fatal message.
pub(crate) fn classify_bind_error(error: io::Error) -> ListenerError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => ListenerError::BindPermission(error),
        io::ErrorKind::AddrInUse => ListenerError::AddrInUse(error),
        _ => ListenerError::Transport(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permission_denied() {
        let error = classify_bind_error(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(error, ListenerError::BindPermission(_)));
        assert_eq!(error.to_string(), "could not bind to UDP port");
    }

    #[test]
    fn test_classify_addr_in_use() {
        let error = classify_bind_error(io::Error::from(io::ErrorKind::AddrInUse));
        assert!(matches!(error, ListenerError::AddrInUse(_)));
        assert_eq!(error.to_string(), "UDP port is already in use");
    }

    #[test]
    fn test_classify_other_errors_as_transport() {
        let error = classify_bind_error(io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(matches!(error, ListenerError::Transport(_)));
    }

    #[test]
    fn test_name_mismatch_message() {
        let error = ListenerError::NameMismatch("tcp".into());
        assert_eq!(
            error.to_string(),
            "server 'tcp' was not properly initialized"
        );
    }
}
