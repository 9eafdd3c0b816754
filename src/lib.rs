//! dispatchd: a UDP command dispatch server.
//!
//! The listener binds a UDP socket, parses each datagram as a
//! whitespace-delimited command, and fans the command out to handlers
//! discovered through a typed registry at startup. New commands are
//! added by registering another handler; the listener and the
//! registration module need no changes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod modules;
pub mod registry;
pub mod server;
