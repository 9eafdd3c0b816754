//! UDP server
//!
//! This module handles:
//! - Socket lifecycle (init, start, stop) with fatal-error classification
//! - Parsing datagrams into command token and payload
//! - Fanning each command out to its subscribed handlers

mod dispatch;
mod state;
mod udp;

pub use dispatch::{parse_datagram, DispatchTable, ParsedCommand};
pub use state::ListenerState;
pub use udp::{ReplySender, UdpListener};
