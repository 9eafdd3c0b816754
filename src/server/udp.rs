//! UDP listener with pluggable command dispatch.
//!
//! The listener owns the socket lifecycle. `start` runs in two strictly
//! sequential phases: every registration module attaches its handlers
//! first, one at a time in composition order, and only then does the
//! socket bind and begin receiving. Stopping closes the socket and waits
//! for the receive task's close confirmation.

use crate::config::ServerConfig;
use crate::error::{classify_bind_error, ListenerError, ProcessExit, FATAL_EXIT_CODE};
use crate::handlers::{CommandHandler, HandlerContext};
use crate::modules::Module;
use crate::server::dispatch::{parse_datagram, DispatchTable};
use crate::server::state::ListenerState;
use anyhow::Context;
use bytes::Bytes;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Receive buffer size, large enough for any single UDP datagram.
const RECV_BUFFER_SIZE: usize = 65535;

/// Reply capability bound to the listener's socket.
///
/// Handed to command handlers per dispatch so they can answer the sender
/// without holding a reference to the listener itself. The handle cannot
/// rebind or close the socket.
#[derive(Clone)]
pub struct ReplySender {
    socket: Arc<UdpSocket>,
}

impl ReplySender {
    fn new(socket: Arc<UdpSocket>) -> Self {
        Self { socket }
    }

    /// Send one datagram to the given address and port; resolves once the
    /// underlying send completes.
    pub async fn send(&self, port: u16, host: IpAddr, data: Bytes) -> Result<(), ListenerError> {
        self.socket
            .send_to(&data, SocketAddr::new(host, port))
            .await?;
        Ok(())
    }
}

/// UDP command server.
pub struct UdpListener {
    config: ServerConfig,
    /// Registration runs over this list in order; the order is fixed at
    /// composition time.
    modules: Vec<Arc<dyn Module>>,
    exit: Arc<dyn ProcessExit>,
    name: Option<String>,
    state: ListenerState,
    dispatch: Arc<RwLock<DispatchTable>>,
    socket: RwLock<Option<Arc<UdpSocket>>>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    recv_task: Option<JoinHandle<()>>,
}

impl UdpListener {
    /// Create a listener over the given configuration, module order, and
    /// process-exit capability.
    pub fn new(
        config: ServerConfig,
        modules: Vec<Arc<dyn Module>>,
        exit: Arc<dyn ProcessExit>,
    ) -> Self {
        Self {
            config,
            modules,
            exit,
            name: None,
            state: ListenerState::Created,
            dispatch: Arc::new(RwLock::new(DispatchTable::new())),
            socket: RwLock::new(None),
            local_addr: None,
            shutdown_tx: None,
            recv_task: None,
        }
    }

    /// Config section name fixed at `init`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Whether the socket is currently bound and receiving.
    pub fn is_listening(&self) -> bool {
        self.state == ListenerState::Listening
    }

    /// Bound address, available while listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Initialize the listener for the given config section.
    ///
    /// Fixes the name that `start` and `stop` must be called with and
    /// wires a fresh dispatch table.
    pub async fn init(&mut self, name: &str) -> Result<(), ListenerError> {
        match self.state {
            ListenerState::Created | ListenerState::Closed => {}
            _ => return Err(ListenerError::AlreadyInitialized),
        }

        self.name = Some(name.to_string());
        self.dispatch = Arc::new(RwLock::new(DispatchTable::new()));
        self.local_addr = None;
        self.state = ListenerState::Initialized;
        Ok(())
    }

    /// Start the listener.
    ///
    /// Runs every module's registration to completion, strictly in order,
    /// then binds the socket and begins receiving. A name mismatch or a
    /// second `start` without an intervening `stop`/`init` is returned to
    /// the caller as a contract violation; registration and bind failures
    /// are fatal and terminate the process.
    pub async fn start(&mut self, name: &str) -> Result<(), ListenerError> {
        if self.name.as_deref() != Some(name) {
            return Err(ListenerError::NameMismatch(name.to_string()));
        }
        match self.state {
            ListenerState::Initialized => {}
            ListenerState::Listening => return Err(ListenerError::AlreadyListening),
            _ => return Err(ListenerError::NotInitialized),
        }

        // Without a bound socket the process cannot perform its function.
        if let Err(error) = self.start_inner(name).await {
            self.exit.terminate(FATAL_EXIT_CODE, &format!("{:#}", error));
        }
        Ok(())
    }

    async fn start_inner(&mut self, name: &str) -> anyhow::Result<()> {
        // Phase one: each module registers to completion before the next
        // begins; later modules may depend on earlier ones.
        let modules = self.modules.clone();
        for module in &modules {
            debug!("Registering module '{}'", module.name());
            module
                .register(self)
                .await
                .with_context(|| format!("module '{}' failed to register", module.name()))?;
        }

        debug!("Starting the server");

        // Phase two: bind only after every registration has completed.
        let section = self
            .config
            .section(name)
            .ok_or_else(|| ListenerError::MissingSection(name.to_string()))?
            .clone();
        let socket = match UdpSocket::bind((section.host.as_str(), section.port)).await {
            Ok(socket) => Arc::new(socket),
            Err(error) => return Err(classify_bind_error(error).into()),
        };
        let local_addr = socket.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let recv_task = tokio::spawn(recv_loop(socket.clone(), self.dispatch.clone(), shutdown_rx));

        *self.socket.write().await = Some(socket);
        self.local_addr = Some(local_addr);
        self.shutdown_tx = Some(shutdown_tx);
        self.recv_task = Some(recv_task);
        self.state = ListenerState::Listening;
        info!("UDP server is listening on {}", local_addr);
        Ok(())
    }

    /// Stop the listener.
    ///
    /// Closes the socket and waits for the receive task to confirm. A
    /// no-op when the listener is not listening, so stopping twice is
    /// safe.
    pub async fn stop(&mut self, name: &str) -> Result<(), ListenerError> {
        if self.name.as_deref() != Some(name) {
            return Err(ListenerError::NameMismatch(name.to_string()));
        }
        if self.state != ListenerState::Listening {
            return Ok(());
        }

        debug!("Stopping the server");
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        // Close confirmation: the receive task ends once it observes the
        // shutdown signal.
        if let Some(recv_task) = self.recv_task.take() {
            if let Err(error) = recv_task.await {
                self.exit
                    .terminate(FATAL_EXIT_CODE, &format!("UDP receive task failed: {}", error));
            }
        }

        *self.socket.write().await = None;
        self.local_addr = None;
        self.state = ListenerState::Closed;
        info!("UDP server is no longer listening");
        Ok(())
    }

    /// Send one datagram of exactly `data` to `host:port` using the owned
    /// socket.
    pub async fn send(&self, port: u16, host: &str, data: Bytes) -> Result<(), ListenerError> {
        let socket = self.socket.read().await.clone();
        match socket {
            Some(socket) => {
                socket.send_to(&data, (host, port)).await?;
                Ok(())
            }
            None => Err(ListenerError::NotListening),
        }
    }

    /// Subscribe a handler under a command token.
    ///
    /// Called by modules during the registration phase of `start`.
    /// Handlers subscribed under the same token all fire on a match.
    pub async fn subscribe(&self, command: &str, handler: Arc<dyn CommandHandler>) {
        self.dispatch.write().await.subscribe(command, handler);
    }

    /// Command tokens currently subscribed, for inspection.
    pub async fn subscribed_commands(&self) -> Vec<String> {
        self.dispatch.read().await.commands()
    }
}

/// Socket receive loop; runs until the shutdown signal fires.
async fn recv_loop(
    socket: Arc<UdpSocket>,
    dispatch: Arc<RwLock<DispatchTable>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            result = socket.recv_from(&mut buf) => match result {
                Ok((len, peer)) => {
                    debug!("Got message from {}", peer);
                    dispatch_datagram(&buf[..len], peer, &socket, &dispatch).await;
                }
                // Transport errors after the bind are recoverable; keep
                // serving subsequent traffic.
                Err(error) => error!("UDP receive error: {}", error),
            },
        }
    }
}

/// Parse one datagram and fan it out to the subscribed handlers.
///
/// Empty datagrams and unknown commands are dropped silently. Each
/// handler runs on its own task; a failing handler is logged and never
/// affects the receive loop or other handlers.
async fn dispatch_datagram(
    data: &[u8],
    peer: SocketAddr,
    socket: &Arc<UdpSocket>,
    dispatch: &Arc<RwLock<DispatchTable>>,
) {
    let parsed = match parse_datagram(data) {
        Some(parsed) => parsed,
        None => return,
    };

    let handlers: Vec<Arc<dyn CommandHandler>> = dispatch
        .read()
        .await
        .handlers_for(&parsed.command)
        .to_vec();

    for handler in handlers {
        let ctx = HandlerContext {
            peer,
            sender: ReplySender::new(socket.clone()),
        };
        let payload = parsed.payload.clone();
        tokio::spawn(async move {
            if let Err(error) = handler.handle(&ctx, &payload).await {
                error!("Handler '{}' failed for {}: {}", handler.name(), peer, error);
            }
        });
    }
}
