use dispatchd::config::{ListenerConfig, ServerConfig};
use dispatchd::error::{FatalExit, ProcessExit, FATAL_EXIT_CODE};
use dispatchd::handlers::Uppercase;
use dispatchd::modules::{Module, UdpModule};
use dispatchd::registry::HandlerRegistry;
use dispatchd::server::UdpListener;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_NAME: &str = "udp";

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = ServerConfig::new().with_section(SERVER_NAME, ListenerConfig::default());

    // Handlers are discovered through the registry by key prefix; adding
    // a command means registering another handler here.
    let mut registry = HandlerRegistry::new();
    registry.register("udp.events.uppercase", Arc::new(Uppercase::new()));
    let registry = Arc::new(registry);

    let modules: Vec<Arc<dyn Module>> = vec![Arc::new(UdpModule::new(SERVER_NAME, registry))];

    let exit: Arc<dyn ProcessExit> = Arc::new(FatalExit);
    let mut server = UdpListener::new(config, modules, exit.clone());

    if let Err(error) = server.init(SERVER_NAME).await {
        exit.terminate(FATAL_EXIT_CODE, &error.to_string());
    }
    if let Err(error) = server.start(SERVER_NAME).await {
        exit.terminate(FATAL_EXIT_CODE, &error.to_string());
    }

    // Serve until interrupted.
    if let Err(error) = tokio::signal::ctrl_c().await {
        exit.terminate(
            FATAL_EXIT_CODE,
            &format!("failed to listen for shutdown signal: {}", error),
        );
    }
    info!("Shutdown signal received");

    if let Err(error) = server.stop(SERVER_NAME).await {
        exit.terminate(FATAL_EXIT_CODE, &error.to_string());
    }
}
