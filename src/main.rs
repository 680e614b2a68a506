use std::env;
use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinSet;
use training_bot::{
    actor::{broker::Broker, dispatcher::Dispatcher},
    api::{auth::TokenVerifier, websocket},
    config::Config,
    instrumentation,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    instrumentation::init_tracing_subscriber(config.log_format)?;
    tracing::info!("Starting the training bot...");

    let mut dispatcher = Dispatcher::new(Broker::new());
    dispatcher.start(config.workers).await;

    let addr = env::args().nth(1).unwrap_or_else(|| config.addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to address {addr}"))?;

    tracing::info!("Listening for TCP connections on {}", addr);

    let verifier = Arc::new(TokenVerifier::new(&config.token)?);
    let mut handles = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::info!("New connection from {}", peer);
                    handles.spawn(websocket::accept_connection(stream, dispatcher.commands(), verifier.clone()));
                }
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            },
            Some(finished) = handles.join_next(), if !handles.is_empty() => {
                if let Err(e) = finished {
                    tracing::warn!("Connection task ended abnormally: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, stopping dispatcher...");
                break;
            }
        }
    }

    // Connections stay open while the dispatcher drains; new commands get an error frame
    dispatcher.stop().await;
    handles.abort_all();

    tracing::info!("All workers have been stopped.");
    Ok(())
}
