use std::sync::Arc;

use displaydoc::Display;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Context;
use crate::grpc;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// Failed to bind the server address: {0}
    Bind(std::io::Error),
    /// Failed to read the bound address: {0}
    LocalAddr(std::io::Error),
    /// Server error: {0}
    Serve(std::io::Error),
}

/// Bind to the configured address and serve until the process ends.
pub async fn start(context: Arc<Context>) -> Result<(), Error> {
    let listener = TcpListener::bind(context.config.grpc.addr())
        .await
        .map_err(Error::Bind)?;
    start_with_listener(context, listener).await
}

/// Serve on an already bound listener.
pub async fn start_with_listener(context: Arc<Context>, listener: TcpListener) -> Result<(), Error> {
    let addr = listener.local_addr().map_err(Error::LocalAddr)?;
    info!("Listening on {addr}");

    axum::serve(listener, grpc::router(&context))
        .await
        .map_err(Error::Serve)
}
