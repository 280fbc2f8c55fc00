use anyhow::Result;
use tracing::info;

use orchestrator_api::config::Context;
use orchestrator_api::server;

#[tokio::main]
async fn main() -> Result<()> {
    let context = Context::new()?;
    context.config.log.start()?;

    info!(
        service = context.config.log.service_name(),
        "Starting server on {}...",
        context.config.grpc.addr(),
    );
    server::start(context).await?;

    Ok(())
}
