use anyhow::Result;
use std::sync::Arc;

use tutor_gateway::TutorService;
use tutor_gateway::config::Config;
use tutor_gateway::http;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing to stderr
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Config::load();

    // One shared service instance; the transport inside it is process-wide
    let service = Arc::new(TutorService::new(&config)?);
    let router = http::router(service);

    let bind = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        %bind,
        name = %config.server.name,
        version = %config.server.version,
        "Starting tutor gateway"
    );

    axum::serve(listener, router).await?;
    Ok(())
}
