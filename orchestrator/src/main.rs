use std::sync::Arc;

use tracing::info;

use orchestrator::config::Config;
use orchestrator::pipeline::QueryPipeline;
use orchestrator::{api, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first so LOG_LEVEL can seed the filter
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting RAG query service");
    info!(
        "Configuration loaded: index {} at {}",
        config.pinecone_index, config.pinecone_host
    );

    let pipeline = Arc::new(QueryPipeline::from_config(&config)?);
    let config = Arc::new(config);
    let routes = api::app(pipeline, config.clone());

    let (port, (addr, serving)) =
        server::bind_with_retry(config.port, config.port_retry_attempts, |port| {
            warp::serve(routes.clone()).try_bind_ephemeral(([0, 0, 0, 0], port))
        })?;

    if port != config.port {
        info!("Port {} was busy, using {} instead", config.port, port);
    }
    info!("Server listening on {}", addr);

    serving.await;

    Ok(())
}
