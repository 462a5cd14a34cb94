use std::sync::Arc;

use arxiv_report::{
    arxiv::ArxivRetriever,
    cli,
    web::{build_router, AppState},
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = cli::Args::parse().into_config();
    tracing::info!(
        provider = ?config.model.provider,
        model = %config.model.model,
        max_docs = config.max_docs,
        font = %config.font_path.display(),
        "starting research assistant"
    );

    let state = AppState::new(
        &config,
        Arc::new(config.model.clone()),
        Arc::new(ArxivRetriever::new()),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
