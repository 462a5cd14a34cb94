//! Browser UI: one form page, a generate action and a PDF download.

use std::{path::PathBuf, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{agents::ModelFactory, arxiv::PaperRetriever, config::Config};

mod handlers;
mod page;

pub const PDF_FILENAME: &str = "research_report.pdf";

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub models: Arc<dyn ModelFactory>,
    pub retriever: Arc<dyn PaperRetriever>,
    pub max_docs: usize,
    pub font_path: PathBuf,
}

impl AppState {
    pub fn new(
        config: &Config,
        models: Arc<dyn ModelFactory>,
        retriever: Arc<dyn PaperRetriever>,
    ) -> Self {
        Self {
            models,
            retriever,
            max_docs: config.max_docs,
            font_path: config.font_path.clone(),
        }
    }
}

pub type SharedState = Arc<AppState>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/generate", post(handlers::generate))
        .route("/download", post(handlers::download))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
