use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use super::{page::PageView, SharedState, PDF_FILENAME};
use crate::{
    pdf::{render_pdf, PdfError},
    pipeline::ResearchPipeline,
};

#[derive(Debug, Default, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub report: String,
}

pub async fn index() -> Html<String> {
    Html(PageView::default().render())
}

pub async fn generate(
    State(state): State<SharedState>,
    Form(form): Form<GenerateForm>,
) -> (StatusCode, Html<String>) {
    let topic = form.topic.trim();
    let mut view = PageView {
        topic,
        ..Default::default()
    };

    if form.api_key.trim().is_empty() {
        view.error = Some("API Key is required.".to_string());
        return (StatusCode::BAD_REQUEST, Html(view.render()));
    }
    if topic.is_empty() {
        view.error = Some("Research topic is required.".to_string());
        return (StatusCode::BAD_REQUEST, Html(view.render()));
    }

    let model = match state.models.connect(&form.api_key) {
        Ok(model) => model,
        Err(err) => {
            tracing::error!(error = %err, "could not initialize model client");
            view.error = Some(format!("Could not initialize the model client: {err}"));
            return (StatusCode::BAD_REQUEST, Html(view.render()));
        }
    };

    let pipeline = ResearchPipeline::new(model.as_ref(), state.retriever.as_ref())
        .max_docs(state.max_docs);
    let outcome = match pipeline.run(topic).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(topic, error = %err, "report generation failed");
            view.error = Some(format!("Report generation failed: {err}"));
            return (StatusCode::BAD_GATEWAY, Html(view.render()));
        }
    };

    if outcome.report.trim().is_empty() {
        tracing::error!(topic, "model returned an empty report");
        view.error = Some(PdfError::EmptyReport.to_string());
        return (StatusCode::BAD_GATEWAY, Html(view.render()));
    }

    view.notices = &outcome.notices;
    view.report = Some(&outcome.report);
    (StatusCode::OK, Html(view.render()))
}

pub async fn download(
    State(state): State<SharedState>,
    Form(form): Form<DownloadForm>,
) -> Response {
    let font_path = state.font_path.clone();
    let rendered =
        tokio::task::spawn_blocking(move || render_pdf(&form.report, &font_path)).await;

    match rendered {
        Ok(Ok(bytes)) => {
            tracing::info!(bytes = bytes.len(), "serving PDF");
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{PDF_FILENAME}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Ok(Err(PdfError::EmptyReport)) => {
            (StatusCode::BAD_REQUEST, PdfError::EmptyReport.to_string()).into_response()
        }
        Ok(Err(err)) => {
            tracing::error!(error = %err, "PDF rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("PDF rendering failed: {err}"))
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "PDF rendering task panicked");
            (StatusCode::INTERNAL_SERVER_ERROR, "PDF rendering failed").into_response()
        }
    }
}
