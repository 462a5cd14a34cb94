use std::sync::Arc;

use arxiv_report::{
    config::Config,
    testing::{paper, ScriptedFactory, StaticRetriever},
    web::{build_router, AppState},
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tower::util::ServiceExt;

const QUERIES: &str =
    r#"["quantum error correction codes", "surface code QEC", "QEC threshold theorem"]"#;

fn app(factory: ScriptedFactory, retriever: StaticRetriever) -> Router {
    let config = Config {
        font_path: "/nonexistent/DejaVuSans.ttf".into(),
        ..Config::default()
    };
    build_router(AppState::new(&config, Arc::new(factory), Arc::new(retriever)))
}

fn factory(queries: &str, report: &str) -> ScriptedFactory {
    ScriptedFactory {
        queries_reply: queries.to_string(),
        report_reply: report.to_string(),
        fail: false,
    }
}

fn retriever() -> StaticRetriever {
    StaticRetriever::new()
        .with("surface code QEC", vec![paper("Surface codes", "1208.0928")])
        .with("quantum error correction", vec![paper("QEC Review", "0904.2557")])
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn index_serves_the_form() {
    let response = app(factory(QUERIES, "r"), retriever())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"action="/generate""#));
}

#[tokio::test]
async fn missing_api_key_short_circuits() {
    let retriever = retriever();
    let response = app(factory(QUERIES, "r"), retriever)
        .oneshot(form_post("/generate", "api_key=&topic=quantum+error+correction"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("API Key is required."));
}

#[tokio::test]
async fn missing_topic_short_circuits() {
    let response = app(factory(QUERIES, "r"), retriever())
        .oneshot(form_post("/generate", "api_key=secret&topic=++"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Research topic is required."));
}

#[tokio::test]
async fn generate_renders_report_preview() {
    let response = app(factory(QUERIES, "# Quantum Error Correction\n\nBody text."), retriever())
        .oneshot(form_post("/generate", "api_key=secret&topic=quantum+error+correction"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1>Quantum Error Correction</h1>"));
    assert!(html.contains(r#"action="/download""#));
    assert!(!html.contains("secret"));
}

#[tokio::test]
async fn invalid_query_json_shows_raw_output_but_still_reports() {
    let response = app(factory("three queries, no JSON", "Degenerate report."), retriever())
        .oneshot(form_post("/generate", "api_key=secret&topic=quantum+error+correction"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Raw output: three queries, no JSON"));
    assert!(html.contains("Degenerate report."));
}

#[tokio::test]
async fn retrieval_fault_is_reported_on_the_form() {
    let response = app(factory(QUERIES, "r"), StaticRetriever::failing())
        .oneshot(form_post("/generate", "api_key=secret&topic=quantum+error+correction"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(response).await.contains("Report generation failed"));
}

#[tokio::test]
async fn empty_report_is_an_explicit_failure() {
    let response = app(factory(QUERIES, "   "), retriever())
        .oneshot(form_post("/generate", "api_key=secret&topic=quantum+error+correction"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(response).await.contains("No report content provided."));
}

#[tokio::test]
async fn download_returns_pdf_attachment() {
    let response = app(factory(QUERIES, "r"), retriever())
        .oneshot(form_post("/download", "report=Caf%C3%A9+findings"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        r#"attachment; filename="research_report.pdf""#
    );
    let bytes = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn download_of_empty_report_fails() {
    let response = app(factory(QUERIES, "r"), retriever())
        .oneshot(form_post("/download", "report="))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
