//! HTTP surface tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use resume_rag::api::{create_router, AppState};
use resume_rag::application::{AnalysisService, ChatService, RagService, SessionIndex};
use resume_rag::domain::{ports::AnswerGenerator, DomainError, Message};
use resume_rag::infrastructure::{
    AppConfig, HashedEmbedding, InMemoryAnalysisStore, InMemoryVectorIndex,
};

const BOUNDARY: &str = "resume-rag-test-boundary";

struct StubGenerator;

#[async_trait]
impl AnswerGenerator for StubGenerator {
    async fn generate(
        &self,
        system_context: &str,
        _history: &[Message],
        user_query: &str,
    ) -> Result<String, DomainError> {
        if user_query.contains("JOB DESCRIPTION") {
            Ok("1. MATCH SCORE: 64\n2. MISSING SKILLS: Terraform".to_string())
        } else {
            Ok(format!("context had {} chars", system_context.len()))
        }
    }
}

fn app() -> Router {
    let mut config = AppConfig::default();
    config.config.rag.chunk_size = 40;

    let session = Arc::new(SessionIndex::new(
        Arc::new(HashedEmbedding::default()),
        Arc::new(InMemoryVectorIndex::new()),
        config.config.rag.chunker().unwrap(),
    ));
    let generator: Arc<dyn AnswerGenerator> = Arc::new(StubGenerator);
    let store = Arc::new(InMemoryAnalysisStore::default());

    let rag = Arc::new(RagService::new(session.clone(), config.config.rag.top_k));
    let chat = Arc::new(ChatService::new(rag.clone(), generator.clone(), &config));
    let analysis = Arc::new(AnalysisService::new(session, generator, store, &config));

    create_router(AppState::new(config, rag, chat, analysis))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// (field name, optional filename, raw value)
type Part<'a> = (&'a str, Option<&'a str>, Vec<u8>);

fn multipart(parts: Vec<Part<'_>>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, value) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{name}\"");
        if let Some(f) = filename {
            disposition.push_str(&format!("; filename=\"{f}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n\r\n");
        body.extend_from_slice(&value);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/v1/analyses")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Single-page PDF showing `text` in Helvetica, with a correct xref table.
fn minimal_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        concat!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R ",
            "/Resources << /Font << /F1 5 0 R >> >> >>"
        )
        .to_string(),
        format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref = pdf.len();
    let size = objects.len() + 1;
    pdf.extend_from_slice(format!("xref\n0 {size}\n0000000000 65535 f \n").as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!("trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n").as_bytes(),
    );
    pdf
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_ready_without_redis() {
    let response = app()
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["redis"], "not_configured");
    assert!(body["active_collection"].is_null());
}

#[tokio::test]
async fn test_chat_before_upload_conflicts() {
    let response = app()
        .oneshot(post_json("/api/v1/chat", json!({ "message": "Skills?" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["kind"], "no_active_session");
}

#[tokio::test]
async fn test_session_ingest_then_search() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/session/documents",
            json!({ "content": "ALPHA BETA GAMMA DELTA", "collection_id": "s1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["collection_id"], "s1");
    assert_eq!(body["chunks"], 1);
    assert_eq!(body["empty"], false);

    let response = app
        .oneshot(post_json(
            "/api/v1/session/search",
            json!({ "query": "GAMMA", "limit": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let results = json_body(response).await;
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["content"], "ALPHA BETA GAMMA DELTA");
}

#[tokio::test]
async fn test_search_rejects_zero_limit() {
    let app = app();
    app.clone()
        .oneshot(post_json(
            "/api/v1/session/documents",
            json!({ "content": "Rust engineer", "collection_id": "s1" }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(post_json(
            "/api/v1/session/search",
            json!({ "query": "Rust", "limit": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["kind"], "validation");
}

#[tokio::test]
async fn test_search_replaced_collection_is_not_found() {
    let app = app();
    for id in ["old", "new"] {
        app.clone()
            .oneshot(post_json(
                "/api/v1/session/documents",
                json!({ "content": "Rust engineer", "collection_id": id }),
            ))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(post_json(
            "/api/v1/session/search",
            json!({ "query": "Rust", "collection_id": "old" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analysis_flow() {
    let app = app();

    let response = app
        .clone()
        .oneshot(multipart(vec![
            ("file", Some("cv.txt"), b"Platform engineer. Rust, Kubernetes, AWS.".to_vec()),
            ("job_description", None, b"Senior platform engineer with Terraform".to_vec()),
            ("job_role", None, b"Platform Engineer".to_vec()),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let record = json_body(response).await;
    assert_eq!(record["match_score"], 64);
    assert_eq!(record["filename"], "cv.txt");
    assert_eq!(record["job_role"], "Platform Engineer");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/chat",
            json!({ "message": "Does the candidate know Rust?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let answer = json_body(response).await;
    assert_eq!(answer["collection_id"], record["collection_id"]);
    assert_eq!(answer["sources"].as_array().unwrap().len(), 2);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/history?limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history = json_body(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["id"], record["id"]);
}

#[tokio::test]
async fn test_analysis_accepts_pdf_upload() {
    let response = app()
        .oneshot(multipart(vec![
            ("file", Some("cv.pdf"), minimal_pdf("Rust engineer with Kubernetes")),
            ("job_description", None, b"Senior platform engineer".to_vec()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let record = json_body(response).await;
    assert_eq!(record["filename"], "cv.pdf");
    assert_eq!(record["match_score"], 64);
    assert!(record["chunk_count"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_analysis_rejects_unreadable_pdf() {
    let response = app()
        .oneshot(multipart(vec![
            ("file", Some("cv.pdf"), b"%PDF-1.4 truncated".to_vec()),
            ("job_description", None, b"Rust developer".to_vec()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analysis_rejects_blank_resume() {
    let response = app()
        .oneshot(multipart(vec![
            ("file", Some("cv.txt"), b"   \n  ".to_vec()),
            ("job_description", None, b"Rust developer".to_vec()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["kind"], "empty_input");
}

#[tokio::test]
async fn test_analysis_rejects_binary_upload() {
    let response = app()
        .oneshot(multipart(vec![
            ("file", Some("cv.txt"), vec![0xff, 0xfe, 0x00, 0x80]),
            ("job_description", None, b"Rust developer".to_vec()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analysis_requires_job_description() {
    let response = app()
        .oneshot(multipart(vec![("file", Some("cv.txt"), b"Rust".to_vec())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["kind"], "validation");
}
