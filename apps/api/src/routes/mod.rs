pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::detection::handlers as detection;
use crate::extraction::handlers as extraction;
use crate::generation::handlers as generation;
use crate::state::AppState;
use crate::store::handlers as store;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Generation
        .route("/api/generate", post(generation::handle_generate))
        // Documents
        .route("/api/parse-pdf", post(extraction::handle_parse_pdf))
        .route("/api/detect", post(detection::handle_detect))
        // Saved inputs
        .route(
            "/api/saved-inputs",
            get(store::handle_list_inputs).post(store::handle_save_input),
        )
        .route(
            "/api/saved-inputs/:id",
            patch(store::handle_update_input).delete(store::handle_delete_input),
        )
        // History
        .route(
            "/api/history",
            get(store::handle_list_history)
                .post(store::handle_save_history)
                .delete(store::handle_clear_history),
        )
        .route(
            "/api/history/:id",
            patch(store::handle_update_history).delete(store::handle_delete_history),
        )
        .route("/api/history/:id/more", post(store::handle_more_questions))
        // Last input
        .route(
            "/api/last-input",
            get(store::handle_get_last_input)
                .put(store::handle_save_last_input)
                .delete(store::handle_clear_last_input),
        )
        .layer(body_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::errors::GENERATION_FAILED_MESSAGE;
    use crate::generation::generator::test_support::{
        continuation_json, generation_json, ScriptedBackend,
    };
    use crate::generation::generator::PrepGenerator;
    use crate::llm_client::CompletionBackend;
    use crate::store::{MemoryKeyValueStore, PrepStore};

    fn test_config() -> Config {
        Config {
            openai_api_key: None,
            openai_base_url: "http://localhost".to_string(),
            llm_stream: false,
            llm_timeout_secs: 5,
            data_dir: None,
            max_upload_bytes: 1024 * 1024,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }

    fn app(backend: Option<Arc<ScriptedBackend>>) -> Router {
        let backend = backend.map(|b| b as Arc<dyn CompletionBackend>);
        let store = PrepStore::open(Arc::new(MemoryKeyValueStore::new()));
        build_router(AppState::new(
            test_config(),
            PrepGenerator::new(backend),
            store,
        ))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn inputs() -> Value {
        json!({ "resume": "Rust developer, 6 years", "jobDescription": "Senior Rust engineer" })
    }

    #[tokio::test]
    async fn test_health_reports_llm_configuration() {
        let (status, body) = send(&app(None), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "hireprep-api");
        assert_eq!(body["llmConfigured"], false);
    }

    #[tokio::test]
    async fn test_generate_without_credential_is_configuration_error() {
        let (status, body) = send(&app(None), Method::POST, "/api/generate", Some(inputs())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "CONFIGURATION_ERROR");
        assert_eq!(body["error"], GENERATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_generate_validates_before_configuration() {
        let (status, body) = send(
            &app(None),
            Method::POST,
            "/api/generate",
            Some(json!({ "resume": "  ", "jobDescription": "Senior Rust engineer" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Resume and job description are required");
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_json() {
        let app = app(None);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_full_result() {
        let backend = ScriptedBackend::replying(generation_json(12));
        let (status, body) = send(
            &app(Some(backend.clone())),
            Method::POST,
            "/api/generate",
            Some(inputs()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"].as_array().unwrap().len(), 12);
        assert!(body["prepPlan"].is_object());
        assert!(body["skillGapAnalysis"].is_object());
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_continue_returns_only_new_questions() {
        let backend = ScriptedBackend::replying(continuation_json(7));
        let mut request = inputs();
        request["mode"] = json!("continue");
        request["existingQuestions"] = json!([{ "question": "What is ownership?" }]);

        let (status, body) = send(
            &app(Some(backend)),
            Method::POST,
            "/api/generate",
            Some(request),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"].as_array().unwrap().len(), 7);
        assert!(body.get("prepPlan").is_none());
    }

    #[tokio::test]
    async fn test_generate_upstream_failure_is_generic() {
        let backend = ScriptedBackend::failing(503);
        let (status, body) = send(
            &app(Some(backend)),
            Method::POST,
            "/api/generate",
            Some(inputs()),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "UPSTREAM_ERROR");
        assert_eq!(body["error"], GENERATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_detect_short_text_is_null() {
        let (status, body) = send(
            &app(None),
            Method::POST,
            "/api/detect",
            Some(json!({ "text": "Rust", "kind": "jobDescription" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["detection"].is_null());
    }

    #[tokio::test]
    async fn test_detect_job_description() {
        let text = "We are hiring a Senior Backend Engineer. You will run Kubernetes and \
            PostgreSQL in production, and mentor the team on Kubernetes operations.";
        let (status, body) = send(
            &app(None),
            Method::POST,
            "/api/detect",
            Some(json!({ "text": text, "kind": "jobDescription" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["detection"]["role"], "Backend Engineer");
        assert_eq!(body["detection"]["technologies"][0], "Kubernetes");
    }

    #[tokio::test]
    async fn test_saved_inputs_lifecycle() {
        let app = app(None);
        let mut request = inputs();
        request["name"] = json!("Acme");

        let (status, created) = send(&app, Method::POST, "/api/saved-inputs", Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "Acme");
        let id = created["id"].as_str().unwrap().to_string();

        let (_, list) = send(&app, Method::GET, "/api/saved-inputs", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, renamed) = send(
            &app,
            Method::PATCH,
            &format!("/api/saved-inputs/{id}"),
            Some(json!({ "name": "Acme backend" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["name"], "Acme backend");
        assert_eq!(renamed["resume"], created["resume"]);

        let uri = format!("/api/saved-inputs/{id}");
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_more_questions_appends_to_history_entry() {
        let backend = ScriptedBackend::replying(continuation_json(6));
        let app = app(Some(backend.clone()));

        let result: Value = serde_json::from_str(&generation_json(12)).unwrap();
        let mut request = inputs();
        request["result"] = result;
        let (status, entry) = send(&app, Method::POST, "/api/history", Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = entry["id"].as_str().unwrap().to_string();

        let (status, updated) =
            send(&app, Method::POST, &format!("/api/history/{id}/more"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["result"]["questions"].as_array().unwrap().len(), 18);

        let (_, history) = send(&app, Method::GET, "/api/history", None).await;
        assert_eq!(
            history[0]["result"]["questions"].as_array().unwrap().len(),
            18
        );
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_more_questions_for_unknown_entry_skips_model() {
        let backend = ScriptedBackend::replying(continuation_json(6));
        let (status, _) = send(
            &app(Some(backend.clone())),
            Method::POST,
            "/api/history/missing/more",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_history() {
        let app = app(None);
        let mut request = inputs();
        request["result"] = serde_json::from_str(&generation_json(12)).unwrap();
        send(&app, Method::POST, "/api/history", Some(request)).await;

        let (status, _) = send(&app, Method::DELETE, "/api/history", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, history) = send(&app, Method::GET, "/api/history", None).await;
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn test_last_input_round_trip() {
        let app = app(None);
        let (status, body) = send(&app, Method::GET, "/api/last-input", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());

        send(&app, Method::PUT, "/api/last-input", Some(inputs())).await;
        let (_, body) = send(&app, Method::GET, "/api/last-input", None).await;
        assert_eq!(body["jobDescription"], "Senior Rust engineer");

        let (status, _) = send(&app, Method::DELETE, "/api/last-input", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&app, Method::GET, "/api/last-input", None).await;
        assert!(body.is_null());
    }

    fn multipart(field: &str, file_name: &str, content: &str) -> Request<Body> {
        let boundary = "hireprep-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {content}\r\n\
             --{boundary}--\r\n"
        );
        Request::builder()
            .method(Method::POST)
            .uri("/api/parse-pdf")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_parse_text_upload() {
        let response = app(None)
            .oneshot(multipart("file", "jd.txt", "Senior Rust engineer"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["text"], "Senior Rust engineer");
    }

    #[tokio::test]
    async fn test_parse_without_file_field() {
        let response = app(None)
            .oneshot(multipart("attachment", "jd.txt", "Senior Rust engineer"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "No file provided");
    }
}
