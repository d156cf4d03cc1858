use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::{stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use voc_analysis::{AnalysisError, AnalysisOutcome, ProgressEvent, ProgressReporter};
use voc_core::{Action, Issue};

use super::AppState;

const PRODUCT_REQUIRED: &str = "Product name is required";
const PROGRESS_BUFFER: usize = 16;

/// Body of both analyze endpoints.
#[derive(Debug, Serialize)]
pub(super) struct AnalyzeResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<Issue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actions: Option<Vec<Action>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl AnalyzeResponse {
    fn ok(outcome: AnalysisOutcome) -> Self {
        Self {
            success: true,
            issues: Some(outcome.issues),
            actions: Some(outcome.actions),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            issues: None,
            actions: None,
            error: Some(error.into()),
        }
    }

    fn status(&self) -> StatusCode {
        if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<Result<AnalysisOutcome, AnalysisError>> for AnalyzeResponse {
    fn from(result: Result<AnalysisOutcome, AnalysisError>) -> Self {
        match result {
            Ok(outcome) => Self::ok(outcome),
            Err(e) => {
                tracing::error!(error = %e, "analysis failed");
                Self::failure(e.to_string())
            }
        }
    }
}

/// Pulls a non-empty string `product` out of the request body.
fn product_from(payload: Result<Json<Value>, JsonRejection>) -> Result<String, Response> {
    let bad_request = |message: String| {
        (
            StatusCode::BAD_REQUEST,
            Json(AnalyzeResponse::failure(message)),
        )
            .into_response()
    };

    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected analyze request body");
        bad_request(rejection.body_text())
    })?;

    body.get("product")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .ok_or_else(|| bad_request(PRODUCT_REQUIRED.to_string()))
}

pub(super) async fn analyze_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let product = match product_from(payload) {
        Ok(product) => product,
        Err(response) => return response,
    };

    tracing::info!(product = %product, "analyzing product");
    let response = AnalyzeResponse::from(
        state
            .analyzer
            .analyze(&product, &mut ProgressReporter::silent())
            .await,
    );
    (response.status(), Json(response)).into_response()
}

/// Streams one `progress` event per completed step, then a `result` event.
///
/// The analysis runs on its own task, so a client that disconnects early does
/// not cancel it.
pub(super) async fn analyze_product_stream(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let product = match product_from(payload) {
        Ok(product) => product,
        Err(response) => return response,
    };

    tracing::info!(product = %product, "streaming analysis");
    let (tx, rx) = mpsc::channel::<ProgressEvent>(PROGRESS_BUFFER);
    let analyzer = Arc::clone(&state.analyzer);
    let task = tokio::spawn(async move {
        let mut progress = ProgressReporter::channel(tx);
        analyzer.analyze(&product, &mut progress).await
    });

    let progress = ReceiverStream::new(rx).map(|event| sse_event("progress", &event));
    let result = stream::once(async move {
        let response = match task.await {
            Ok(result) => AnalyzeResponse::from(result),
            Err(e) => {
                tracing::error!(error = %e, "analysis task panicked or was cancelled");
                AnalyzeResponse::failure(e.to_string())
            }
        };
        sse_event("result", &response)
    });

    Sse::new(progress.chain(result))
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn sse_event<T: Serialize>(name: &str, payload: &T) -> Result<Event, Infallible> {
    let event = Event::default().event(name);
    Ok(match serde_json::to_string(payload) {
        Ok(json) => event.data(json),
        Err(e) => {
            tracing::error!(error = %e, event = name, "failed to encode SSE payload");
            event.data("{}")
        }
    })
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use serde_json::json;
    use tower::ServiceExt;
    use voc_analysis::ElasticBackend;
    use voc_elastic::ElasticClient;
    use wiremock::matchers::{body_string_contains, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::tests::{json_body, test_app};

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn elastic_with_complaints(server: &MockServer) -> ElasticBackend {
        let ts = Utc::now().to_rfc3339();
        let complaint = json!([ts, "Product A", "Marketplace A", "Leaking lid", 1, 0.1, "negative"]);

        Mock::given(method("POST"))
            .and(path("/_query"))
            .and(body_string_contains("STATS"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "columns": [
                    {"name": "avg_sentiment"}, {"name": "complaint_count"},
                    {"name": "total_reviews"}, {"name": "day"}
                ],
                "values": []
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/_query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "columns": [
                    {"name": "@timestamp"}, {"name": "product"}, {"name": "platform"},
                    {"name": "review_text"}, {"name": "rating"}, {"name": "sentiment_score"},
                    {"name": "sentiment_label"}
                ],
                "values": [complaint.clone(), complaint.clone(), complaint]
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/voc_issues/_doc/issue-[0-9a-f-]+$"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(server)
            .await;

        let client = ElasticClient::with_base_url(&server.uri(), "test-key", 5).expect("client");
        ElasticBackend::from_client(client, "customer_reviews", "voc_issues")
    }

    #[tokio::test]
    async fn missing_product_is_400() {
        let response = test_app(None)
            .oneshot(post_json("/api/analyze-product", "{}"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json, json!({"success": false, "error": "Product name is required"}));
    }

    #[tokio::test]
    async fn non_string_product_is_400() {
        let response = test_app(None)
            .oneshot(post_json("/api/analyze-product", r#"{"product": 42}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let response = test_app(None)
            .oneshot(post_json("/api/analyze-product", "{not json"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn unconfigured_backend_returns_sample_issue() {
        let response = test_app(None)
            .oneshot(post_json("/api/analyze-product", r#"{"product": "Product B"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["issues"][0]["title"], "Packaging Leakage Issue");
        assert_eq!(json["issues"][0]["reviewCount"], 18);
        assert_eq!(json["actions"][0]["type"], "issue_created");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn live_backend_detects_and_records_issue() {
        let server = MockServer::start().await;
        let backend = elastic_with_complaints(&server).await;

        let response = test_app(Some(backend))
            .oneshot(post_json("/api/analyze-product", r#"{"product": "Product A"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["issues"][0]["title"], "High Complaint Volume: Product A");
        assert_eq!(json["issues"][0]["reviewCount"], 3);
        assert_eq!(json["actions"][0]["status"], "success");
    }

    #[tokio::test]
    async fn stream_validates_before_opening() {
        let response = test_app(None)
            .oneshot(post_json("/api/analyze-product/stream", r#"{"product": ""}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stream_emits_progress_then_result() {
        let response = test_app(None)
            .oneshot(post_json(
                "/api/analyze-product/stream",
                r#"{"product": "Product C"}"#,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .expect("ascii")
            .starts_with("text/event-stream"));

        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let text = String::from_utf8(body.to_vec()).expect("utf8");

        assert_eq!(text.matches("event: progress").count(), 5, "{text}");
        let last_progress = text.rfind("event: progress").expect("progress");
        let result = text.find("event: result").expect("result event");
        assert!(result > last_progress);
        assert!(text.contains("\"step\":\"fetching_reviews\""));
        assert!(text.contains("Packaging Leakage Issue"));
    }
}
