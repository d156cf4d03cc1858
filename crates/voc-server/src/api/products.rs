use axum::{extract::State, Extension, Json};
use voc_core::ProductEntry;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<ProductEntry>>> {
    Json(ApiResponse {
        data: state.products.as_ref().clone(),
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::tests::{json_body, test_app};

    #[tokio::test]
    async fn lists_catalog_in_envelope() {
        let response = test_app(None)
            .oneshot(
                Request::builder()
                    .uri("/api/products")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let names: Vec<&str> = json["data"]
            .as_array()
            .expect("data array")
            .iter()
            .filter_map(|p| p["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Product A", "Product B"]);
        assert!(json["meta"]["request_id"].is_string());
    }
}
