pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::layout::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout API
        .route("/api/v1/layout/compose", post(handlers::handle_compose))
        .route("/api/v1/layout/paginate", post(handlers::handle_paginate))
        .route("/api/v1/layout/params", post(handlers::handle_layout_params))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::layout::CompositionConfig;

    fn make_router() -> Router {
        build_router(AppState {
            composition: CompositionConfig::default(),
        })
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn sample_items() -> Value {
        json!([
            {
                "id": "cover",
                "title": "The Watchmaker",
                "body": "Every gear is cut by hand. ".repeat(150),
                "image_path": "img/watch.jpg",
                "plan": {"selected_type": "TYPE_LUXURY_PRODUCT"},
                "vision_analysis": {
                    "metadata": {"composition_analysis": {"visual_weight": "Right-heavy (Watch)"}}
                },
                "image_meta": {"width": 2000, "height": 1000}
            },
            {
                "id": "street",
                "title": "Alleys",
                "body": "Short piece.",
                "caption": "Seoul at night",
                "vision_analysis": {"space_analysis": [[0.0, 0.0, 1.0, 1.0]]},
                "image_meta": {"width": 1000, "height": 1000}
            }
        ])
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = make_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_compose_end_to_end() {
        let (status, body) = post_json(
            make_router(),
            "/api/v1/layout/compose",
            json!({"items": sample_items(), "split_limit_chars": 1500}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let pages = body["pages"].as_array().unwrap();
        assert!(!pages.is_empty());
        assert_eq!(pages[0]["items"][0]["id"], "cover_part1");

        let params = &body["layout_params"];
        assert_eq!(params["cover_part1"]["kind"], "split");
        assert_eq!(params["cover_part1"]["direction"], "row");
        assert_eq!(params["cover_part1"]["reverse"], true);
        assert_eq!(params["street"]["kind"], "overlay");
        assert_eq!(params["street"]["width_pct"], 85.0);
        assert!(params.get("cover_part2").is_none());
        assert_eq!(body["skipped"], 0);
    }

    #[tokio::test]
    async fn test_compose_with_non_list_items_is_empty() {
        let (status, body) = post_json(
            make_router(),
            "/api/v1/layout/compose",
            json!({"items": "not a list"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pages"], json!([]));
        assert_eq!(body["layout_params"], json!({}));
    }

    #[tokio::test]
    async fn test_paginate_reports_skipped_entries() {
        let (status, body) = post_json(
            make_router(),
            "/api/v1/layout/paginate",
            json!({"items": [{"id": "a", "body": "Hi."}, 5, "x"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skipped"], 2);
        assert_eq!(body["pages"][0]["layout_hint"], "hero_single");
        assert_eq!(body["pages"][0]["item_count"], 1);
    }

    #[tokio::test]
    async fn test_params_endpoint() {
        let (status, body) = post_json(
            make_router(),
            "/api/v1/layout/params",
            json!({"items": sample_items(), "split_limit_chars": 10_000}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // Under a generous limit nothing is split, so ids stay as given.
        assert_eq!(body["layout_params"]["cover"]["kind"], "split");
        assert_eq!(body["layout_params"]["cover"]["ratio"], 0.45);
    }

    #[tokio::test]
    async fn test_zero_budget_is_rejected() {
        let (status, body) = post_json(
            make_router(),
            "/api/v1/layout/compose",
            json!({"items": [], "page_budget": 0}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let response = make_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
