//! HTTP handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::models::{GeometryRequest, HealthResponse, MonthRecord};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get_last4months", post(last_months_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// POST /get_last4months - Recent monthly indices for a point or polygon
pub async fn last_months_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<MonthRecord>>, AppError> {
    let request: GeometryRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidBody(e.to_string()))?;
    let aoi = request.into_aoi()?;

    let records = state.backfill.recent_months(&aoi).await?;
    tracing::info!(
        "{} request: {} months with data",
        aoi.kind(),
        records.len()
    );

    if records.is_empty() {
        return Err(AppError::NoData);
    }
    Ok(Json(records))
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backfill::tests::{FakeImagery, MonthScript};
    use crate::backfill::BackfillConfig;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(fake: FakeImagery) -> Router {
        let config = BackfillConfig {
            reference_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            ..Default::default()
        };
        router(Arc::new(AppState::new(Arc::new(fake), config)))
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/get_last4months")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_returns_month_records() {
        let app = app(FakeImagery::every_month(MonthScript::full(6000.0)));
        let (status, body) = post_json(
            app,
            r#"{"type": "Point", "coordinates": [[-121.5, 38.6]]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0]["year"], 2023);
        assert_eq!(records[0]["month"], 1);
        assert_eq!(records[0]["month_name"], "January");
        assert_eq!(records[0]["NDVI"], 0.6);
        assert_eq!(records[0]["VegetationCategory"], "Dense Vegetation / High Bloom");
    }

    #[tokio::test]
    async fn test_empty_coordinates() {
        let (status, body) =
            post_json(app(FakeImagery::default()), r#"{"type": "Point", "coordinates": []}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No coordinates provided"}));
    }

    #[tokio::test]
    async fn test_invalid_geometry_type() {
        let (status, body) = post_json(
            app(FakeImagery::default()),
            r#"{"type": "Line", "coordinates": [[0, 0], [1, 1]]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid geometry type"}));
    }

    #[tokio::test]
    async fn test_null_geometry_type() {
        let (status, body) = post_json(
            app(FakeImagery::default()),
            r#"{"type": null, "coordinates": [[0, 0]]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid geometry type"}));
    }

    #[tokio::test]
    async fn test_no_data_is_not_found() {
        let fake = FakeImagery::default();
        let (status, body) = post_json(
            app(fake),
            r#"{"type": "Polygon", "coordinates": [[0, 0], [1, 0], [1, 1], [0, 0]]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": "No data available for the last checked months"})
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_internal_error() {
        let fake = FakeImagery {
            fail: true,
            ..Default::default()
        };
        let (status, body) = post_json(app(fake), r#"{"coordinates": [[0, 0]]}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Earth Engine request failed with status: 503"})
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (status, body) = post_json(app(FakeImagery::default()), "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "ok");
    }
}
