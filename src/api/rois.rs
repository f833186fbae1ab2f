use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::extract::MaybeImageId;
use crate::core::state::AppState;
use crate::services::rois::RoisError;

pub(crate) async fn request_rois(
    MaybeImageId(iid): MaybeImageId,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let Some(iid) = iid else {
        return Err(ApiError::BadRequest("Image id is required".to_string()));
    };

    let rois = state.rois().fetch_rois(iid).await.map_err(map_rois_error)?;

    tracing::debug!(iid, count = rois.as_array().map(Vec::len).unwrap_or(0), "ROIs fetched");

    Ok(Json(rois))
}

fn map_rois_error(error: RoisError) -> ApiError {
    match error {
        RoisError::ImageNotFound(iid) => ApiError::NotFound(format!("Image {iid} not found")),
        RoisError::Upstream { .. } => {
            metrics::counter!("roi_fetch_failures_total", "kind" => "upstream".to_string())
                .increment(1);
            ApiError::BadGateway(error.to_string())
        }
        RoisError::Transport(_) => {
            metrics::counter!("roi_fetch_failures_total", "kind" => "transport".to_string())
                .increment(1);
            ApiError::BadGateway(error.to_string())
        }
        RoisError::InvalidPayload(_) => {
            metrics::counter!("roi_fetch_failures_total", "kind" => "payload".to_string())
                .increment(1);
            ApiError::BadGateway(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support::{
        self, get_request, read_json, upstream_rois_not_found, upstream_rois_ok,
    };

    #[tokio::test]
    async fn without_image_id_is_bad_request() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx.app.oneshot(get_request("/request_rois")).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["detail"], "Image id is required");
    }

    #[tokio::test]
    async fn returns_upstream_roi_array() {
        let rois = json!([{"id": 1, "shapes": [{"type": "Rectangle", "x": 0, "y": 0}]}]);
        let ctx =
            test_support::setup_test_context_with_upstream(upstream_rois_ok(rois.clone())).await;

        let response = ctx.app.oneshot(get_request("/request_rois/7")).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, rois);
    }

    #[tokio::test]
    async fn unwraps_data_envelope() {
        let rois = json!([{"id": 2, "shapes": []}]);
        let payload = json!({"data": rois.clone(), "meta": {"count": 1}});
        let ctx = test_support::setup_test_context_with_upstream(upstream_rois_ok(payload)).await;

        let response = ctx.app.oneshot(get_request("/request_rois/42")).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, rois);
    }

    #[tokio::test]
    async fn maps_upstream_not_found() {
        let ctx =
            test_support::setup_test_context_with_upstream(upstream_rois_not_found()).await;

        let response = ctx.app.oneshot(get_request("/request_rois/9")).await.expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = read_json(response).await;
        assert_eq!(body["detail"], "Image 9 not found");
    }

    #[tokio::test]
    async fn non_numeric_image_id_is_not_found() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx.app.oneshot(get_request("/request_rois/abc")).await.expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_upstream_payload_is_bad_gateway() {
        let payload = json!({"count": 3});
        let ctx = test_support::setup_test_context_with_upstream(upstream_rois_ok(payload)).await;

        let response = ctx.app.oneshot(get_request("/request_rois/5")).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
