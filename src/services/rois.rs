use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::core::config::{Settings, UpstreamSettings};

#[derive(Debug, Error)]
pub(crate) enum RoisError {
    #[error("image {0} not found upstream")]
    ImageNotFound(i64),
    #[error("upstream returned status {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("unexpected upstream payload: {0}")]
    InvalidPayload(String),
}

/// Client for the image server's ROI endpoint.
#[derive(Debug, Clone)]
pub(crate) struct RoiService {
    client: Client,
    upstream: UpstreamSettings,
}

impl RoiService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let upstream = settings.upstream().clone();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(upstream.connect_timeout_seconds))
            .timeout(Duration::from_secs(upstream.timeout_seconds))
            .build()
            .context("Failed to build upstream HTTP client")?;

        Ok(Self { client, upstream })
    }

    /// Fetch the ROI listing for an image, normalized to a JSON array.
    pub(crate) async fn fetch_rois(&self, iid: i64) -> Result<Value, RoisError> {
        let url = self.upstream.rois_url(iid);

        let mut last_error = None;

        for attempt in 0..=self.upstream.max_retries {
            match self.client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        return Err(RoisError::ImageNotFound(iid));
                    }

                    let raw_body = response
                        .text()
                        .await
                        .map_err(|err| RoisError::Transport(err.to_string()))?;

                    if status.is_success() {
                        let payload: Value = serde_json::from_str(&raw_body).map_err(|err| {
                            RoisError::InvalidPayload(format!("non-JSON body: {err}"))
                        })?;
                        return extract_roi_list(&payload).ok_or_else(|| {
                            RoisError::InvalidPayload(
                                "no ROI list in upstream response".to_string(),
                            )
                        });
                    }

                    let message = serde_json::from_str::<Value>(&raw_body)
                        .map(|payload| extract_error_message(&payload))
                        .unwrap_or_else(|_| raw_body.clone());
                    last_error =
                        Some(RoisError::Upstream { status: status.as_u16(), message });
                }
                Err(err) => {
                    last_error = Some(RoisError::Transport(err.to_string()));
                }
            }

            if attempt < self.upstream.max_retries {
                let backoff = Duration::from_secs(2_u64.pow(attempt));
                tokio::time::sleep(backoff).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| RoisError::Transport("unknown upstream error".to_string())))
    }

    /// Cheap reachability probe against the upstream base URL. Any HTTP
    /// response counts as reachable.
    pub(crate) async fn ping(&self) -> Result<(), RoisError> {
        self.client
            .get(&self.upstream.base_url)
            .send()
            .await
            .map_err(|err| RoisError::Transport(err.to_string()))?;
        Ok(())
    }
}

/// Accept both a bare array and the `data`/`rois` wrappers different image
/// server versions emit.
fn extract_roi_list(payload: &Value) -> Option<Value> {
    if payload.is_array() {
        return Some(payload.clone());
    }

    for key in ["data", "rois"] {
        if let Some(list) = payload.get(key) {
            if list.is_array() {
                return Some(list.clone());
            }
        }
    }

    None
}

fn extract_error_message(payload: &Value) -> String {
    payload
        .get("detail")
        .and_then(Value::as_str)
        .or_else(|| payload.get("message").and_then(Value::as_str))
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .unwrap_or("unknown_error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_roi_list_accepts_bare_array() {
        let payload = json!([{"id": 1, "shapes": []}]);
        assert_eq!(extract_roi_list(&payload), Some(payload.clone()));
    }

    #[test]
    fn extract_roi_list_unwraps_data_and_rois() {
        let rois = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(extract_roi_list(&json!({"data": rois.clone()})), Some(rois.clone()));
        assert_eq!(extract_roi_list(&json!({"rois": rois.clone()})), Some(rois));
    }

    #[test]
    fn extract_roi_list_rejects_other_shapes() {
        assert_eq!(extract_roi_list(&json!({"data": "oops"})), None);
        assert_eq!(extract_roi_list(&json!("nope")), None);
        assert_eq!(extract_roi_list(&json!({"count": 3})), None);
    }

    #[test]
    fn extract_error_message_prefers_detail() {
        let payload = json!({"detail": "no such image", "message": "other"});
        assert_eq!(extract_error_message(&payload), "no such image");
        assert_eq!(extract_error_message(&json!({"message": "boom"})), "boom");
        assert_eq!(extract_error_message(&json!({"error": "bad"})), "bad");
        assert_eq!(extract_error_message(&json!({})), "unknown_error");
    }
}
