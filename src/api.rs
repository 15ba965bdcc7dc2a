use crate::camera::Frame;
use crate::config::BackendConfig;
use crate::error::{FaceGateError, Result};
use reqwest::blocking::{multipart, Client};
use std::time::Duration;

/// The three backend operations the client consumes. A trait so the
/// orchestration core runs against recording doubles in tests.
pub trait Backend {
    /// Submit an ordered frame batch for a blink decision.
    fn detect_blink(&self, batch: &[Frame]) -> Result<bool>;

    /// Submit one frame plus its capture timestamp for an identity decision.
    /// The returned message is forwarded verbatim to the presenter.
    fn verify(&self, frame: &Frame) -> Result<String>;

    /// Submit an identity label and image for enrollment.
    fn add_face(&self, person_id: &str, image: Vec<u8>) -> Result<String>;
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FaceGateError::Other(anyhow::anyhow!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn png_part(bytes: Vec<u8>, file_name: String) -> std::result::Result<multipart::Part, reqwest::Error> {
    multipart::Part::bytes(bytes).file_name(file_name).mime_str("image/png")
}

/// The backend replies with JSON; the display text lives in `message`.
/// Anything else is surfaced raw, matching the original client behavior.
fn message_of(body: &serde_json::Value) -> String {
    body.get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

impl Backend for HttpBackend {
    fn detect_blink(&self, batch: &[Frame]) -> Result<bool> {
        let mut form = multipart::Form::new();
        for (i, frame) in batch.iter().enumerate() {
            let part = png_part(frame.png().to_vec(), format!("frame{}.png", i))
                .map_err(|e| FaceGateError::DetectionFailed(e.to_string()))?;
            form = form.part(format!("frame{}", i), part);
        }

        tracing::debug!(frames = batch.len(), "submitting liveness batch");
        let response = self
            .client
            .post(self.endpoint("/api/detect-blink"))
            .multipart(form)
            .send()
            .map_err(|e| FaceGateError::DetectionFailed(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .map_err(|e| FaceGateError::DetectionFailed(e.to_string()))?;

        body.get("blink_detected")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| FaceGateError::DetectionFailed("response missing blink_detected".into()))
    }

    fn verify(&self, frame: &Frame) -> Result<String> {
        let part = png_part(frame.png().to_vec(), "capture.png".to_string())
            .map_err(|e| FaceGateError::SubmissionFailed(e.to_string()))?;
        let form = multipart::Form::new()
            .part("image", part)
            .text("timestamp", frame.captured_at().to_rfc3339());

        tracing::debug!("submitting verification frame");
        let response = self
            .client
            .post(self.endpoint("/api/verify"))
            .multipart(form)
            .send()
            .map_err(|e| FaceGateError::SubmissionFailed(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .map_err(|e| FaceGateError::SubmissionFailed(e.to_string()))?;

        Ok(message_of(&body))
    }

    fn add_face(&self, person_id: &str, image: Vec<u8>) -> Result<String> {
        let part = png_part(image, "enroll.png".to_string())
            .map_err(|e| FaceGateError::SubmissionFailed(e.to_string()))?;
        let form = multipart::Form::new()
            .text("personId", person_id.to_string())
            .part("image", part);

        tracing::debug!(person_id, "submitting enrollment");
        let response = self
            .client
            .post(self.endpoint("/api/add-face"))
            .multipart(form)
            .send()
            .map_err(|e| FaceGateError::SubmissionFailed(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .map_err(|e| FaceGateError::SubmissionFailed(e.to_string()))?;

        Ok(message_of(&body))
    }
}
