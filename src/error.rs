use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaceGateError {
    #[error("Camera unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("Liveness detection failed: {0}")]
    DetectionFailed(String),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Access denied: {0}")]
    AuthDenied(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FaceGateError>;
