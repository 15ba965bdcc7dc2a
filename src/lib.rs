// Core modules
pub mod api;
pub mod camera;
pub mod config;
pub mod enroll;
pub mod error;
pub mod gate;
pub mod liveness;
pub mod presenter;
pub mod routes;
pub mod verify;

// Re-export commonly used types
pub use api::{Backend, HttpBackend};
pub use camera::{Camera, CameraSession, Frame, FrameSource};
pub use config::Config;
pub use enroll::{EnrollOutcome, EnrollmentForm};
pub use error::{FaceGateError, Result};
pub use gate::{AccessGate, AdminPredicate, Admission, AuthProvider, Identity};
pub use liveness::{
    ChallengeRunner, FailureKind, Pacer, RetryOrchestrator, RunOutcome, SleepPacer, Stage,
};
pub use routes::Route;
pub use verify::{SessionResult, VerificationSession};
