mod v4l2;

pub use v4l2::{Camera, CameraSession};

use crate::error::Result;
use chrono::{DateTime, Utc};

/// One still sample: PNG bytes plus the moment it was taken. Frames are
/// immutable after capture and discarded once submitted.
#[derive(Debug, Clone)]
pub struct Frame {
    png: Vec<u8>,
    captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(png: Vec<u8>) -> Self {
        Self { png, captured_at: Utc::now() }
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// On-demand still capture from the device. No retry logic lives here;
/// failed captures surface immediately and the retry orchestrator decides
/// what happens next.
pub trait FrameSource {
    fn capture(&mut self) -> Result<Frame>;
}
