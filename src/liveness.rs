//! Liveness challenge runner and bounded retry orchestration.
//!
//! One attempt collects a fixed-size frame batch at a fixed cadence, submits
//! it atomically, and interprets the blink decision. The orchestrator wraps
//! attempts in a bounded retry loop with an inter-attempt delay, reporting
//! every stage transition to an observer. All pacing goes through [`Pacer`]
//! so tests drive the whole machine with zero real delay.

use crate::api::Backend;
use crate::camera::{Frame, FrameSource};
use crate::config::LivenessConfig;
use crate::error::{FaceGateError, Result};
use std::time::Duration;

/// Injectable wait capability.
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

/// Real pacing via thread sleep.
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Stage of one verification run. Reported on every transition; the
/// presenter maps each stage to exactly one status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Attempting { n: u32, max: u32 },
    Succeeded,
    Exhausted,
    Submitting,
    Decision(String),
    Failed(FailureKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Capture,
    Detection,
    Submission,
}

impl FailureKind {
    /// Classify an error for presentation. Returns `None` for errors that
    /// are not part of the run taxonomy and should propagate as-is.
    pub fn of(err: &FaceGateError) -> Option<FailureKind> {
        match err {
            FaceGateError::CaptureUnavailable(_) => Some(FailureKind::Capture),
            FaceGateError::DetectionFailed(_) => Some(FailureKind::Detection),
            FaceGateError::SubmissionFailed(_) => Some(FailureKind::Submission),
            _ => None,
        }
    }
}

/// Terminal outcome of a bounded retry session. `Exhausted` runs report
/// `confirmed = false`; both are normal terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub confirmed: bool,
    pub attempts_used: u32,
}

/// One liveness attempt: capture exactly `batch_size` frames with
/// `sample_interval_ms` between captures, then submit the ordered batch
/// as a single request.
pub struct ChallengeRunner<'a, S: FrameSource, B: Backend> {
    source: &'a mut S,
    backend: &'a B,
    batch_size: usize,
    sample_interval: Duration,
}

impl<'a, S: FrameSource, B: Backend> ChallengeRunner<'a, S, B> {
    pub fn new(source: &'a mut S, backend: &'a B, config: &LivenessConfig) -> Self {
        Self {
            source,
            backend,
            batch_size: config.batch_size,
            sample_interval: Duration::from_millis(config.sample_interval_ms),
        }
    }

    /// A lost frame aborts the batch; a short batch is never submitted.
    pub fn run_once(&mut self, pacer: &mut dyn Pacer) -> Result<bool> {
        let mut batch: Vec<Frame> = Vec::with_capacity(self.batch_size);
        for i in 0..self.batch_size {
            if i > 0 {
                pacer.pause(self.sample_interval);
            }
            batch.push(self.source.capture()?);
        }
        self.backend.detect_blink(&batch)
    }
}

/// Bounded retry loop around the challenge runner.
///
/// States: `Attempting(n)` transitions to `Succeeded` on a confirmed blink,
/// to `Attempting(n + 1)` on a clean negative while attempts remain, and to
/// `Exhausted` when the final attempt comes back negative. Capture and
/// detection failures abort the whole run immediately.
pub struct RetryOrchestrator<'a, S: FrameSource, B: Backend> {
    runner: ChallengeRunner<'a, S, B>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<'a, S: FrameSource, B: Backend> RetryOrchestrator<'a, S, B> {
    pub fn new(source: &'a mut S, backend: &'a B, config: &LivenessConfig) -> Self {
        Self {
            runner: ChallengeRunner::new(source, backend, config),
            // the attempt counter starts at 1; a run always makes at least
            // one attempt even if the config slipped past validation
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Runs at most `max_attempts` challenges, pausing between attempts to
    /// give the subject time to blink. At most one challenge is in flight
    /// at a time.
    pub fn run_with_retries(
        &mut self,
        pacer: &mut dyn Pacer,
        observe: &mut dyn FnMut(&Stage),
    ) -> Result<RunOutcome> {
        let max = self.max_attempts;
        for n in 1..=max {
            observe(&Stage::Attempting { n, max });
            tracing::debug!(attempt = n, max, "running liveness challenge");

            if self.runner.run_once(pacer)? {
                observe(&Stage::Succeeded);
                return Ok(RunOutcome { confirmed: true, attempts_used: n });
            }

            if n < max {
                pacer.pause(self.retry_delay);
            }
        }

        observe(&Stage::Exhausted);
        Ok(RunOutcome { confirmed: false, attempts_used: max })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Frames tagged with their capture ordinal so tests can tell which
    /// frame reached the backend.
    pub struct ScriptedSource {
        pub captures: usize,
        pub fail_at: Option<usize>,
    }

    impl ScriptedSource {
        pub fn new() -> Self {
            Self { captures: 0, fail_at: None }
        }

        pub fn failing_at(capture: usize) -> Self {
            Self { captures: 0, fail_at: Some(capture) }
        }
    }

    impl FrameSource for ScriptedSource {
        fn capture(&mut self) -> Result<Frame> {
            self.captures += 1;
            if self.fail_at == Some(self.captures) {
                return Err(FaceGateError::CaptureUnavailable("device lost".into()));
            }
            Ok(Frame::new(vec![self.captures as u8]))
        }
    }

    /// Backend double with a scripted decision sequence and call recording.
    pub struct ScriptedBackend {
        decisions: RefCell<VecDeque<Result<bool>>>,
        pub batch_sizes: RefCell<Vec<usize>>,
        pub verify_frames: RefCell<Vec<Vec<u8>>>,
        pub verify_reply: RefCell<Option<Result<String>>>,
        pub add_face_calls: Cell<usize>,
        pub add_face_ids: RefCell<Vec<String>>,
    }

    impl ScriptedBackend {
        pub fn with_decisions(decisions: Vec<Result<bool>>) -> Self {
            Self {
                decisions: RefCell::new(decisions.into()),
                batch_sizes: RefCell::new(Vec::new()),
                verify_frames: RefCell::new(Vec::new()),
                verify_reply: RefCell::new(None),
                add_face_calls: Cell::new(0),
                add_face_ids: RefCell::new(Vec::new()),
            }
        }

        pub fn detect_calls(&self) -> usize {
            self.batch_sizes.borrow().len()
        }

        pub fn verify_calls(&self) -> usize {
            self.verify_frames.borrow().len()
        }
    }

    impl Backend for ScriptedBackend {
        fn detect_blink(&self, batch: &[Frame]) -> Result<bool> {
            self.batch_sizes.borrow_mut().push(batch.len());
            self.decisions
                .borrow_mut()
                .pop_front()
                .unwrap_or(Ok(false))
        }

        fn verify(&self, frame: &Frame) -> Result<String> {
            self.verify_frames.borrow_mut().push(frame.png().to_vec());
            match self.verify_reply.borrow_mut().take() {
                Some(reply) => reply,
                None => Ok("Face verified: alice".to_string()),
            }
        }

        fn add_face(&self, person_id: &str, _image: Vec<u8>) -> Result<String> {
            self.add_face_calls.set(self.add_face_calls.get() + 1);
            self.add_face_ids.borrow_mut().push(person_id.to_string());
            Ok("Face added successfully".to_string())
        }
    }

    /// Records every pause instead of sleeping.
    pub struct RecordingPacer {
        pub pauses: Vec<Duration>,
    }

    impl RecordingPacer {
        pub fn new() -> Self {
            Self { pauses: Vec::new() }
        }
    }

    impl Pacer for RecordingPacer {
        fn pause(&mut self, duration: Duration) {
            self.pauses.push(duration);
        }
    }
}
