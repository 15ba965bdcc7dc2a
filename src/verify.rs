//! End-to-end verification session: bounded liveness retries, then a single
//! identity submission with a post-success frame.

use crate::api::Backend;
use crate::camera::FrameSource;
use crate::config::LivenessConfig;
use crate::error::Result;
use crate::liveness::{Pacer, RetryOrchestrator, RunOutcome, Stage};

/// What a completed (non-aborted) session reports. A run that exhausted its
/// attempts has no decision; a confirmed run carries the backend's verbatim
/// decision message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub outcome: RunOutcome,
    pub decision: Option<String>,
}

pub struct VerificationSession<'a, S: FrameSource, B: Backend> {
    source: &'a mut S,
    backend: &'a B,
    config: &'a LivenessConfig,
}

impl<'a, S: FrameSource, B: Backend> VerificationSession<'a, S, B> {
    pub fn new(source: &'a mut S, backend: &'a B, config: &'a LivenessConfig) -> Self {
        Self { source, backend, config }
    }

    /// Drives one full run. The submitter fires at most once, only after the
    /// orchestrator reports a confirmed blink, and never resubmits: a failed
    /// submission is terminal for the run and retry is left to the user.
    pub fn run(
        &mut self,
        pacer: &mut dyn Pacer,
        observe: &mut dyn FnMut(&Stage),
    ) -> Result<SessionResult> {
        let outcome = {
            let mut orchestrator =
                RetryOrchestrator::new(&mut *self.source, self.backend, self.config);
            orchestrator.run_with_retries(pacer, observe)?
        };

        if !outcome.confirmed {
            return Ok(SessionResult { outcome, decision: None });
        }

        observe(&Stage::Submitting);
        let frame = self.source.capture()?;
        let message = self.backend.verify(&frame)?;
        tracing::info!(attempts = outcome.attempts_used, "verification decision received");
        observe(&Stage::Decision(message.clone()));

        Ok(SessionResult { outcome, decision: Some(message) })
    }
}
