//! Pure projection from run stage to user-visible status text. One line per
//! stage, overwritten on every transition; this is presentation state, not a
//! log.

use crate::liveness::{FailureKind, Stage};

pub fn status_message(stage: &Stage) -> String {
    match stage {
        Stage::Idle => "Ready. Look at the camera and blink when prompted.".to_string(),
        Stage::Attempting { n, max } => format!("Checking liveness... attempt {} of {}", n, max),
        Stage::Succeeded => "Blink detected.".to_string(),
        Stage::Exhausted => "No blink detected. Please try again.".to_string(),
        Stage::Submitting => "Verifying identity...".to_string(),
        Stage::Decision(message) => message.clone(),
        Stage::Failed(FailureKind::Capture) => {
            "Camera unavailable. Check the device and retry.".to_string()
        }
        Stage::Failed(FailureKind::Detection) => "Liveness check failed. Please retry.".to_string(),
        Stage::Failed(FailureKind::Submission) => "Verification failed.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_stage() -> Vec<Stage> {
        vec![
            Stage::Idle,
            Stage::Attempting { n: 2, max: 3 },
            Stage::Succeeded,
            Stage::Exhausted,
            Stage::Submitting,
            Stage::Decision("Face verified: alice".to_string()),
            Stage::Failed(FailureKind::Capture),
            Stage::Failed(FailureKind::Detection),
            Stage::Failed(FailureKind::Submission),
        ]
    }

    #[test]
    fn every_stage_has_a_distinct_message() {
        let messages: Vec<String> = every_stage().iter().map(status_message).collect();
        for message in &messages {
            assert!(!message.is_empty());
        }
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn attempt_progress_names_both_numbers() {
        let message = status_message(&Stage::Attempting { n: 2, max: 3 });
        assert_eq!(message, "Checking liveness... attempt 2 of 3");
    }

    #[test]
    fn decision_text_is_forwarded_verbatim() {
        let message = status_message(&Stage::Decision("Face verified: bob".to_string()));
        assert_eq!(message, "Face verified: bob");
    }

    #[test]
    fn exhaustion_asks_for_another_try() {
        assert_eq!(status_message(&Stage::Exhausted), "No blink detected. Please try again.");
        assert_eq!(status_message(&Stage::Succeeded), "Blink detected.");
    }
}
