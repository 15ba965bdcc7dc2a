//! Admin enrollment: validate the form locally, then submit the identity
//! label and image to the enrollment endpoint.

use crate::api::Backend;
use crate::error::Result;

/// Enrollment input as collected from the admin surface.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentForm {
    pub person_id: String,
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// Local validation failed; no request was sent.
    Rejected(String),
    /// The backend accepted the enrollment; carries its message verbatim.
    Enrolled(String),
}

/// An incomplete form never reaches the network.
pub fn submit_enrollment<B: Backend>(backend: &B, form: EnrollmentForm) -> Result<EnrollOutcome> {
    let person_id = form.person_id.trim().to_string();
    let image = match form.image {
        Some(image) if !image.is_empty() && !person_id.is_empty() => image,
        _ => {
            return Ok(EnrollOutcome::Rejected(
                "Please provide both Person ID and an image.".to_string(),
            ))
        }
    };

    tracing::debug!(person_id = %person_id, bytes = image.len(), "submitting enrollment form");
    let message = backend.add_face(&person_id, image)?;
    Ok(EnrollOutcome::Enrolled(message))
}
