//! Admin access gate: authentication result plus an admin-eligibility
//! predicate decide admission to the enrollment surface.

use crate::error::{FaceGateError, Result};
use serde::{Deserialize, Serialize};

/// The authenticated actor's claim, produced by the external identity
/// provider. Consumed read-only; the gate never fabricates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

/// Credential operations supplied by the external identity collaborator.
/// Injected so the gate can be exercised with test doubles.
pub trait AuthProvider {
    fn sign_in_with_password(&mut self, email: &str, password: &str) -> Result<Identity>;
    fn sign_in_with_provider(&mut self) -> Result<Identity>;
    fn sign_out(&mut self);
}

/// Admin-eligibility rule. Configuration rather than code: deployments have
/// used an exact-domain check and a substring check, and swapping between
/// them must not touch the gate's control flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AdminPredicate {
    ExactDomain(String),
    Contains(String),
}

impl AdminPredicate {
    pub fn allows(&self, email: &str) -> bool {
        match self {
            AdminPredicate::ExactDomain(domain) => email
                .rsplit_once('@')
                .map(|(_, d)| d == domain.as_str())
                .unwrap_or(false),
            AdminPredicate::Contains(needle) => email.contains(needle.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admit(Identity),
    Deny(String),
}

impl Admission {
    /// Hard-error form for callers that require admission.
    pub fn into_identity(self) -> Result<Identity> {
        match self {
            Admission::Admit(identity) => Ok(identity),
            Admission::Deny(reason) => Err(FaceGateError::AuthDenied(reason)),
        }
    }
}

pub struct AccessGate<'a, P: AuthProvider> {
    provider: &'a mut P,
    predicate: AdminPredicate,
}

impl<'a, P: AuthProvider> AccessGate<'a, P> {
    pub fn new(provider: &'a mut P, predicate: AdminPredicate) -> Self {
        Self { provider, predicate }
    }

    pub fn login_with_password(&mut self, email: &str, password: &str) -> Admission {
        let credential = self.provider.sign_in_with_password(email, password);
        self.authorize_admin(credential)
    }

    pub fn login_with_provider(&mut self) -> Admission {
        let credential = self.provider.sign_in_with_provider();
        self.authorize_admin(credential)
    }

    /// An authenticated identity that fails the admin check is signed out
    /// before the denial is observable; an unauthorized session must never
    /// persist.
    pub fn authorize_admin(&mut self, credential: Result<Identity>) -> Admission {
        match credential {
            Ok(identity) if self.predicate.allows(&identity.email) => {
                tracing::info!(email = %identity.email, "admin admitted");
                Admission::Admit(identity)
            }
            Ok(identity) => {
                tracing::warn!(email = %identity.email, "identity failed admin check, signing out");
                self.provider.sign_out();
                Admission::Deny("Access denied. Admin login only.".to_string())
            }
            Err(err) => Admission::Deny(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the order of provider calls so tests can assert the forced
    /// sign-out happens before a denial is observable.
    struct StubProvider {
        events: Vec<String>,
        fail_with: Option<String>,
    }

    impl StubProvider {
        fn new() -> Self {
            Self { events: Vec::new(), fail_with: None }
        }

        fn failing(message: &str) -> Self {
            Self { events: Vec::new(), fail_with: Some(message.to_string()) }
        }
    }

    impl AuthProvider for StubProvider {
        fn sign_in_with_password(&mut self, email: &str, _password: &str) -> Result<Identity> {
            self.events.push("sign_in".to_string());
            match &self.fail_with {
                Some(message) => Err(FaceGateError::AuthFailed(message.clone())),
                None => Ok(Identity { email: email.to_string() }),
            }
        }

        fn sign_in_with_provider(&mut self) -> Result<Identity> {
            self.events.push("sign_in_provider".to_string());
            Ok(Identity { email: "someone@gmail.com".to_string() })
        }

        fn sign_out(&mut self) {
            self.events.push("sign_out".to_string());
        }
    }

    fn contains_faceauth() -> AdminPredicate {
        AdminPredicate::Contains("faceauth.com".to_string())
    }

    #[test]
    fn admin_email_is_admitted() {
        let mut provider = StubProvider::new();
        let mut gate = AccessGate::new(&mut provider, contains_faceauth());

        let admission = gate.login_with_password("admin@faceauth.com", "pw");
        assert_eq!(
            admission,
            Admission::Admit(Identity { email: "admin@faceauth.com".to_string() })
        );
        assert_eq!(provider.events, vec!["sign_in"]);
    }

    #[test]
    fn non_admin_is_denied_and_signed_out() {
        let mut provider = StubProvider::new();
        let mut gate = AccessGate::new(&mut provider, contains_faceauth());

        let admission = gate.login_with_password("user@example.com", "pw");
        assert_eq!(admission, Admission::Deny("Access denied. Admin login only.".to_string()));
        // sign-out was already forced by the time the denial came back
        assert_eq!(provider.events, vec!["sign_in", "sign_out"]);
    }

    #[test]
    fn auth_failure_denies_without_sign_out() {
        let mut provider = StubProvider::failing("wrong password");
        let mut gate = AccessGate::new(&mut provider, contains_faceauth());

        let admission = gate.login_with_password("admin@faceauth.com", "pw");
        match admission {
            Admission::Deny(reason) => assert!(reason.contains("wrong password")),
            Admission::Admit(_) => panic!("auth failure must not admit"),
        }
        // no session was established, so there is nothing to sign out
        assert_eq!(provider.events, vec!["sign_in"]);
    }

    #[test]
    fn provider_login_goes_through_same_gate() {
        let mut provider = StubProvider::new();
        let mut gate = AccessGate::new(&mut provider, contains_faceauth());

        let admission = gate.login_with_provider();
        assert!(matches!(admission, Admission::Deny(_)));
        assert_eq!(provider.events, vec!["sign_in_provider", "sign_out"]);
    }

    #[test]
    fn exact_domain_rejects_lookalike_domains() {
        let predicate = AdminPredicate::ExactDomain("faceauth.com".to_string());
        assert!(predicate.allows("admin@faceauth.com"));
        assert!(!predicate.allows("admin@faceauth.com.evil.com"));
        assert!(!predicate.allows("no-at-sign"));

        // The substring variant is looser on purpose; the gate flow is
        // identical either way.
        let contains = contains_faceauth();
        assert!(contains.allows("admin@faceauth.com.evil.com"));
    }

    #[test]
    fn denial_converts_to_auth_denied_error() {
        let denied = Admission::Deny("Access denied. Admin login only.".to_string());
        assert!(matches!(denied.into_identity(), Err(FaceGateError::AuthDenied(_))));

        let admitted = Admission::Admit(Identity { email: "admin@faceauth.com".to_string() });
        assert!(admitted.into_identity().is_ok());
    }
}
