//! Surface resolution: which screen a path lands on, and whether the actor
//! may land on the admin one.

use crate::gate::{AdminPredicate, Identity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Verify,
    AdminLogin,
    Admin,
}

/// Unknown paths always fall back to the verification surface.
pub fn resolve(path: &str) -> Route {
    match path.trim_end_matches('/') {
        "/login" => Route::AdminLogin,
        "/admin" => Route::Admin,
        _ => Route::Verify,
    }
}

/// Route admission: the enrollment surface requires an admitted identity.
/// Anyone else asking for it is sent to the login surface instead.
pub fn resolve_admitted(
    path: &str,
    session: Option<&Identity>,
    predicate: &AdminPredicate,
) -> Route {
    match resolve(path) {
        Route::Admin => match session {
            Some(identity) if predicate.allows(&identity.email) => Route::Admin,
            _ => Route::AdminLogin,
        },
        route => route,
    }
}
