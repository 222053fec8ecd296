//! Route guard
//!
//! Authentication is checked strictly before authorization: a visitor without
//! an identity is always sent to login, never told access is denied.

use crate::navigation::{Route, Router};
use app_state::Role;
use thiserror::Error;

/// Reasons a route may not be shown
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Protected route without a signed-in user
    #[error("authentication required for {0}")]
    Unauthenticated(Route),

    /// Signed-in user whose role may not open the route
    #[error("{role} may not open {route}")]
    Forbidden {
        /// Requested route
        route: Route,
        /// Role of the signed-in user
        role: Role,
    },
}

impl AccessError {
    /// Route the guard redirects to for this error
    pub fn redirect_target(&self) -> Route {
        match self {
            AccessError::Unauthenticated(_) => Route::Login,
            AccessError::Forbidden { .. } => Route::Dashboard,
        }
    }
}

/// Result type for guard checks
pub type Result<T> = std::result::Result<T, AccessError>;

/// Check whether `route` may be shown
///
/// `authenticated` must already account for sessions that are flagged
/// authenticated but carry no user; see [`app_state::Session::has_identity`].
pub fn check_access(
    router: &Router,
    route: &Route,
    authenticated: bool,
    role: Option<Role>,
) -> Result<()> {
    if router.requires_auth(route) && !authenticated {
        return Err(AccessError::Unauthenticated(route.clone()));
    }

    if let Some(role) = role {
        if !router.has_permission(route, role) {
            return Err(AccessError::Forbidden {
                route: route.clone(),
                role,
            });
        }
    }

    Ok(())
}
