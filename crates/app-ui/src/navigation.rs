//! Navigation for the marketplace shell
//!
//! This module provides:
//! - The closed set of [`Route`]s and their path mapping
//! - The router's permission table (`requires_auth`, `has_permission`)
//! - The [`Router`]: the single active [`RouteState`] plus change notification
//!
//! There is no history stack; `navigate` replaces the current route.

use app_state::{Observable, Role, Subscription};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Route Parameters
// =============================================================================

/// Parameters for a route
pub type RouteParams = HashMap<String, String>;

/// Parameter carried by `order-detail` and `provider-profile`
pub const ID_PARAM: &str = "id";

// =============================================================================
// Route Definitions
// =============================================================================

/// All navigable views in the application
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Route {
    /// Landing page
    #[default]
    Home,
    /// Login form
    Login,
    /// Account creation form
    Register,
    /// Signed-in landing page
    Dashboard,
    /// Order list
    Orders,
    /// Single order, parameterized by `id`
    OrderDetail,
    /// Publish a new order
    NewOrder,
    /// Provider proposals
    Proposals,
    /// Conversations
    Chat,
    /// Own profile
    Profile,
    /// Administration panel
    Admin,
    /// Public provider profile, parameterized by `id`
    ProviderProfile,
    /// A route name outside the known set
    Unrecognized(String),
}

impl Route {
    /// Every known route, in declaration order
    pub const KNOWN: [Route; 12] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Orders,
        Route::OrderDetail,
        Route::NewOrder,
        Route::Proposals,
        Route::Chat,
        Route::Profile,
        Route::Admin,
        Route::ProviderProfile,
    ];

    /// Kebab-case route name
    pub fn name(&self) -> &str {
        match self {
            Route::Home => "home",
            Route::Login => "login",
            Route::Register => "register",
            Route::Dashboard => "dashboard",
            Route::Orders => "orders",
            Route::OrderDetail => "order-detail",
            Route::NewOrder => "new-order",
            Route::Proposals => "proposals",
            Route::Chat => "chat",
            Route::Profile => "profile",
            Route::Admin => "admin",
            Route::ProviderProfile => "provider-profile",
            Route::Unrecognized(name) => name,
        }
    }

    /// Parse a route name; unknown names become [`Route::Unrecognized`]
    pub fn from_name(name: &str) -> Route {
        Route::KNOWN
            .iter()
            .find(|route| route.name() == name)
            .cloned()
            .unwrap_or_else(|| Route::Unrecognized(name.to_string()))
    }

    /// Whether this route reads an `id` parameter
    pub fn is_parameterized(&self) -> bool {
        matches!(self, Route::OrderDetail | Route::ProviderProfile)
    }

    /// Check if this route requires authentication
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Route::Home
                | Route::Login
                | Route::Register
                | Route::ProviderProfile
                | Route::Unrecognized(_)
        )
    }

    /// Roles allowed to open this route
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Route::NewOrder => &[Role::Client],
            Route::Proposals => &[Role::Provider],
            Route::Admin => &[Role::Admin],
            _ => &Role::ALL,
        }
    }

    /// Check if `role` may open this route
    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    /// Get the URL path for this route
    pub fn to_path(&self, params: &RouteParams) -> String {
        let id = params.get(ID_PARAM).filter(|id| !id.is_empty());
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Orders => "/orders".to_string(),
            Route::OrderDetail => match id {
                Some(id) => format!("/orders/{}", urlencoding::encode(id)),
                None => "/orders".to_string(),
            },
            Route::NewOrder => "/orders/new".to_string(),
            Route::Proposals => "/proposals".to_string(),
            Route::Chat => "/chat".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::ProviderProfile => match id {
                Some(id) => format!("/providers/{}", urlencoding::encode(id)),
                None => "/providers".to_string(),
            },
            Route::Unrecognized(name) => format!("/{}", urlencoding::encode(name)),
        }
    }

    /// Get a display title for this route
    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Log In",
            Route::Register => "Create Account",
            Route::Dashboard => "Dashboard",
            Route::Orders => "My Orders",
            Route::OrderDetail => "Order",
            Route::NewOrder => "Publish Order",
            Route::Proposals => "Proposals",
            Route::Chat => "Messages",
            Route::Profile => "My Profile",
            Route::Admin => "Admin Panel",
            Route::ProviderProfile => "Provider",
            Route::Unrecognized(_) => "Home",
        }
    }
}

impl From<String> for Route {
    fn from(name: String) -> Self {
        Route::from_name(&name)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.name().to_string()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Route State
// =============================================================================

/// The single active route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteState {
    /// Current route
    pub route: Route,
    /// Path parameters; empty for routes that take none
    #[serde(default)]
    pub params: RouteParams,
}

impl RouteState {
    /// Build a state, dropping parameters the route does not read
    pub fn new(route: Route, params: RouteParams) -> Self {
        let params = if route.is_parameterized() {
            params
        } else {
            RouteParams::new()
        };
        Self { route, params }
    }

    /// The `id` parameter, if present
    pub fn id(&self) -> Option<&str> {
        self.params.get(ID_PARAM).map(String::as_str)
    }
}

// =============================================================================
// Path Matching
// =============================================================================

/// Route pattern for matching
struct RoutePattern {
    /// Pattern segments
    segments: Vec<PatternSegment>,
    /// Route produced on match
    route: Route,
}

/// Segment type in a pattern
#[derive(Debug, Clone)]
enum PatternSegment {
    /// Literal segment
    Literal(String),
    /// Parameter segment
    Param(String),
}

fn route_patterns() -> Vec<RoutePattern> {
    let mut patterns = Vec::new();
    let mut add = |pattern: &str, route: Route| {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(param) => PatternSegment::Param(param.to_string()),
                None => PatternSegment::Literal(s.to_string()),
            })
            .collect();
        patterns.push(RoutePattern { segments, route });
    };

    add("/", Route::Home);
    add("/login", Route::Login);
    add("/register", Route::Register);
    add("/dashboard", Route::Dashboard);
    add("/orders", Route::Orders);
    // Literal before parameter so "new" is never taken for an order id
    add("/orders/new", Route::NewOrder);
    add("/orders/:id", Route::OrderDetail);
    add("/proposals", Route::Proposals);
    add("/chat", Route::Chat);
    add("/profile", Route::Profile);
    add("/admin", Route::Admin);
    add("/providers/:id", Route::ProviderProfile);
    patterns
}

/// Match a pattern against path segments
fn match_pattern(pattern: &[PatternSegment], path: &[&str]) -> Option<RouteParams> {
    if pattern.len() != path.len() {
        return None;
    }

    let mut params = RouteParams::new();
    for (segment, actual) in pattern.iter().zip(path.iter()) {
        match segment {
            PatternSegment::Literal(expected) => {
                if expected != actual {
                    return None;
                }
            }
            PatternSegment::Param(name) => {
                params.insert(name.clone(), urlencoding::decode(actual).ok()?.into_owned());
            }
        }
    }
    Some(params)
}

// =============================================================================
// Router
// =============================================================================

/// Client-side router
///
/// Holds the current [`RouteState`], notifies subscribers on every
/// navigation and owns the permission table.
///
/// # Example
///
/// ```rust
/// use app_ui::navigation::{Route, Router};
/// use app_state::Role;
///
/// let router = Router::new();
/// let _sub = router.subscribe(|route, _params| println!("now at {route}"));
///
/// router.navigate_path("/orders/42");
/// assert_eq!(router.current_route(), Route::OrderDetail);
/// assert_eq!(router.params().get("id").map(String::as_str), Some("42"));
///
/// assert!(router.requires_auth(&Route::Orders));
/// assert!(!router.has_permission(&Route::Admin, Role::Client));
/// ```
pub struct Router {
    state: Mutex<RouteState>,
    changes: Observable<RouteState>,
    patterns: Vec<RoutePattern>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("state", &*self.state.lock())
            .field("subscribers", &self.changes.listener_count())
            .finish()
    }
}

impl Router {
    /// Create a router positioned at `home`
    pub fn new() -> Self {
        Self::with_initial(RouteState::default())
    }

    /// Create a router positioned at `initial`
    pub fn with_initial(initial: RouteState) -> Self {
        Self {
            state: Mutex::new(initial),
            changes: Observable::new(),
            patterns: route_patterns(),
        }
    }

    /// Current route name
    pub fn current_route(&self) -> Route {
        self.state.lock().route.clone()
    }

    /// Current path parameters
    pub fn params(&self) -> RouteParams {
        self.state.lock().params.clone()
    }

    /// Current route and parameters
    pub fn state(&self) -> RouteState {
        self.state.lock().clone()
    }

    /// Navigate to a route and notify subscribers
    pub fn navigate(&self, route: Route, params: RouteParams) {
        let next = RouteState::new(route, params);
        tracing::debug!(route = %next.route, params = ?next.params, "navigate");
        *self.state.lock() = next.clone();
        self.changes.emit(next);
    }

    /// Navigate to a route that takes no parameters
    pub fn navigate_to(&self, route: Route) {
        self.navigate(route, RouteParams::new());
    }

    /// Navigate by route name
    pub fn navigate_name(&self, name: &str, params: RouteParams) {
        self.navigate(Route::from_name(name), params);
    }

    /// Navigate to the route matching a URL path
    pub fn navigate_path(&self, path: &str) {
        let (route, params) = self.match_path(path);
        self.navigate(route, params);
    }

    /// Register a listener invoked with `(route, params)` on every navigation
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Route, &RouteParams) + Send + Sync + 'static,
    {
        self.changes
            .subscribe(move |state: &RouteState| listener(&state.route, &state.params))
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.changes.listener_count()
    }

    /// Check if `route` requires a signed-in user
    pub fn requires_auth(&self, route: &Route) -> bool {
        route.requires_auth()
    }

    /// Check if `role` may open `route`
    pub fn has_permission(&self, route: &Route, role: Role) -> bool {
        route.permits(role)
    }

    /// Match a path to a route
    ///
    /// Query strings and fragments are ignored. Unmatched paths yield
    /// [`Route::Unrecognized`] carrying the trimmed path.
    pub fn match_path(&self, path: &str) -> (Route, RouteParams) {
        let pathname = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let path_segments: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();

        for pattern in &self.patterns {
            if let Some(params) = match_pattern(&pattern.segments, &path_segments) {
                return (pattern.route.clone(), params);
            }
        }

        (
            Route::Unrecognized(pathname.trim_matches('/').to_string()),
            RouteParams::new(),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
