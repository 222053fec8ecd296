//! Header and bottom navigation
//!
//! Both components are pure consumers of the state store and router: they
//! keep a local copy of what they display, build their menu from
//! [`visible_menu_items`], and forward selections to [`Router::navigate`].
//! Neither performs any access check; that belongs to the shell's guard.
//!
//! Each component owns its subscriptions and releases them when dropped.

use crate::menu::{visible_menu_items, MenuItem};
use crate::navigation::{Route, Router};
use app_core::AuthService;
use app_state::{Role, StateStore, Subscription, UnreadDisplay, User};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Up to two uppercase initials from a display name
///
/// ```rust
/// use app_ui::chrome::initials;
///
/// assert_eq!(initials("ana maria souza"), "AM");
/// assert_eq!(initials("Bruno"), "B");
/// ```
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

// =============================================================================
// Header
// =============================================================================

#[derive(Debug, Default)]
struct HeaderState {
    user: Option<User>,
    unread_count: u32,
    mobile_menu_open: bool,
}

/// Renderable header model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderView {
    /// Signed-in user's name
    pub user_name: Option<String>,
    /// Avatar initials, `?` without a user
    pub initials: String,
    /// Unread badge
    pub unread_badge: String,
    /// Whether the badge is shown
    pub has_unread: bool,
    /// Navigation entries
    pub menu: Vec<MenuItem>,
    /// Whether the mobile menu is expanded
    pub mobile_menu_open: bool,
}

/// Top navigation bar
pub struct Header {
    state: Arc<Mutex<HeaderState>>,
    router: Arc<Router>,
    auth: AuthService,
    _subscription: Subscription,
}

impl Header {
    /// Mount the header and subscribe to the store
    pub fn mount(store: &StateStore, router: Arc<Router>, auth: AuthService) -> Self {
        let snapshot = store.get_state();
        let state = Arc::new(Mutex::new(HeaderState {
            user: snapshot.session.user,
            unread_count: snapshot.unread_count,
            mobile_menu_open: false,
        }));

        let listener_state = Arc::clone(&state);
        let subscription = store.subscribe(move |app_state| {
            let mut state = listener_state.lock();
            state.user = app_state.session.user.clone();
            state.unread_count = app_state.unread_count;
        });

        Self {
            state,
            router,
            auth,
            _subscription: subscription,
        }
    }

    /// Current header model
    pub fn view(&self) -> HeaderView {
        let state = self.state.lock();
        let badge = UnreadDisplay::from_count(state.unread_count);
        HeaderView {
            user_name: state.user.as_ref().map(|user| user.name.clone()),
            initials: state
                .user
                .as_ref()
                .map(|user| initials(&user.name))
                .filter(|initials| !initials.is_empty())
                .unwrap_or_else(|| "?".to_string()),
            unread_badge: badge.as_display_string(),
            has_unread: badge.has_unread(),
            menu: visible_menu_items(state.user.as_ref().map(|user| user.role)),
            mobile_menu_open: state.mobile_menu_open,
        }
    }

    /// Role of the displayed user
    pub fn role(&self) -> Option<Role> {
        self.state.lock().user.as_ref().map(|user| user.role)
    }

    /// Open or close the mobile menu
    pub fn toggle_mobile_menu(&self) {
        let mut state = self.state.lock();
        state.mobile_menu_open = !state.mobile_menu_open;
    }

    /// Navigate to a menu entry; closes the mobile menu
    pub fn select(&self, route: Route) {
        self.state.lock().mobile_menu_open = false;
        self.router.navigate_to(route);
    }

    /// Logo click
    pub fn open_dashboard(&self) {
        self.router.navigate_to(Route::Dashboard);
    }

    /// Bell click
    pub fn open_notifications(&self) {
        self.router.navigate_to(Route::Chat);
    }

    /// User menu "profile" and "settings" entries
    pub fn open_profile(&self) {
        self.router.navigate_to(Route::Profile);
    }

    /// Sign out, then go home
    pub fn logout(&self) {
        self.state.lock().mobile_menu_open = false;
        self.auth.logout();
        self.router.navigate_to(Route::Home);
    }
}

// =============================================================================
// Bottom Navigation
// =============================================================================

#[derive(Debug, Default)]
struct BottomNavState {
    current_route: Route,
    role: Option<Role>,
}

/// A bottom navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    /// The menu entry
    #[serde(flatten)]
    pub item: MenuItem,
    /// Whether this entry is the current route
    pub active: bool,
}

/// Renderable bottom navigation model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BottomNavView {
    /// Entries in display order
    pub items: Vec<NavEntry>,
}

/// Mobile bottom navigation bar
pub struct BottomNav {
    state: Arc<Mutex<BottomNavState>>,
    router: Arc<Router>,
    _route_subscription: Subscription,
    _state_subscription: Subscription,
}

impl BottomNav {
    /// Mount the bottom navigation and subscribe to router and store
    pub fn mount(store: &StateStore, router: Arc<Router>) -> Self {
        let state = Arc::new(Mutex::new(BottomNavState {
            current_route: router.current_route(),
            role: store.get_state().session.role(),
        }));

        let route_state = Arc::clone(&state);
        let route_subscription = router.subscribe(move |route, _params| {
            route_state.lock().current_route = route.clone();
        });

        let role_state = Arc::clone(&state);
        let state_subscription = store.subscribe(move |app_state| {
            role_state.lock().role = app_state.session.role();
        });

        Self {
            state,
            router,
            _route_subscription: route_subscription,
            _state_subscription: state_subscription,
        }
    }

    /// Current bottom navigation model
    pub fn view(&self) -> BottomNavView {
        let state = self.state.lock();
        let items = visible_menu_items(state.role)
            .into_iter()
            .map(|item| NavEntry {
                active: item.route == state.current_route,
                item,
            })
            .collect();
        BottomNavView { items }
    }

    /// Navigate to an entry
    pub fn select(&self, route: Route) {
        self.router.navigate_to(route);
    }
}
