//! Root application component
//!
//! [`AppShell`] decides, for the current route and session, whether to show
//! the requested view, redirect, or show the loading indicator. It keeps a
//! local snapshot of the store and router, refreshed by subscriptions it owns.
//!
//! # Lifecycle
//!
//! 1. [`AppShell::new`]: renders [`Frame::Loading`]; nothing is subscribed.
//! 2. [`AppShell::start`]: runs the data bootstrap, snapshots the session,
//!    leaves the loading state, subscribes to store and router, then runs the
//!    guard once. Runs at most once.
//! 3. [`AppShell::unmount`] (or drop): releases both subscriptions.
//!
//! # Guard
//!
//! The guard runs whenever the route, the authenticated flag or the user's
//! role changes. A protected route without an identity redirects to
//! `login`; a route the role may not open posts one error toast and
//! redirects to `dashboard`. A frame rendered for a route that is about to
//! be redirected carries [`Content::Redirecting`] instead of the view.

use crate::guard::{check_access, AccessError};
use crate::navigation::{Route, RouteParams, Router, ID_PARAM};
use crate::notify::Notifier;
use app_core::DataBootstrap;
use app_state::{AppState, Observable, Role, StateStore, Subscription};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

// =============================================================================
// Views
// =============================================================================

/// Views the shell can dispatch to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum View {
    /// Landing page
    Home,
    /// Login form
    Login,
    /// Account creation form
    Register,
    /// Signed-in landing page
    Dashboard,
    /// Order list
    Orders,
    /// Single order
    #[serde(rename_all = "camelCase")]
    OrderDetail {
        /// The `id` route parameter, passed through unchanged
        order_id: Option<String>,
    },
    /// Publish an order
    NewOrder,
    /// Provider proposals
    Proposals,
    /// Conversations
    Chat,
    /// Own profile
    Profile,
    /// Administration panel
    Admin,
    /// Public provider profile
    #[serde(rename_all = "camelCase")]
    ProviderProfile {
        /// The `id` route parameter, passed through unchanged
        provider_id: Option<String>,
    },
}

/// Map a route to its view
///
/// `login` and `register` show the dashboard to an authenticated user.
/// Unrecognized routes show the home view.
pub fn dispatch_view(route: &Route, params: &RouteParams, authenticated: bool) -> View {
    let id = || params.get(ID_PARAM).cloned();
    match route {
        Route::Home => View::Home,
        Route::Login if authenticated => View::Dashboard,
        Route::Login => View::Login,
        Route::Register if authenticated => View::Dashboard,
        Route::Register => View::Register,
        Route::Dashboard => View::Dashboard,
        Route::Orders => View::Orders,
        Route::OrderDetail => View::OrderDetail { order_id: id() },
        Route::NewOrder => View::NewOrder,
        Route::Proposals => View::Proposals,
        Route::Chat => View::Chat,
        Route::Profile => View::Profile,
        Route::Admin => View::Admin,
        Route::ProviderProfile => View::ProviderProfile { provider_id: id() },
        Route::Unrecognized(_) => View::Home,
    }
}

// =============================================================================
// Chrome
// =============================================================================

/// Which persistent navigation bars are shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeVisibility {
    /// Top header
    pub header: bool,
    /// Mobile bottom navigation
    pub bottom_nav: bool,
}

/// Compute chrome visibility for a route
pub fn chrome_visibility(route: &Route, authenticated: bool) -> ChromeVisibility {
    let auth_form = matches!(route, Route::Login | Route::Register);
    ChromeVisibility {
        header: !auth_form,
        bottom_nav: authenticated && !auth_form,
    }
}

// =============================================================================
// Frames
// =============================================================================

/// Main content of a ready frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Content {
    /// The dispatched view
    View {
        /// View to show
        #[serde(flatten)]
        view: View,
    },
    /// The current route is being redirected away from
    Redirecting {
        /// Redirect target
        to: Route,
    },
}

/// Render output of the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Frame {
    /// Before the first session snapshot
    Loading,
    /// Normal frame
    #[serde(rename_all = "camelCase")]
    Ready {
        /// Current route
        route: Route,
        /// Chrome visibility
        chrome: ChromeVisibility,
        /// Main content
        content: Content,
    },
}

impl Frame {
    /// The dispatched view, if this frame shows one
    pub fn view(&self) -> Option<&View> {
        match self {
            Frame::Ready {
                content: Content::View { view },
                ..
            } => Some(view),
            _ => None,
        }
    }

    /// Chrome visibility, if ready
    pub fn chrome(&self) -> Option<ChromeVisibility> {
        match self {
            Frame::Ready { chrome, .. } => Some(*chrome),
            Frame::Loading => None,
        }
    }
}

// =============================================================================
// Options and Context
// =============================================================================

/// Shell behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellOptions {
    /// Toast text shown when a role may not open a route
    pub access_denied_message: String,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            access_denied_message: "Access denied".to_string(),
        }
    }
}

/// Collaborators the shell consumes
#[derive(Clone)]
pub struct ShellContext {
    /// Global state store
    pub store: Arc<StateStore>,
    /// Router
    pub router: Arc<Router>,
    /// Toast capability
    pub notifier: Arc<dyn Notifier>,
    /// Data bootstrap run at start
    pub bootstrap: Arc<dyn DataBootstrap>,
}

// =============================================================================
// Shell
// =============================================================================

/// Local view state
#[derive(Debug, Clone)]
struct Snapshot {
    current_route: Route,
    route_params: RouteParams,
    is_authenticated: bool,
    user_type: Option<Role>,
    is_loading: bool,
}

impl Snapshot {
    /// An authenticated flag without a role is not trusted
    fn authenticated(&self) -> bool {
        self.is_authenticated && self.user_type.is_some()
    }

    fn guard_inputs(&self) -> (Route, bool, Option<Role>) {
        (
            self.current_route.clone(),
            self.authenticated(),
            self.user_type,
        )
    }
}

/// State reachable from subscription callbacks
struct Inner {
    snapshot: Mutex<Snapshot>,
    router: Arc<Router>,
    notifier: Arc<dyn Notifier>,
    options: ShellOptions,
    frames: Observable<Frame>,
}

impl Inner {
    fn on_state_change(&self, state: &AppState) {
        let changed = {
            let mut snapshot = self.snapshot.lock();
            let before = snapshot.guard_inputs();
            snapshot.is_authenticated = state.session.is_authenticated;
            snapshot.user_type = state.session.role();
            snapshot.guard_inputs() != before
        };
        if changed {
            self.evaluate_guard();
        }
        self.publish();
    }

    fn on_route_change(&self, route: &Route, params: &RouteParams) {
        let changed = {
            let mut snapshot = self.snapshot.lock();
            let changed = snapshot.current_route != *route;
            snapshot.current_route = route.clone();
            snapshot.route_params = params.clone();
            changed
        };
        if changed {
            self.evaluate_guard();
        }
        self.publish();
    }

    /// Run the guard against the snapshot and redirect if it fails
    fn evaluate_guard(&self) {
        let (route, authenticated, role) = {
            let snapshot = self.snapshot.lock();
            if snapshot.is_loading {
                return;
            }
            snapshot.guard_inputs()
        };

        let Err(error) = check_access(&self.router, &route, authenticated, role) else {
            return;
        };

        match &error {
            AccessError::Unauthenticated(_) => {
                tracing::debug!(%route, "redirecting to login");
            }
            AccessError::Forbidden { .. } => {
                tracing::warn!(%error, "access denied");
                self.notifier.notify_error(&self.options.access_denied_message);
            }
        }
        self.router.navigate_to(error.redirect_target());
    }

    fn render(&self) -> Frame {
        let snapshot = self.snapshot.lock().clone();
        if snapshot.is_loading {
            return Frame::Loading;
        }

        let authenticated = snapshot.authenticated();
        let content = match check_access(
            &self.router,
            &snapshot.current_route,
            authenticated,
            snapshot.user_type,
        ) {
            Ok(()) => Content::View {
                view: dispatch_view(
                    &snapshot.current_route,
                    &snapshot.route_params,
                    authenticated,
                ),
            },
            Err(error) => Content::Redirecting {
                to: error.redirect_target(),
            },
        };

        Frame::Ready {
            chrome: chrome_visibility(&snapshot.current_route, authenticated),
            route: snapshot.current_route,
            content,
        }
    }

    fn publish(&self) {
        self.frames.emit(self.render());
    }
}

/// Root application component
///
/// # Example
///
/// ```rust
/// use app_core::NoBootstrap;
/// use app_state::StateStore;
/// use app_ui::navigation::{Route, Router};
/// use app_ui::notify::ToastQueue;
/// use app_ui::shell::{AppShell, Frame, ShellContext, ShellOptions, View};
/// use std::sync::Arc;
///
/// let router = Arc::new(Router::new());
/// let shell = AppShell::new(
///     ShellContext {
///         store: Arc::new(StateStore::new()),
///         router: Arc::clone(&router),
///         notifier: Arc::new(ToastQueue::new()),
///         bootstrap: Arc::new(NoBootstrap),
///     },
///     ShellOptions::default(),
/// );
/// assert_eq!(shell.render(), Frame::Loading);
///
/// shell.start();
/// router.navigate_to(Route::Orders);
/// // Anonymous visitors are sent to login
/// assert_eq!(router.current_route(), Route::Login);
/// assert_eq!(shell.render().view(), Some(&View::Login));
/// ```
pub struct AppShell {
    inner: Arc<Inner>,
    store: Arc<StateStore>,
    bootstrap: Arc<dyn DataBootstrap>,
    started: AtomicBool,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl AppShell {
    /// Create the shell in its loading state
    pub fn new(context: ShellContext, options: ShellOptions) -> Self {
        let route = context.router.state();
        let session = context.store.get_state().session;
        let snapshot = Snapshot {
            current_route: route.route,
            route_params: route.params,
            is_authenticated: session.is_authenticated,
            user_type: session.role(),
            is_loading: true,
        };

        Self {
            inner: Arc::new(Inner {
                snapshot: Mutex::new(snapshot),
                router: context.router,
                notifier: context.notifier,
                options,
                frames: Observable::new(),
            }),
            store: context.store,
            bootstrap: context.bootstrap,
            started: AtomicBool::new(false),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Run the one-time initialization
    ///
    /// Returns `false` if the shell had already been started.
    pub fn start(&self) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("shell already started");
            return false;
        }

        self.bootstrap.bootstrap();

        {
            let session = self.store.get_state().session;
            let mut snapshot = self.inner.snapshot.lock();
            snapshot.is_authenticated = session.is_authenticated;
            snapshot.user_type = session.role();
            snapshot.is_loading = false;
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let state_subscription = self.store.subscribe(move |state| {
            if let Some(inner) = weak.upgrade() {
                inner.on_state_change(state);
            }
        });

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let route_subscription = self.inner.router.subscribe(move |route, params| {
            if let Some(inner) = weak.upgrade() {
                inner.on_route_change(route, params);
            }
        });

        self.subscriptions
            .lock()
            .extend([state_subscription, route_subscription]);

        tracing::info!(route = %self.inner.router.current_route(), "shell mounted");

        self.inner.evaluate_guard();
        self.inner.publish();
        true
    }

    /// Whether initialization has not completed yet
    pub fn is_loading(&self) -> bool {
        self.inner.snapshot.lock().is_loading
    }

    /// Render the current frame
    pub fn render(&self) -> Frame {
        self.inner.render()
    }

    /// Register a listener invoked with a new frame after every processed
    /// store or router event
    pub fn subscribe_frames<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Frame) + Send + Sync + 'static,
    {
        self.inner.frames.subscribe(listener)
    }

    /// Tear the shell down, releasing its subscriptions
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for AppShell {
    fn drop(&mut self) {
        let released = {
            let mut subscriptions = self.subscriptions.lock();
            let count = subscriptions.len();
            subscriptions.clear();
            count
        };
        if released > 0 {
            tracing::info!(subscriptions = released, "shell unmounted");
        }
    }
}
