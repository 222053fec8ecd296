//! User interface shell for the marketplace client
//!
//! This crate provides the route-guarded root component and the navigation
//! chrome around it. Nothing here depends on a rendering technology: the
//! shell emits [`shell::Frame`] values and the chrome components expose
//! serializable view models.
//!
//! # Modules
//!
//! - [`navigation`] - Routes, path mapping, permission table and the router
//! - [`guard`] - Authentication-then-authorization access check
//! - [`menu`] - Role-scoped menu shared by header and bottom navigation
//! - [`notify`] - Toast capability
//! - [`chrome`] - Header and bottom navigation components
//! - [`shell`] - Root application component
//!
//! # Example
//!
//! ```rust
//! use app_core::{AccountDirectory, AuthService, DemoSeed, LoginParams};
//! use app_state::StateStore;
//! use app_ui::{AppShell, Route, Router, ShellContext, ShellOptions, ToastQueue, View};
//! use std::sync::Arc;
//!
//! let store = Arc::new(StateStore::new());
//! let router = Arc::new(Router::new());
//! let directory = Arc::new(AccountDirectory::new());
//! let auth = AuthService::new(Arc::clone(&store), Arc::clone(&directory));
//!
//! let shell = AppShell::new(
//!     ShellContext {
//!         store: Arc::clone(&store),
//!         router: Arc::clone(&router),
//!         notifier: Arc::new(ToastQueue::new()),
//!         bootstrap: Arc::new(DemoSeed::new(directory)),
//!     },
//!     ShellOptions::default(),
//! );
//! shell.start();
//!
//! auth.login(LoginParams {
//!     email: "cliente@demo.com".to_string(),
//!     password: "demo123".to_string(),
//! })
//! .unwrap();
//! router.navigate_to(Route::NewOrder);
//! assert_eq!(shell.render().view(), Some(&View::NewOrder));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chrome;
pub mod guard;
pub mod menu;
pub mod navigation;
pub mod notify;
pub mod shell;

// Re-export commonly used types
pub use chrome::{BottomNav, BottomNavView, Header, HeaderView, NavEntry};
pub use guard::{check_access, AccessError};
pub use menu::{visible_menu_items, MenuItem};
pub use navigation::{Route, RouteParams, RouteState, Router};
pub use notify::{Notifier, Toast, ToastLevel, ToastQueue};
pub use shell::{
    chrome_visibility, dispatch_view, AppShell, ChromeVisibility, Content, Frame, ShellContext,
    ShellOptions, View,
};
