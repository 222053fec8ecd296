//! Session state and the global state store
//!
//! The [`StateStore`] holds the authenticated user and the unread message
//! count. It is constructed once at process start and shared by reference
//! (`Arc<StateStore>`) with every consumer.

use crate::observer::{Observable, Subscription};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Publishes orders and hires providers
    Client,
    /// Sends proposals for published orders
    Provider,
    /// Platform administrator
    Admin,
}

impl Role {
    /// Every role
    pub const ALL: [Role; 3] = [Role::Client, Role::Provider, Role::Admin];

    /// Lowercase role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Provider => "provider",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name
    pub name: String,
    /// Account role
    #[serde(rename = "type")]
    pub role: Role,
}

impl User {
    /// Create a new user
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Authenticated-user / anonymous pair
///
/// `is_authenticated == false` always comes with `user == None`. The store
/// enforces this on every write, so a logged-out session stored with a stale
/// user is read back without it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Whether a user is signed in
    pub is_authenticated: bool,
    /// The signed-in user
    pub user: Option<User>,
}

impl Session {
    /// The logged-out session
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session for a signed-in user
    pub fn signed_in(user: User) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
        }
    }

    /// Role of the signed-in user, if any
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    /// Whether the session carries both the authenticated flag and a user
    ///
    /// A session flagged authenticated whose user record is missing is not
    /// trusted.
    pub fn has_identity(&self) -> bool {
        self.is_authenticated && self.user.is_some()
    }

    /// Drop the user from a logged-out session
    pub fn normalize(&mut self) {
        if !self.is_authenticated && self.user.take().is_some() {
            tracing::warn!("discarded user from logged-out session");
        }
    }
}

/// Snapshot of the whole store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Current session
    #[serde(flatten)]
    pub session: Session,
    /// Unread message count
    pub unread_count: u32,
}

impl AppState {
    /// Shorthand for `session.is_authenticated`
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated
    }

    /// Shorthand for `session.user`
    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }
}

/// Global state store
///
/// Every mutation notifies subscribers with the new snapshot, after the
/// internal lock has been released.
///
/// # Example
///
/// ```rust
/// use app_state::{Role, Session, StateStore, User};
///
/// let store = StateStore::new();
/// let _sub = store.subscribe(|state| println!("authenticated: {}", state.is_authenticated()));
///
/// store.set_session(Session::signed_in(User::new("Ana Souza", Role::Client)));
/// assert!(store.get_state().is_authenticated());
/// ```
#[derive(Debug, Default)]
pub struct StateStore {
    state: Mutex<AppState>,
    changes: Observable<AppState>,
}

impl StateStore {
    /// Create a store with the anonymous session and no unread messages
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a given initial state
    pub fn with_state(mut state: AppState) -> Self {
        state.session.normalize();
        Self {
            state: Mutex::new(state),
            changes: Observable::new(),
        }
    }

    /// Synchronous snapshot of the current state
    pub fn get_state(&self) -> AppState {
        self.state.lock().clone()
    }

    /// Register a listener invoked with the new state on every mutation
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        self.changes.subscribe(listener)
    }

    /// Apply a mutation and notify subscribers
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut AppState),
    {
        let snapshot = {
            let mut state = self.state.lock();
            mutate(&mut state);
            state.session.normalize();
            state.clone()
        };
        tracing::debug!(
            authenticated = snapshot.session.is_authenticated,
            role = ?snapshot.session.role(),
            unread = snapshot.unread_count,
            "state updated"
        );
        self.changes.emit(snapshot);
    }

    /// Replace the session
    pub fn set_session(&self, session: Session) {
        self.update(|state| state.session = session);
    }

    /// Replace the unread message count
    pub fn set_unread_count(&self, count: u32) {
        self.update(|state| state.unread_count = count);
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.changes.listener_count()
    }
}
