//! Authentication service
//!
//! This module provides the login, registration and logout flows. Accounts
//! live in an in-memory [`AccountDirectory`]; a successful flow writes the
//! resulting [`Session`] into the shared [`StateStore`], which is the only
//! place the rest of the shell reads authentication from.

use app_state::{Role, Session, StateStore, User};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Authentication service error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Registration form rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Stored account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Login email, stored lowercase
    pub email: String,
    /// Password
    pub password: String,
    /// Display name
    pub name: String,
    /// Account role
    pub role: Role,
}

impl Account {
    /// Create an account record
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            email: normalize_email(&email.into()),
            password: password.into(),
            name: name.into(),
            role,
        }
    }

    /// Public view of this account
    pub fn user(&self) -> User {
        User::new(self.name.clone(), self.role)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-memory account storage keyed by email
#[derive(Debug, Default)]
pub struct AccountDirectory {
    accounts: RwLock<HashMap<String, Account>>,
}

impl AccountDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account
    ///
    /// Returns `false` and leaves the directory untouched if the email is
    /// already taken.
    pub fn insert(&self, account: Account) -> bool {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&account.email) {
            return false;
        }
        accounts.insert(account.email.clone(), account);
        true
    }

    /// Look up an account by email
    pub fn get(&self, email: &str) -> Option<Account> {
        self.accounts.read().get(&normalize_email(email)).cloned()
    }

    /// Check whether an email is registered
    pub fn contains(&self, email: &str) -> bool {
        self.accounts.read().contains_key(&normalize_email(email))
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// Whether the directory has no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

/// Login parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginParams {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
}

/// Registration parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterParams {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
    /// Requested role, `client` or `provider`
    pub role: Role,
}

/// Authentication service
///
/// # Example
///
/// ```rust
/// use app_core::auth::{Account, AccountDirectory, AuthService, LoginParams};
/// use app_state::{Role, StateStore};
/// use std::sync::Arc;
///
/// let store = Arc::new(StateStore::new());
/// let directory = Arc::new(AccountDirectory::new());
/// directory.insert(Account::new("ana@example.com", "secret", "Ana Souza", Role::Client));
///
/// let auth = AuthService::new(Arc::clone(&store), directory);
/// auth.login(LoginParams {
///     email: "ana@example.com".to_string(),
///     password: "secret".to_string(),
/// })
/// .unwrap();
/// assert!(store.get_state().is_authenticated());
///
/// auth.logout();
/// assert!(!store.get_state().is_authenticated());
/// ```
#[derive(Debug, Clone)]
pub struct AuthService {
    store: Arc<StateStore>,
    directory: Arc<AccountDirectory>,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(store: Arc<StateStore>, directory: Arc<AccountDirectory>) -> Self {
        Self { store, directory }
    }

    /// The account directory backing this service
    pub fn directory(&self) -> &Arc<AccountDirectory> {
        &self.directory
    }

    /// Sign in with email and password
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidCredentials` - unknown email or wrong password;
    ///   the current session is left untouched
    pub fn login(&self, params: LoginParams) -> Result<User> {
        let account = self
            .directory
            .get(&params.email)
            .filter(|account| account.password == params.password)
            .ok_or_else(|| {
                tracing::warn!(email = %params.email, "login rejected");
                AuthError::InvalidCredentials
            })?;

        let user = account.user();
        tracing::info!(name = %user.name, role = %user.role, "user logged in");
        self.store.set_session(Session::signed_in(user.clone()));
        Ok(user)
    }

    /// Create an account and sign it in
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidInput` - empty name, malformed email, empty
    ///   password, or the `admin` role
    /// - `AuthError::EmailTaken` - the email is already registered
    pub fn register(&self, params: RegisterParams) -> Result<User> {
        let name = params.name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidInput("name is required".to_string()));
        }
        if !params.email.contains('@') {
            return Err(AuthError::InvalidInput("email is malformed".to_string()));
        }
        if params.password.is_empty() {
            return Err(AuthError::InvalidInput("password is required".to_string()));
        }
        if params.role == Role::Admin {
            return Err(AuthError::InvalidInput(
                "admin accounts cannot be self-registered".to_string(),
            ));
        }

        let account = Account::new(params.email, params.password, name, params.role);
        let email = account.email.clone();
        let user = account.user();
        if !self.directory.insert(account) {
            return Err(AuthError::EmailTaken(email));
        }

        tracing::info!(name = %user.name, role = %user.role, "account registered");
        self.store.set_session(Session::signed_in(user.clone()));
        Ok(user)
    }

    /// Sign out
    ///
    /// The session is replaced synchronously: the next `get_state()` reports
    /// `is_authenticated == false` and no user. The unread count is reset.
    pub fn logout(&self) {
        tracing::info!("user logged out");
        self.store.update(|state| {
            state.session = Session::anonymous();
            state.unread_count = 0;
        });
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<User> {
        self.store.get_state().session.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (AuthService, Arc<StateStore>) {
        let store = Arc::new(StateStore::new());
        let directory = Arc::new(AccountDirectory::new());
        directory.insert(Account::new(
            "Ana@Example.com",
            "pw",
            "Ana Souza",
            Role::Client,
        ));
        (AuthService::new(Arc::clone(&store), directory), store)
    }

    fn login(email: &str, password: &str) -> LoginParams {
        LoginParams {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_sets_session() {
        let (auth, store) = service();
        let user = auth.login(login("ana@example.com", "pw")).unwrap();

        assert_eq!(user.role, Role::Client);
        let state = store.get_state();
        assert!(state.is_authenticated());
        assert_eq!(state.user(), Some(&user));
    }

    #[test]
    fn test_login_email_is_case_insensitive() {
        let (auth, _store) = service();
        assert!(auth.login(login("  ANA@example.COM ", "pw")).is_ok());
    }

    #[test]
    fn test_login_wrong_password() {
        let (auth, store) = service();
        let result = auth.login(login("ana@example.com", "nope"));

        assert_eq!(result, Err(AuthError::InvalidCredentials));
        assert!(!store.get_state().is_authenticated());
    }

    #[test]
    fn test_login_unknown_email() {
        let (auth, _store) = service();
        assert_eq!(
            auth.login(login("ghost@example.com", "pw")),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_logout_clears_session_synchronously() {
        let (auth, store) = service();
        auth.login(login("ana@example.com", "pw")).unwrap();
        store.set_unread_count(4);

        auth.logout();

        let state = store.get_state();
        assert!(!state.is_authenticated());
        assert!(state.user().is_none());
        assert_eq!(state.unread_count, 0);
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_register_signs_in() {
        let (auth, store) = service();
        let user = auth
            .register(RegisterParams {
                name: "Bruno Lima".to_string(),
                email: "bruno@example.com".to_string(),
                password: "pw".to_string(),
                role: Role::Provider,
            })
            .unwrap();

        assert_eq!(user, User::new("Bruno Lima", Role::Provider));
        assert_eq!(store.get_state().session.role(), Some(Role::Provider));
        assert!(auth.directory().contains("bruno@example.com"));
    }

    #[test]
    fn test_register_duplicate_email() {
        let (auth, _store) = service();
        let result = auth.register(RegisterParams {
            name: "Other Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "pw".to_string(),
            role: Role::Client,
        });
        assert_eq!(
            result,
            Err(AuthError::EmailTaken("ana@example.com".to_string()))
        );
    }

    #[test]
    fn test_register_rejects_admin_role() {
        let (auth, store) = service();
        let result = auth.register(RegisterParams {
            name: "Mallory".to_string(),
            email: "mallory@example.com".to_string(),
            password: "pw".to_string(),
            role: Role::Admin,
        });
        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
        assert!(!store.get_state().is_authenticated());
    }

    #[test]
    fn test_register_rejects_blank_name() {
        let (auth, _store) = service();
        let result = auth.register(RegisterParams {
            name: "   ".to_string(),
            email: "blank@example.com".to_string(),
            password: "pw".to_string(),
            role: Role::Client,
        });
        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
    }
}
