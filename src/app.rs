//! Composition root
//!
//! [`App`] wires the state store, router, account directory, toast queue,
//! shell and chrome together the way the client mounts them, and applies
//! user [`Intent`]s to them.

use crate::config::ShellConfig;
use app_core::{
    AccountDirectory, AuthError, AuthService, DataBootstrap, DemoSeed, LoginParams, NoBootstrap,
    RegisterParams,
};
use app_state::{Role, StateStore};
use app_ui::{
    AppShell, BottomNav, BottomNavView, Frame, Header, HeaderView, Notifier, Route, Router,
    ShellContext, Toast, ToastQueue,
};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Errors from parsing or applying an intent
#[derive(Debug, Error)]
pub enum IntentError {
    /// Blank input
    #[error("Empty intent")]
    Empty,

    /// First word is not a known intent
    #[error("Unknown intent: {0}")]
    Unknown(String),

    /// A required argument is missing
    #[error("{intent}: missing {argument}")]
    MissingArgument {
        /// Intent name
        intent: &'static str,
        /// Argument name
        argument: &'static str,
    },

    /// An argument could not be parsed
    #[error("{intent}: invalid {argument} '{value}'")]
    InvalidArgument {
        /// Intent name
        intent: &'static str,
        /// Argument name
        argument: &'static str,
        /// Offending value
        value: String,
    },

    /// Login or registration was rejected
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Something the user does to the running client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Follow a link or type a URL
    Open(String),
    /// Submit the login form
    Login(LoginParams),
    /// Submit the registration form
    Register(RegisterParams),
    /// Header "sign out"
    Logout,
    /// Header menu entry
    Select(Route),
    /// Bottom navigation entry
    Tab(Route),
    /// Header logo
    Logo,
    /// Header bell
    Bell,
    /// Header user menu "profile"
    Profile,
    /// Header hamburger button
    ToggleMenu,
    /// New messages arrived
    Unread(u32),
}

fn arg<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    intent: &'static str,
    argument: &'static str,
) -> Result<&'a str, IntentError> {
    words
        .next()
        .ok_or(IntentError::MissingArgument { intent, argument })
}

fn route_arg<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    intent: &'static str,
) -> Result<Route, IntentError> {
    let name = arg(words, intent, "route")?;
    match Route::from_name(name) {
        Route::Unrecognized(value) => Err(IntentError::InvalidArgument {
            intent,
            argument: "route",
            value,
        }),
        route => Ok(route),
    }
}

/// Parse one line of the intent script
///
/// ```text
/// open /orders/42
/// login cliente@demo.com demo123
/// register client ana@example.com secret Ana Souza
/// select new-order
/// tab chat
/// logo | bell | profile | menu | logout
/// unread 5
/// ```
impl FromStr for Intent {
    type Err = IntentError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(IntentError::Empty);
        };

        let intent = match command {
            "open" => Intent::Open(arg(&mut words, "open", "path")?.to_string()),
            "login" => Intent::Login(LoginParams {
                email: arg(&mut words, "login", "email")?.to_string(),
                password: arg(&mut words, "login", "password")?.to_string(),
            }),
            "register" => {
                let role = arg(&mut words, "register", "role")?;
                let role = match role {
                    "client" => Role::Client,
                    "provider" => Role::Provider,
                    "admin" => Role::Admin,
                    other => {
                        return Err(IntentError::InvalidArgument {
                            intent: "register",
                            argument: "role",
                            value: other.to_string(),
                        })
                    }
                };
                let email = arg(&mut words, "register", "email")?.to_string();
                let password = arg(&mut words, "register", "password")?.to_string();
                let name = words.collect::<Vec<_>>().join(" ");
                Intent::Register(RegisterParams {
                    name,
                    email,
                    password,
                    role,
                })
            }
            "logout" => Intent::Logout,
            "select" => Intent::Select(route_arg(&mut words, "select")?),
            "tab" => Intent::Tab(route_arg(&mut words, "tab")?),
            "logo" => Intent::Logo,
            "bell" => Intent::Bell,
            "profile" => Intent::Profile,
            "menu" => Intent::ToggleMenu,
            "unread" => {
                let value = arg(&mut words, "unread", "count")?;
                let count = value.parse().map_err(|_| IntentError::InvalidArgument {
                    intent: "unread",
                    argument: "count",
                    value: value.to_string(),
                })?;
                Intent::Unread(count)
            }
            other => return Err(IntentError::Unknown(other.to_string())),
        };
        Ok(intent)
    }
}

/// Everything on screen after an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    /// Shell frame
    pub frame: Frame,
    /// Header, when the frame shows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderView>,
    /// Bottom navigation, when the frame shows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_nav: Option<BottomNavView>,
    /// Toasts posted since the previous screen
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub toasts: Vec<Toast>,
}

/// The assembled client
pub struct App {
    store: Arc<StateStore>,
    router: Arc<Router>,
    auth: AuthService,
    toasts: Arc<ToastQueue>,
    header: Header,
    bottom_nav: BottomNav,
    shell: AppShell,
}

impl App {
    /// Assemble the client from configuration
    pub fn new(config: &ShellConfig) -> Self {
        let store = Arc::new(StateStore::new());
        let directory = Arc::new(AccountDirectory::new());
        let auth = AuthService::new(Arc::clone(&store), Arc::clone(&directory));

        let initial = config.initial_route_state(&Router::new());
        let router = Arc::new(Router::with_initial(initial));

        let bootstrap: Arc<dyn DataBootstrap> = if config.seed_demo_data {
            Arc::new(DemoSeed::new(directory))
        } else {
            Arc::new(NoBootstrap)
        };

        let toasts = Arc::new(ToastQueue::new());
        let header = Header::mount(&store, Arc::clone(&router), auth.clone());
        let bottom_nav = BottomNav::mount(&store, Arc::clone(&router));
        let shell = AppShell::new(
            ShellContext {
                store: Arc::clone(&store),
                router: Arc::clone(&router),
                notifier: Arc::clone(&toasts) as Arc<dyn Notifier>,
                bootstrap,
            },
            config.shell_options(),
        );

        Self {
            store,
            router,
            auth,
            toasts,
            header,
            bottom_nav,
            shell,
        }
    }

    /// Start the shell
    pub fn start(&self) -> bool {
        self.shell.start()
    }

    /// Apply one intent
    pub fn handle(&self, intent: Intent) -> Result<(), IntentError> {
        tracing::debug!(?intent, "handling intent");
        match intent {
            Intent::Open(path) => self.router.navigate_path(&path),
            Intent::Login(params) => {
                self.auth.login(params)?;
                self.router.navigate_to(Route::Dashboard);
            }
            Intent::Register(params) => {
                self.auth.register(params)?;
                self.router.navigate_to(Route::Dashboard);
            }
            Intent::Logout => self.header.logout(),
            Intent::Select(route) => self.header.select(route),
            Intent::Tab(route) => self.bottom_nav.select(route),
            Intent::Logo => self.header.open_dashboard(),
            Intent::Bell => self.header.open_notifications(),
            Intent::Profile => self.header.open_profile(),
            Intent::ToggleMenu => self.header.toggle_mobile_menu(),
            Intent::Unread(count) => self.store.set_unread_count(count),
        }
        Ok(())
    }

    /// Compose the current screen and take pending toasts
    pub fn screen(&self) -> Screen {
        let frame = self.shell.render();
        let chrome = frame.chrome().unwrap_or_default();
        Screen {
            header: chrome.header.then(|| self.header.view()),
            bottom_nav: chrome.bottom_nav.then(|| self.bottom_nav.view()),
            toasts: self.toasts.drain(),
            frame,
        }
    }

    /// Shell
    pub fn shell(&self) -> &AppShell {
        &self.shell
    }

    /// Router
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// State store
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Authentication service
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}
