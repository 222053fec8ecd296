//! Marketplace client shell
//!
//! Assembles the route-guarded shell, header and bottom navigation from the
//! workspace crates:
//!
//! - `app-state`: session store and typed change notification
//! - `app-core`: accounts, authentication and demo data
//! - `app-ui`: router, guard, shell and chrome
//!
//! ```rust
//! use marketplace_shell::{App, ShellConfig};
//! use app_ui::View;
//!
//! let app = App::new(&ShellConfig::default());
//! app.start();
//! app.handle("login prestador@demo.com demo123".parse().unwrap()).unwrap();
//! app.handle("select proposals".parse().unwrap()).unwrap();
//! assert_eq!(app.screen().frame.view(), Some(&View::Proposals));
//! ```

pub mod app;
pub mod config;

pub use app::{App, Intent, IntentError, Screen};
pub use config::{ConfigError, ShellConfig};
