//! Core application services for the marketplace shell
//!
//! This crate contains the authentication service the navigation chrome
//! calls into and the one-time demo data bootstrap run at mount.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod seed;

pub use auth::{Account, AccountDirectory, AuthError, AuthService, LoginParams, RegisterParams};
pub use seed::{DataBootstrap, DemoSeed, NoBootstrap, DEMO_PASSWORD};
