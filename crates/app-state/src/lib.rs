//! Application state for the marketplace shell
//!
//! This crate provides the process-wide state store (session and unread
//! count), the typed publish/subscribe primitive the store and router are
//! built on, and unread badge formatting.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod observer;
pub mod session;
pub mod unread;

pub use observer::{Listener, Observable, Subscription};
pub use session::{AppState, Role, Session, StateStore, User};
pub use unread::{UnreadDisplay, MAX_DISPLAY_COUNT};
