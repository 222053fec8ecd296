//! User-visible notifications
//!
//! The shell only needs a fire-and-forget error toast. [`ToastQueue`] keeps
//! posted toasts in memory for whatever surface renders them.

use parking_lot::Mutex;
use serde::Serialize;

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    /// Error toast
    Error,
}

/// A posted toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    /// Severity
    pub level: ToastLevel,
    /// Message text
    pub message: String,
}

/// Notification capability
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Show an error message to the user
    fn notify_error(&self, message: &str);
}

/// In-memory toast sink
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Toasts posted so far, oldest first
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }

    /// Remove and return every posted toast
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.toasts.lock())
    }

    /// Number of posted toasts
    pub fn len(&self) -> usize {
        self.toasts.lock().len()
    }

    /// Whether nothing has been posted
    pub fn is_empty(&self) -> bool {
        self.toasts.lock().is_empty()
    }
}

impl Notifier for ToastQueue {
    fn notify_error(&self, message: &str) {
        tracing::debug!(%message, "error toast");
        self.toasts.lock().push(Toast {
            level: ToastLevel::Error,
            message: message.to_string(),
        });
    }
}
