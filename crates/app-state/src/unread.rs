//! Unread message badge
//!
//! The unread count itself lives in [`crate::StateStore`]; it is written by
//! the messaging subsystem and only read here to build the header badge.

/// Counts at or above this value display as "99+"
pub const MAX_DISPLAY_COUNT: u32 = 99;

/// Unread count display value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnreadDisplay {
    /// No unread items, the badge is hidden
    #[default]
    None,
    /// Specific count (1-98)
    Count(u32),
    /// 99 or more unread items
    Many,
}

impl UnreadDisplay {
    /// Create from a numeric count
    pub fn from_count(count: u32) -> Self {
        if count == 0 {
            UnreadDisplay::None
        } else if count >= MAX_DISPLAY_COUNT {
            UnreadDisplay::Many
        } else {
            UnreadDisplay::Count(count)
        }
    }

    /// Convert to display string
    pub fn as_display_string(&self) -> String {
        match self {
            UnreadDisplay::None => String::new(),
            UnreadDisplay::Count(n) => n.to_string(),
            UnreadDisplay::Many => format!("{MAX_DISPLAY_COUNT}+"),
        }
    }

    /// Check if there are any unread items
    pub fn has_unread(&self) -> bool {
        !matches!(self, UnreadDisplay::None)
    }
}

impl std::fmt::Display for UnreadDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_display_string())
    }
}
