//! Role-scoped navigation menu
//!
//! Header and bottom navigation both render [`visible_menu_items`]. Allowed
//! roles come from the router's permission table, so the menu never offers a
//! route the guard would reject.

use crate::navigation::Route;
use app_state::Role;
use serde::Serialize;

/// One navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Target route
    pub route: Route,
    /// Translation key for the label
    pub label_key: &'static str,
    /// Icon name
    pub icon: &'static str,
}

impl MenuItem {
    fn new(route: Route, label_key: &'static str, icon: &'static str) -> Self {
        Self {
            route,
            label_key,
            icon,
        }
    }

    /// Roles allowed to see this item
    pub fn allowed_roles(&self) -> &'static [Role] {
        self.route.allowed_roles()
    }
}

/// Every menu entry, in display order
pub fn base_menu_items() -> Vec<MenuItem> {
    vec![
        MenuItem::new(Route::Dashboard, "dashboard", "home"),
        MenuItem::new(Route::Orders, "myOrders", "clipboard-list"),
        MenuItem::new(Route::NewOrder, "publishOrder", "plus-circle"),
        MenuItem::new(Route::Proposals, "proposals", "clipboard-list"),
        MenuItem::new(Route::Chat, "messages", "message-square"),
        MenuItem::new(Route::Profile, "myProfile", "user"),
        MenuItem::new(Route::Admin, "adminPanel", "shield"),
    ]
}

/// Menu entries visible to `role`; empty without a role
pub fn visible_menu_items(role: Option<Role>) -> Vec<MenuItem> {
    let Some(role) = role else {
        return Vec::new();
    };
    base_menu_items()
        .into_iter()
        .filter(|item| item.allowed_roles().contains(&role))
        .collect()
}
