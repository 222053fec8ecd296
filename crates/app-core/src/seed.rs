//! One-time demo data bootstrap
//!
//! The shell runs a [`DataBootstrap`] once at mount, before it takes its
//! first session snapshot.

use crate::auth::{Account, AccountDirectory};
use app_state::Role;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Seeds collaborator data before the first guard evaluation
pub trait DataBootstrap: Send + Sync {
    /// Run the bootstrap; repeated calls must be harmless
    fn bootstrap(&self);
}

/// Bootstrap that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBootstrap;

impl DataBootstrap for NoBootstrap {
    fn bootstrap(&self) {}
}

/// Password shared by every demo account
pub const DEMO_PASSWORD: &str = "demo123";

/// Demo accounts, one per role
pub fn demo_accounts() -> Vec<Account> {
    vec![
        Account::new("cliente@demo.com", DEMO_PASSWORD, "Ana Souza", Role::Client),
        Account::new(
            "prestador@demo.com",
            DEMO_PASSWORD,
            "Bruno Lima",
            Role::Provider,
        ),
        Account::new("admin@demo.com", DEMO_PASSWORD, "Carla Admin", Role::Admin),
    ]
}

/// Registers the demo accounts into an account directory
#[derive(Debug)]
pub struct DemoSeed {
    directory: Arc<AccountDirectory>,
    seeded: AtomicBool,
}

impl DemoSeed {
    /// Create a seed targeting `directory`
    pub fn new(directory: Arc<AccountDirectory>) -> Self {
        Self {
            directory,
            seeded: AtomicBool::new(false),
        }
    }

    /// Whether the seed has already run
    pub fn is_seeded(&self) -> bool {
        self.seeded.load(Ordering::SeqCst)
    }
}

impl DataBootstrap for DemoSeed {
    fn bootstrap(&self) {
        if self.seeded.swap(true, Ordering::SeqCst) {
            return;
        }
        let inserted = demo_accounts()
            .into_iter()
            .filter(|account| self.directory.insert(account.clone()))
            .count();
        tracing::info!(accounts = inserted, "demo data seeded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_seed_registers_one_account_per_role() {
        let directory = Arc::new(AccountDirectory::new());
        let seed = DemoSeed::new(Arc::clone(&directory));
        seed.bootstrap();

        assert!(seed.is_seeded());
        assert_eq!(directory.len(), 3);
        for role in Role::ALL {
            assert!(demo_accounts().iter().any(|account| account.role == role));
        }
        assert_eq!(
            directory.get("admin@demo.com").map(|account| account.role),
            Some(Role::Admin)
        );
    }

    #[test]
    fn test_demo_seed_is_idempotent() {
        let directory = Arc::new(AccountDirectory::new());
        let seed = DemoSeed::new(Arc::clone(&directory));
        seed.bootstrap();
        seed.bootstrap();
        assert_eq!(directory.len(), 3);
    }

    #[test]
    fn test_demo_seed_keeps_existing_accounts() {
        let directory = Arc::new(AccountDirectory::new());
        directory.insert(Account::new(
            "cliente@demo.com",
            "custom",
            "Existing",
            Role::Client,
        ));
        DemoSeed::new(Arc::clone(&directory)).bootstrap();

        assert_eq!(directory.len(), 3);
        assert_eq!(
            directory.get("cliente@demo.com").map(|account| account.password),
            Some("custom".to_string())
        );
    }

    #[test]
    fn test_no_bootstrap() {
        NoBootstrap.bootstrap();
    }
}
