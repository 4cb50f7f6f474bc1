//! Configuration loading and representation.

use tracing::warn;

/// Behaviour switches for [`crate::OrderItemRepository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Remove a freshly inserted item when its stock record cannot be created.
    ///
    /// When disabled the item stays persisted without stock and can be reserved
    /// later with `OrderItemRepository::reserve_missing`.
    pub rollback_on_stock_failure: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            rollback_on_stock_failure: true,
        }
    }
}

impl RepositoryConfig {
    pub const ROLLBACK_ON_STOCK_FAILURE: &'static str = "ERPLINE_ROLLBACK_ON_STOCK_FAILURE";

    /// Load from process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, config file, tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            rollback_on_stock_failure: flag(
                &lookup,
                Self::ROLLBACK_ON_STOCK_FAILURE,
                defaults.rollback_on_stock_failure,
            ),
        }
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    let Some(raw) = lookup(key) else {
        return default;
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(key, value = %raw, "unrecognised boolean; using default {default}");
            default
        }
    }
}
