//! Blocked Domains
//!
//! Deduplicated set of user-blocked domains, persisted under the `blocked`
//! key. The interception pipeline consults it before classification; the
//! host's request-blocking rules are driven from the same persisted set.

use std::collections::BTreeSet;

use crate::constants::keys;
use crate::logic::storage::Storage;

/// In-memory copy of the persisted blocked-domain set.
#[derive(Debug, Default)]
pub struct Blocklist {
    domains: BTreeSet<String>,
}

impl Blocklist {
    /// Restore from storage (empty if never written).
    pub fn load(storage: &Storage) -> Self {
        let domains: Vec<String> = storage.get(keys::BLOCKED).unwrap_or_default();
        Self {
            domains: domains.into_iter().collect(),
        }
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// Add a domain; returns false if it was already present.
    pub fn block(&mut self, domain: &str) -> bool {
        self.domains.insert(domain.to_string())
    }

    /// Remove a domain; returns false if it was not present.
    pub fn unblock(&mut self, domain: &str) -> bool {
        self.domains.remove(domain)
    }

    /// Persist the current set.
    pub fn save(&self, storage: &Storage) {
        let domains: Vec<&String> = self.domains.iter().collect();
        if let Err(e) = storage.set(keys::BLOCKED, &domains) {
            log::error!("Failed to persist blocked domains: {}", e);
        }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
