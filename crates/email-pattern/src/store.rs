//! Per-domain convention table and resolution.
//!
//! A [`ConventionStore`] maps cleaned domains to the convention last observed
//! for them. It remembers the order domains were first seen, which decides
//! the winner when resolution falls back to substring matching.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::convention::Convention;
use crate::names::clean_domain;

/// Insertion-ordered mapping from cleaned domain to convention.
///
/// Re-inserting a domain replaces its convention but keeps its original
/// position.
///
/// # Example
///
/// ```
/// use email_pattern::{Convention, ConventionStore};
///
/// let mut store = ConventionStore::new();
/// store.insert("https://www.Acme.com/about", Convention::LastName);
///
/// assert_eq!(store.get("acme.com"), Some(Convention::LastName));
/// assert_eq!(store.resolve("mail.acme.com"), Convention::LastName);
/// assert_eq!(store.resolve("unknown.org"), Convention::FirstNameFirstLetterLastName);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConventionStore {
    entries: Vec<(String, Convention)>,
    positions: HashMap<String, usize>,
}

impl ConventionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `convention` for `domain`, cleaning the domain first.
    ///
    /// Domains that are empty once cleaned are ignored.
    pub fn insert(&mut self, domain: &str, convention: Convention) {
        let key = clean_domain(domain);
        if key.is_empty() {
            return;
        }
        debug!(domain = %key, %convention, "stored convention");
        if let Some(entry) = self
            .positions
            .get(&key)
            .and_then(|position| self.entries.get_mut(*position))
        {
            entry.1 = convention;
            return;
        }
        self.positions.insert(key.clone(), self.entries.len());
        self.entries.push((key, convention));
    }

    /// Returns the convention stored for exactly this domain, after cleaning.
    #[must_use]
    pub fn get(&self, domain: &str) -> Option<Convention> {
        self.lookup(&clean_domain(domain))
    }

    fn lookup(&self, key: &str) -> Option<Convention> {
        self.positions
            .get(key)
            .and_then(|position| self.entries.get(*position))
            .map(|(_, convention)| *convention)
    }

    /// Resolves the convention to use for `domain`.
    ///
    /// An exact match on the cleaned domain wins. Otherwise the first stored
    /// domain, in insertion order, that contains or is contained in the query
    /// decides. Otherwise the default convention applies.
    #[must_use]
    pub fn resolve(&self, domain: &str) -> Convention {
        let query = clean_domain(domain);
        if let Some(convention) = self.lookup(&query) {
            return convention;
        }
        self.entries
            .iter()
            .find(|(known, _)| query.contains(known.as_str()) || known.contains(query.as_str()))
            .map_or_else(Convention::default, |(known, convention)| {
                debug!(domain = %query, matched = %known, %convention, "resolved by substring");
                *convention
            })
    }

    /// Number of stored domains.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no domain is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored entries in insertion order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (&str, Convention)> {
        self.entries
            .iter()
            .map(|(domain, convention)| (domain.as_str(), *convention))
    }
}

/// A published convention table shared between an inference run and later
/// synthesis runs.
///
/// Readers take an immutable snapshot. A rebuilt table replaces the old one
/// in a single step, so a reader never sees a partially built table.
///
/// ```
/// use email_pattern::{Convention, ConventionStore, SharedConventionStore};
///
/// let shared = SharedConventionStore::default();
/// let before = shared.snapshot();
///
/// let mut rebuilt = ConventionStore::new();
/// rebuilt.insert("acme.com", Convention::FirstName);
/// shared.publish(rebuilt);
///
/// assert!(before.is_empty());
/// assert_eq!(shared.snapshot().get("acme.com"), Some(Convention::FirstName));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedConventionStore {
    current: Arc<RwLock<Arc<ConventionStore>>>,
}

impl SharedConventionStore {
    /// Replaces the published table.
    pub fn publish(&self, store: ConventionStore) {
        let replacement = Arc::new(store);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = replacement;
    }

    /// Returns the currently published table.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ConventionStore> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }
}
