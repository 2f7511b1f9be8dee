//! # Cache Facade
//!
//! Read-through cache used by every data-access operation. Entries are keyed
//! by `(scope, key)` where scope is `"<Kind>Get"` (key: the exact DN) or
//! `"<Kind>List"` (key: parent DN plus the full search filter).
//!
//! A [`CacheEntry`] is an immutable snapshot: either a cached failure or raw
//! directory data. Live model instances are never cached; they are rebuilt
//! from raw data on every read.
//!
//! Invalidation after a mutation is owned by the [`Cache`] implementation
//! through [`Cache::invalidate_on_write`], [`Cache::invalidate_on_put`] and
//! [`Cache::invalidate_on_delete`], so the scope/key derivation lives in one
//! place.

use crate::dn::Dn;
use crate::error::ModelError;
use crate::record::{Filter, RawRecord};
use async_trait::async_trait;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::trace;

/// A cached outcome: exactly one of a failure or raw data.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    Failed(ModelError),
    /// A single raw record (Get scopes).
    Item(RawRecord),
    /// An ordered set of raw records (List scopes).
    Items(Vec<RawRecord>),
}

pub fn get_scope(kind: &str) -> String {
    format!("{kind}Get")
}

pub fn list_scope(kind: &str) -> String {
    format!("{kind}List")
}

pub fn list_key(parent: &Dn, filter: &Filter) -> String {
    format!("{parent}|{filter}")
}

/// The item affected by a successful mutation.
#[derive(Debug)]
pub struct Invalidation<'a> {
    pub kind: &'a str,
    pub dn: &'a Dn,
    /// List key of the scope the item lives in; `None` for a root entry.
    pub list_key: Option<String>,
    pub raw: &'a RawRecord,
}

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, scope: &str, key: &str) -> Option<CacheEntry>;

    async fn set(&self, scope: &str, key: &str, entry: CacheEntry);

    async fn delete(&self, scope: &str, key: &str);

    /// Drops every entry in every scope.
    async fn clear(&self);

    /// Called after a successful create or update.
    async fn invalidate_on_write(&self, target: &Invalidation<'_>) {
        self.invalidate_item(target).await;
    }

    /// Called after a successful put (create-or-replace).
    async fn invalidate_on_put(&self, target: &Invalidation<'_>) {
        self.invalidate_item(target).await;
    }

    /// Called after a successful delete.
    async fn invalidate_on_delete(&self, target: &Invalidation<'_>) {
        self.invalidate_item(target).await;
    }

    /// Drops the item's Get entry and the List entry of its parent scope.
    async fn invalidate_item(&self, target: &Invalidation<'_>) {
        self.delete(&get_scope(target.kind), &target.dn.to_string()).await;
        if let Some(key) = &target.list_key {
            self.delete(&list_scope(target.kind), key).await;
        }
    }
}

struct Cached {
    entry: CacheEntry,
    stored_at: Instant,
}

/// In-process expiring LRU cache, one LRU per scope.
pub struct MemoryCache {
    size: NonZeroUsize,
    expiry: Duration,
    scopes: Mutex<HashMap<String, LruCache<String, Cached>>>,
}

impl MemoryCache {
    /// `size` is the capacity of each scope; entries older than `expiry` are
    /// treated as absent.
    pub fn new(size: usize, expiry: Duration) -> Self {
        Self {
            size: NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN),
            expiry,
            scopes: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live entries across all scopes.
    pub async fn len(&self) -> usize {
        let scopes = self.scopes.lock().await;
        scopes
            .values()
            .map(|lru| {
                lru.iter()
                    .filter(|(_, c)| c.stored_at.elapsed() <= self.expiry)
                    .count()
            })
            .sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, scope: &str, key: &str) -> bool {
        let scopes = self.scopes.lock().await;
        scopes
            .get(scope)
            .and_then(|lru| lru.peek(key))
            .is_some_and(|c| c.stored_at.elapsed() <= self.expiry)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(300))
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, scope: &str, key: &str) -> Option<CacheEntry> {
        let mut scopes = self.scopes.lock().await;
        let lru = scopes.get_mut(scope)?;
        let expired = lru.get(key)?.stored_at.elapsed() > self.expiry;
        if expired {
            trace!(scope, key, "expired");
            lru.pop(key);
            return None;
        }
        lru.get(key).map(|c| c.entry.clone())
    }

    async fn set(&self, scope: &str, key: &str, entry: CacheEntry) {
        let mut scopes = self.scopes.lock().await;
        let size = self.size;
        scopes
            .entry(scope.to_string())
            .or_insert_with(|| LruCache::new(size))
            .put(
                key.to_string(),
                Cached {
                    entry,
                    stored_at: Instant::now(),
                },
            );
    }

    async fn delete(&self, scope: &str, key: &str) {
        let mut scopes = self.scopes.lock().await;
        if let Some(lru) = scopes.get_mut(scope) {
            lru.pop(key);
        }
    }

    async fn clear(&self) {
        self.scopes.lock().await.clear();
    }
}
