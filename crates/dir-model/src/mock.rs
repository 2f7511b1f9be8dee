//! # Mock Directory & Testing Guide
//!
//! [`MockDirectory`] implements [`Directory`] entirely in memory. It keeps a
//! real entry tree (so create/get/list/delete round trips behave like a live
//! directory) and adds two things a live directory cannot give a test:
//!
//! * **Call counters** per operation ([`MockDirectory::calls`]), to assert
//!   that a read was served from cache or that no `add` was attempted.
//! * **Failure injection** ([`MockDirectory::fail_next`]), to simulate an
//!   unreachable directory or any other backend error on the next call of a
//!   given operation.
//!
//! ## When to use the mock vs a real directory
//!
//! | Feature | MockDirectory | Real Directory |
//! |---------|---------------|----------------|
//! | **Speed** | Instant (in-memory) | Network round trips |
//! | **Determinism** | 100% Deterministic | Subject to server state |
//! | **Error Injection** | Easy (`fail_next`) | Hard (requires outages) |
//!
//! ## Example
//!
//! ```rust
//! use dir_model::mock::{MockDirectory, Op};
//! use dir_model::{DirectoryError, Directory, Dn, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let directory = MockDirectory::new();
//!     let base = Dn::parse("ou=widgets,o=test").unwrap();
//!     directory.add_container(&base);
//!
//!     // Simulate a downstream failure
//!     directory.fail_next(Op::Search, DirectoryError::Unavailable("down".into()));
//!
//!     let result = directory.search(&base, &SearchOptions::base()).await;
//!     assert!(matches!(result, Err(DirectoryError::Unavailable(_))));
//!     assert_eq!(directory.calls(Op::Search), 1);
//! }
//! ```
//!
//! Unlike a bare map, the mock enforces directory structure: an entry can only
//! be added under an existing parent, and searching below a missing base
//! fails with [`DirectoryError::NoSuchObject`]. Seed containers with
//! [`MockDirectory::add_container`].

use crate::directory::Directory;
use crate::dn::Dn;
use crate::error::DirectoryError;
use crate::record::{Change, Entry, RawRecord, SearchOptions, SearchScope};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A directory operation, for counting calls and targeting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Search,
    Add,
    Modify,
    Delete,
}

#[derive(Default)]
struct State {
    entries: BTreeMap<Dn, RawRecord>,
    failures: VecDeque<(Op, DirectoryError)>,
    calls: HashMap<Op, usize>,
}

impl State {
    /// Records a call and returns the injected failure for it, if any.
    fn begin(&mut self, op: Op) -> Result<(), DirectoryError> {
        *self.calls.entry(op).or_default() += 1;
        match self.failures.iter().position(|(o, _)| *o == op) {
            Some(pos) => match self.failures.remove(pos) {
                Some((_, err)) => Err(err),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }
}

/// In-memory [`Directory`] with call counters and failure injection.
#[derive(Default)]
pub struct MockDirectory {
    state: Mutex<State>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds an organizational-unit style container entry (and its
    /// ancestors) without counting as a call.
    pub fn add_container(&self, dn: &Dn) {
        let mut state = self.lock();
        let mut current = Some(dn.clone());
        while let Some(dn) = current {
            let parent = dn.parent();
            state.entries.entry(dn).or_insert_with(|| {
                let mut raw = RawRecord::new();
                raw.set("objectclass", "organizationalunit");
                raw
            });
            current = parent;
        }
    }

    /// Seeds a raw entry directly, bypassing structure checks and counters.
    pub fn insert(&self, dn: Dn, raw: RawRecord) {
        self.lock().entries.insert(dn, raw);
    }

    /// The stored raw entry at `dn`, if any.
    pub fn entry(&self, dn: &Dn) -> Option<RawRecord> {
        self.lock().entries.get(dn).cloned()
    }

    /// Makes the next call of `op` fail with `err`. Failures queue up.
    pub fn fail_next(&self, op: Op, err: DirectoryError) {
        self.lock().failures.push_back((op, err));
    }

    /// Number of calls of `op` so far, failed ones included.
    pub fn calls(&self, op: Op) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn search(&self, base: &Dn, opts: &SearchOptions) -> Result<Vec<Entry>, DirectoryError> {
        let mut state = self.lock();
        state.begin(Op::Search)?;
        if !state.entries.contains_key(base) {
            return Err(DirectoryError::NoSuchObject(base.to_string()));
        }

        let in_scope = |dn: &Dn| match opts.scope {
            SearchScope::Base => dn == base,
            SearchScope::One => dn.depth() == base.depth() + 1 && dn.is_under(base),
            SearchScope::Sub => dn.is_under(base),
        };
        Ok(state
            .entries
            .iter()
            .filter(|(dn, raw)| {
                in_scope(*dn) && opts.filter.as_ref().map_or(true, |f| f.matches(raw))
            })
            .map(|(dn, raw)| Entry {
                dn: dn.clone(),
                raw: raw.clone(),
            })
            .collect())
    }

    async fn add(&self, dn: &Dn, raw: &RawRecord) -> Result<(), DirectoryError> {
        let mut state = self.lock();
        state.begin(Op::Add)?;
        if state.entries.contains_key(dn) {
            return Err(DirectoryError::AlreadyExists(dn.to_string()));
        }
        if let Some(parent) = dn.parent() {
            if !state.entries.contains_key(&parent) {
                return Err(DirectoryError::NoSuchObject(parent.to_string()));
            }
        }
        state.entries.insert(dn.clone(), raw.clone());
        Ok(())
    }

    async fn modify(&self, dn: &Dn, changes: &[Change]) -> Result<(), DirectoryError> {
        let mut state = self.lock();
        state.begin(Op::Modify)?;
        let raw = state
            .entries
            .get_mut(dn)
            .ok_or_else(|| DirectoryError::NoSuchObject(dn.to_string()))?;
        for change in changes {
            raw.apply(change);
        }
        Ok(())
    }

    async fn delete(&self, dn: &Dn) -> Result<(), DirectoryError> {
        let mut state = self.lock();
        state.begin(Op::Delete)?;
        if state.entries.keys().any(|d| d != dn && d.is_under(dn)) {
            return Err(DirectoryError::Other(format!("{dn} has children")));
        }
        state
            .entries
            .remove(dn)
            .map(|_| ())
            .ok_or_else(|| DirectoryError::NoSuchObject(dn.to_string()))
    }
}
