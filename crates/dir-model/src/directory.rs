//! # Directory Client Facade
//!
//! The backing store is a hierarchical directory addressed by [`Dn`]s and
//! searched by filter and scope. This crate never talks to a real directory
//! server itself; applications plug in a client by implementing
//! [`Directory`]. [`crate::mock::MockDirectory`] is an in-memory
//! implementation for tests and demos.
//!
//! Every call is a one-shot async operation: it resolves exactly once, with
//! either a value or a [`DirectoryError`]. Implementations must report
//! connectivity problems as [`DirectoryError::Unavailable`] (never cached)
//! and missing entries as [`DirectoryError::NoSuchObject`].

use crate::dn::Dn;
use crate::error::DirectoryError;
use crate::record::{Change, Entry, RawRecord, SearchOptions};
use async_trait::async_trait;

#[async_trait]
pub trait Directory: Send + Sync {
    /// Searches at `base` with the given scope and filter.
    async fn search(&self, base: &Dn, opts: &SearchOptions) -> Result<Vec<Entry>, DirectoryError>;

    /// Adds a new entry. Fails with [`DirectoryError::AlreadyExists`] when
    /// an entry is already present at `dn`.
    async fn add(&self, dn: &Dn, raw: &RawRecord) -> Result<(), DirectoryError>;

    /// Applies `changes` to the entry at `dn`.
    async fn modify(&self, dn: &Dn, changes: &[Change]) -> Result<(), DirectoryError>;

    async fn delete(&self, dn: &Dn) -> Result<(), DirectoryError>;
}
