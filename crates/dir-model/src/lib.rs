//! # Directory Model
//!
//! This crate provides a generic, cached data-access layer for records of many
//! resource kinds stored in a hierarchical directory (entries addressed by
//! distinguished names, searched by filter and scope). It is the substrate
//! every resource type of a registry builds on: images, users, policies, …
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into four layers:
//!
//! 1. **Resource Kind Layer** ([`Model`]) - what a kind is: how it validates
//!    raw records, where it lives, how it is serialized and who may write it.
//! 2. **Facade Layer** ([`Cache`], [`Directory`]) - the external key/value
//!    cache and directory client, reached only through traits.
//! 3. **Operation Layer** ([`ops`]) - list, get, create, put, update and
//!    delete, written *once* and generic over every kind.
//! 4. **Adapter Layer** ([`handlers`]) - request/response translation.
//!
//! ## Core Abstractions
//!
//! ### [`Model`] - The Resource Kind
//!
//! ```rust
//! use async_trait::async_trait;
//! use dir_model::{Context, Dn, Model, ModelError, RawRecord, Record, Request};
//! use serde_json::{json, Value};
//!
//! #[derive(Debug)]
//! struct Widget { dn: Dn, raw: RawRecord }
//!
//! fn parent() -> Dn { Dn::parse("ou=widgets,o=test").unwrap() }
//!
//! #[async_trait]
//! impl Model for Widget {
//!     const NAME: &'static str = "Widget";
//!     const OBJECTCLASS: &'static str = "widget";
//!     type State = ();
//!
//!     fn from_raw(_: &Context<()>, raw: RawRecord) -> Result<Self, ModelError> {
//!         let id = raw.first("id").ok_or_else(|| ModelError::validation("no id", vec![]))?;
//!         Ok(Self { dn: parent().child("id", id), raw })
//!     }
//!     async fn create(ctx: &Context<()>, data: Record) -> Result<Self, ModelError> {
//!         let mut raw = RawRecord::from(&data);
//!         raw.set("objectclass", "widget");
//!         Self::from_raw(ctx, raw)
//!     }
//!     fn dn_from_request(_: &Context<()>, req: &Request) -> Result<Dn, ModelError> {
//!         Ok(parent().child("id", req.param_str("id").unwrap_or_default()))
//!     }
//!     fn parent_dn_from_request(_: &Context<()>, _: &Request) -> Result<Dn, ModelError> {
//!         Ok(parent())
//!     }
//!     fn dn(&self) -> &Dn { &self.dn }
//!     fn raw(&self) -> &RawRecord { &self.raw }
//!     fn serialize(&self) -> Value { json!({ "id": self.raw.first("id") }) }
//! }
//! ```
//!
//! ### [`Context`] - Explicit Dependencies
//!
//! ```rust,ignore
//! let directory = Arc::new(MockDirectory::new());
//! let ctx = Context::new(Arc::new(MemoryCache::default()), directory, ());
//!
//! let widget = model_create::<Widget>(&ctx, data).await?;
//! let again: Widget = model_get(&ctx, widget.dn(), false).await?;
//! ```
//!
//! The context owns the cache and directory clients; operations borrow it.
//! There is no ambient global state.
//!
//! ## Cache Consistency
//!
//! - The cache only ever holds raw records or failures, never instances.
//! - Transient directory failures are never cached.
//! - Every successful mutation invalidates the affected Get and List entries
//!   before the operation returns.
//!
//! See [`ops`] for the full protocol.
//!
//! ## Concurrency Model
//!
//! Operations take no locks of their own. Concurrent reads of the same key may
//! both miss and both search; the later cache write simply wins. Concurrent
//! creates of the same DN race at the directory's `add`, which is the single
//! source of truth for uniqueness.
//!
//! ## Testing
//!
//! [`mock::MockDirectory`] is an in-memory directory with call counters and
//! failure injection; [`MemoryCache`] doubles as an inspectable test cache.

pub mod cache;
pub mod context;
pub mod directory;
pub mod dn;
pub mod error;
pub mod handlers;
pub mod mock;
pub mod model;
pub mod ops;
pub mod record;
pub mod request;
pub mod tracing;

// Re-export core types for convenience
pub use cache::{Cache, CacheEntry, Invalidation, MemoryCache};
pub use context::{Caller, Context};
pub use directory::Directory;
pub use dn::Dn;
pub use error::{DirectoryError, FieldError, ModelError};
pub use model::Model;
pub use record::{Change, Entry, Filter, RawRecord, Record, SearchOptions, SearchScope};
pub use request::{Request, Response};
