//! # Model Trait
//!
//! The `Model` trait defines the contract every resource kind (images, users,
//! policies) implements to be stored through the generic data-access
//! operations in [`crate::ops`]. Each kind is a concrete type selected by the
//! caller; the operations are generic over it and never inspect a record's
//! shape to decide what it is.
//!
//! # Architecture Note
//! A model instance always carries two pieces of state:
//!
//! - its [`RawRecord`], the directory-native form and the only thing the
//!   cache stores, and
//! - its [`Dn`], the address it lives at.
//!
//! Instances are rebuilt from raw data on every read ([`Model::from_raw`]),
//! so a cached snapshot that no longer validates can be dropped without
//! affecting instances already handed out. The DN an instance derives from
//! its raw data must name the entry it was read from; the operations treat
//! a record stored anywhere else as invalid.
//!
//! # Provided Methods (Hooks)
//! [`Model::authorize_write`], [`Model::authorize_replace`] and
//! [`Model::authorize_delete`] default to allowing the mutation.
//! [`Model::list_filter`] defaults to the kind's objectclass.

use crate::context::Context;
use crate::dn::Dn;
use crate::error::ModelError;
use crate::record::{Filter, RawRecord, Record};
use crate::request::Request;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

#[async_trait]
pub trait Model: Debug + Send + Sync + Sized + 'static {
    /// Kind name, used to derive cache scopes (`"<NAME>Get"`, `"<NAME>List"`).
    const NAME: &'static str;

    /// Objectclass value identifying records of this kind in the directory.
    const OBJECTCLASS: &'static str;

    /// Field that the put adapter stamps with the authenticated caller's id.
    const CALLER_FIELD: &'static str = "owner";

    /// Application state made available to every hook through the
    /// [`Context`]. Use `()` if the kind needs none.
    type State: Send + Sync + 'static;

    /// Builds an instance from raw directory data, validating it.
    ///
    /// A failure here concerns this one record only: List skips it, Get
    /// reports it as an internal error.
    fn from_raw(ctx: &Context<Self::State>, raw: RawRecord) -> Result<Self, ModelError>;

    /// Validates submitted data and produces a new instance without touching
    /// the directory. Defaults (generated ids, timestamps) are filled here.
    async fn create(ctx: &Context<Self::State>, data: Record) -> Result<Self, ModelError>;

    fn dn_from_request(ctx: &Context<Self::State>, req: &Request) -> Result<Dn, ModelError>;

    fn parent_dn_from_request(ctx: &Context<Self::State>, req: &Request)
        -> Result<Dn, ModelError>;

    /// Filter used by List. The List cache key includes it.
    fn list_filter() -> Filter {
        Filter::objectclass(Self::OBJECTCLASS)
    }

    fn dn(&self) -> &Dn;

    fn raw(&self) -> &RawRecord;

    /// Output-safe view of this instance, without internal storage fields.
    fn serialize(&self) -> Value;

    // --- Authorization Hooks (Async) ---

    /// Called by create, put and update before the directory is mutated.
    async fn authorize_write(&self, _ctx: &Context<Self::State>) -> Result<(), ModelError> {
        Ok(())
    }

    /// Called by put when an entry already exists at this instance's DN,
    /// with the stored raw record it is about to overwrite. Runs after
    /// [`Model::authorize_write`].
    async fn authorize_replace(
        &self,
        _ctx: &Context<Self::State>,
        _current: &RawRecord,
    ) -> Result<(), ModelError> {
        Ok(())
    }

    /// Called by delete before the entry is removed.
    async fn authorize_delete(&self, _ctx: &Context<Self::State>) -> Result<(), ModelError> {
        Ok(())
    }
}
