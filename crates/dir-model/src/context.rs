//! # Operation Context
//!
//! A [`Context`] is the explicit handle passed into every operation. It owns
//! the shared cache and directory clients (behind `Arc`s) plus the
//! application state a resource kind needs; operations only borrow it.
//!
//! One base context is built at startup. Request adapters derive a
//! per-request copy carrying the authenticated [`Caller`] with
//! [`Context::for_caller`]; this clones three `Arc`s and nothing else.

use crate::cache::Cache;
use crate::directory::Directory;
use std::sync::Arc;

/// The authenticated identity a request was made by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub uuid: String,
    pub login: String,
    pub is_operator: bool,
}

impl Caller {
    pub fn new(uuid: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            login: login.into(),
            is_operator: false,
        }
    }

    pub fn operator(uuid: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            is_operator: true,
            ..Self::new(uuid, login)
        }
    }
}

pub struct Context<S> {
    cache: Arc<dyn Cache>,
    directory: Arc<dyn Directory>,
    state: Arc<S>,
    caller: Option<Caller>,
}

impl<S> Clone for Context<S> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            directory: Arc::clone(&self.directory),
            state: Arc::clone(&self.state),
            caller: self.caller.clone(),
        }
    }
}

impl<S> Context<S> {
    pub fn new(cache: Arc<dyn Cache>, directory: Arc<dyn Directory>, state: S) -> Self {
        Self {
            cache,
            directory,
            state: Arc::new(state),
            caller: None,
        }
    }

    /// A copy of this context acting on behalf of `caller`.
    pub fn for_caller(&self, caller: Option<Caller>) -> Self {
        Self {
            caller,
            ..self.clone()
        }
    }

    pub fn cache(&self) -> &dyn Cache {
        self.cache.as_ref()
    }

    pub fn directory(&self) -> &dyn Directory {
        self.directory.as_ref()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn caller(&self) -> Option<&Caller> {
        self.caller.as_ref()
    }
}
