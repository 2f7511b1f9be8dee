//! A minimal `Widget` resource kind shared by the behaviour tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dir_model::mock::MockDirectory;
use dir_model::{
    Context, Dn, FieldError, MemoryCache, Model, ModelError, RawRecord, Record, Request,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub const PARENT: &str = "ou=widgets,o=test";
const COLORS: [&str; 3] = ["red", "green", "blue"];

pub fn parent() -> Dn {
    Dn::parse(PARENT).unwrap()
}

pub fn widget_dn(id: &str) -> Dn {
    parent().child("id", id)
}

#[derive(Debug, Clone)]
pub struct Widget {
    pub id: String,
    dn: Dn,
    raw: RawRecord,
}

#[async_trait]
impl Model for Widget {
    const NAME: &'static str = "Widget";
    const OBJECTCLASS: &'static str = "widget";
    type State = ();

    fn from_raw(_ctx: &Context<()>, raw: RawRecord) -> Result<Self, ModelError> {
        if !raw.has_objectclass(Self::OBJECTCLASS) {
            return Err(ModelError::Internal("not a widget".into()));
        }
        if raw.values("id").len() > 1 {
            return Err(ModelError::Internal("ambiguous widget id".into()));
        }
        let mut errors = Vec::new();
        let id = raw.first("id").unwrap_or_default().to_string();
        if id.is_empty() {
            errors.push(FieldError::missing("id"));
        }
        if let Some(color) = raw.first("color") {
            if !COLORS.contains(&color) {
                errors.push(FieldError::invalid("color"));
            }
        }
        if !errors.is_empty() {
            return Err(ModelError::validation("invalid widget data", errors));
        }
        Ok(Self {
            dn: widget_dn(&id),
            id,
            raw,
        })
    }

    async fn create(ctx: &Context<()>, data: Record) -> Result<Self, ModelError> {
        let mut raw = RawRecord::from(&data);
        raw.set("objectclass", Self::OBJECTCLASS);
        Self::from_raw(ctx, raw)
    }

    fn dn_from_request(_ctx: &Context<()>, req: &Request) -> Result<Dn, ModelError> {
        match req.param_str("id") {
            Some(id) if !id.is_empty() => Ok(widget_dn(id)),
            _ => Err(ModelError::invalid_parameter(
                "missing widget id",
                vec![FieldError::missing("id")],
            )),
        }
    }

    fn parent_dn_from_request(_ctx: &Context<()>, _req: &Request) -> Result<Dn, ModelError> {
        Ok(parent())
    }

    fn dn(&self) -> &Dn {
        &self.dn
    }

    fn raw(&self) -> &RawRecord {
        &self.raw
    }

    fn serialize(&self) -> Value {
        json!({
            "id": self.id,
            "color": self.raw.first("color"),
            "owner": self.raw.first("owner"),
        })
    }

    async fn authorize_write(&self, _ctx: &Context<()>) -> Result<(), ModelError> {
        if self.raw.first("locked") == Some("true") {
            return Err(ModelError::Unauthorized("widget is locked".into()));
        }
        Ok(())
    }

    async fn authorize_replace(
        &self,
        _ctx: &Context<()>,
        current: &RawRecord,
    ) -> Result<(), ModelError> {
        match current.first("owner") {
            Some(owner) if Some(owner) != self.raw.first("owner") => Err(
                ModelError::Unauthorized(format!("widget {} belongs to {owner}", self.id)),
            ),
            _ => Ok(()),
        }
    }

    async fn authorize_delete(&self, ctx: &Context<()>) -> Result<(), ModelError> {
        match ctx.caller() {
            Some(_) => Ok(()),
            None => Err(ModelError::Unauthorized("anonymous delete".into())),
        }
    }
}

/// A fresh cache and mock directory with the widget container in place.
pub struct Harness {
    pub cache: Arc<MemoryCache>,
    pub directory: Arc<MockDirectory>,
    pub ctx: Context<()>,
}

impl Harness {
    pub fn new() -> Self {
        let cache = Arc::new(MemoryCache::default());
        let directory = Arc::new(MockDirectory::new());
        directory.add_container(&parent());
        let ctx = Context::new(cache.clone(), directory.clone(), ());
        Self {
            cache,
            directory,
            ctx,
        }
    }
}

pub fn data(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

pub fn raw_widget(id: &str, color: &str) -> RawRecord {
    let mut raw = RawRecord::new();
    raw.set("id", id)
        .set("color", color)
        .set("objectclass", "widget");
    raw
}
