//! # Request Adapters
//!
//! Thin wrappers that translate a [`Request`] into a call on one of the
//! operations in [`crate::ops`] and its result into a [`Response`].
//!
//! * DNs come from the kind's [`Model::dn_from_request`] /
//!   [`Model::parent_dn_from_request`].
//! * Create and put build their data record from the route parameters
//!   overlaid with the body ([`Request::data`]); this means route variable
//!   names must match the model's data keys.
//! * Put also stamps the authenticated caller into
//!   [`Model::CALLER_FIELD`].
//! * Errors are returned untranslated; the transport decides how to render
//!   them (see `impl From<&ModelError> for Response`).
//!
//! Each adapter runs inside the request's span and with a context carrying
//! the request's caller.

use crate::context::Context;
use crate::error::ModelError;
use crate::model::Model;
use crate::ops::{model_create, model_delete, model_get, model_list, model_put};
use crate::request::{Request, Response};
use serde_json::Value;
use tracing::{trace, Instrument};

pub async fn request_list<M: Model>(
    ctx: &Context<M::State>,
    req: &Request,
) -> Result<Response, ModelError> {
    let ctx = ctx.for_caller(req.caller.clone());
    async {
        trace!(params = ?req.params, "<{}> list entered", M::NAME);
        let parent_dn = M::parent_dn_from_request(&ctx, req)?;
        let items = model_list::<M>(&ctx, &parent_dn).await?;
        let data: Vec<Value> = items.iter().map(M::serialize).collect();
        trace!(count = data.len(), "items from modelList");
        Ok::<_, ModelError>(Response::ok(Value::Array(data)))
    }
    .instrument(req.span.clone())
    .await
}

pub async fn request_get<M: Model>(
    ctx: &Context<M::State>,
    req: &Request,
) -> Result<Response, ModelError> {
    let ctx = ctx.for_caller(req.caller.clone());
    async {
        trace!(params = ?req.params, "<{}> get entered", M::NAME);
        let dn = M::dn_from_request(&ctx, req)?;
        let item = model_get::<M>(&ctx, &dn, false).await?;
        Ok::<_, ModelError>(Response::ok(item.serialize()))
    }
    .instrument(req.span.clone())
    .await
}

pub async fn request_create<M: Model>(
    ctx: &Context<M::State>,
    req: &Request,
) -> Result<Response, ModelError> {
    let ctx = ctx.for_caller(req.caller.clone());
    async {
        trace!(params = ?req.params, body = ?req.body, "<{}> create entered", M::NAME);
        let item = model_create::<M>(&ctx, req.data()).await?;
        Ok::<_, ModelError>(Response::ok(item.serialize()))
    }
    .instrument(req.span.clone())
    .await
}

pub async fn request_put<M: Model>(
    ctx: &Context<M::State>,
    req: &Request,
) -> Result<Response, ModelError> {
    let ctx = ctx.for_caller(req.caller.clone());
    async {
        trace!(params = ?req.params, body = ?req.body, "<{}> put entered", M::NAME);
        let caller = req.caller.as_ref().ok_or_else(|| {
            ModelError::Unauthorized("put requires an authenticated caller".into())
        })?;
        let mut data = req.data();
        data.insert(
            M::CALLER_FIELD.to_string(),
            Value::String(caller.uuid.clone()),
        );
        let item = model_put::<M>(&ctx, data).await?;
        Ok::<_, ModelError>(Response::ok(item.serialize()))
    }
    .instrument(req.span.clone())
    .await
}

pub async fn request_delete<M: Model>(
    ctx: &Context<M::State>,
    req: &Request,
) -> Result<Response, ModelError> {
    let ctx = ctx.for_caller(req.caller.clone());
    async {
        trace!(params = ?req.params, "<{}> delete entered", M::NAME);
        let dn = M::dn_from_request(&ctx, req)?;
        model_delete::<M>(&ctx, &dn).await?;
        Ok::<_, ModelError>(Response::no_content())
    }
    .instrument(req.span.clone())
    .await
}
