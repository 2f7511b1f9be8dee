//! # Requests & Responses
//!
//! Transport-neutral shapes the request adapters in [`crate::handlers`]
//! consume and produce. A transport (HTTP server, RPC layer, test) builds a
//! [`Request`] from its route parameters, decoded JSON body and authenticated
//! identity, and turns the returned [`Response`] or
//! [`ModelError`](crate::error::ModelError) back into its own wire format.

use crate::context::Caller;
use crate::error::ModelError;
use crate::record::Record;
use serde_json::Value;
use tracing::Span;
use uuid::Uuid;

/// An inbound request.
///
/// `span` is the request's logger: every event emitted while an operation
/// runs for this request is recorded inside it, tagged with `req_id`.
#[derive(Debug, Clone)]
pub struct Request {
    pub req_id: Uuid,
    pub params: Record,
    pub body: Option<Record>,
    pub caller: Option<Caller>,
    pub span: Span,
}

impl Request {
    pub fn new() -> Self {
        let req_id = Uuid::new_v4();
        Self {
            req_id,
            params: Record::new(),
            body: None,
            caller: None,
            span: tracing::info_span!("request", %req_id),
        }
    }

    /// Adds a route parameter.
    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params
            .insert(name.to_string(), Value::String(value.into()));
        self
    }

    /// Sets the JSON body. Non-object bodies are ignored.
    pub fn body(mut self, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.body = Some(map);
        }
        self
    }

    pub fn caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    /// A route parameter as a string, if present.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    /// Route parameters overlaid with body fields; the body wins on
    /// collisions.
    pub fn data(&self) -> Record {
        let mut data = self.params.clone();
        if let Some(body) = &self.body {
            for (key, value) in body {
                data.insert(key.clone(), value.clone());
            }
        }
        data
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

/// An outbound response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Option<Value>,
}

impl Response {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }
}

impl From<&ModelError> for Response {
    fn from(err: &ModelError) -> Self {
        Self {
            status: err.status_code(),
            body: Some(err.body()),
        }
    }
}
