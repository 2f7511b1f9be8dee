//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//!
//! Every data-access operation is instrumented with a span carrying the
//! model name and DN, and request adapters run operations inside the
//! request's own span, so one request's cache hits, directory searches and
//! skipped records line up under a single `request{req_id=..}` prefix.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Operation entry and mutations
//! RUST_LOG=info cargo run
//!
//! # Cache hits/misses, search options, authorization decisions
//! RUST_LOG=dir_model=trace cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=trace`**, a Get served first from the directory and then
//! from cache:
//!
//! ```text
//! INFO request:model_get: modelGet req_id=0b6f... model="Image" dn=uuid=... skip_cache=false
//! TRACE request:model_get: cache miss scope=ImageGet
//! INFO request:model_get: modelGet req_id=5c2e... model="Image" dn=uuid=... skip_cache=false
//! TRACE request:model_get: cache hit scope=ImageGet
//! ```
//!
//! **Severity guide**:
//! 1. `warn`: a listed record failed validation and was skipped, or a cached
//!    snapshot could not be rebuilt and was dropped.
//! 2. `error`: a write to the directory failed, or a DN matched more than one
//!    entry.

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
