//! # Application Lifecycle
//!
//! Wiring for the registry: [`RegistryApp`] is built once at startup from a
//! [`Config`](crate::config::Config) and a directory client, and owns the
//! single shared operation context every request derives from.
//!
//! ```rust,ignore
//! let config = Config::from_file("registry.json")?;
//! let app = RegistryApp::new(config, Arc::new(LdapDirectory::connect(url).await?))?;
//!
//! let resp = app.get_image(&Request::new().param("uuid", uuid)).await?;
//! ```
//!
//! ## Dependency Injection
//!
//! Nothing is global. The cache is built from `config.cache`, the directory
//! client is handed in, and the deployment mode travels to the resource
//! kinds as context state ([`RegistryState`](crate::model::RegistryState)).
//! Tests pass a [`MockDirectory`](dir_model::mock::MockDirectory).
//!
//! ## Observability
//!
//! Call [`dir_model::tracing::setup_tracing`] once from the binary. Every
//! route runs inside its request's span, so all events of one request share
//! its `req_id`.

pub mod registry;

pub use registry::*;
