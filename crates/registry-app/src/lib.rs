//! # Image Registry
//!
//! An image registry built on [`dir_model`]: images are `sdcimage` entries
//! in a directory, served through the generic cached operations.
//!
//! - **[config]**: JSON configuration (mode, base DN, cache sizing).
//! - **[model]**: the [`Image`](model::Image) resource kind.
//! - **[lifecycle]**: [`RegistryApp`](lifecycle::RegistryApp), which owns
//!   the shared context and exposes the image routes.

pub mod config;
pub mod lifecycle;
pub mod model;
