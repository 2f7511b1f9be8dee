//! Resource kinds served by the registry.

pub mod image;

pub use image::Image;

use crate::config::Mode;
use dir_model::Dn;

/// Application state shared by every resource kind through the operation
/// context.
#[derive(Debug, Clone)]
pub struct RegistryState {
    pub mode: Mode,
    /// Container all images live under (`ou=images,<base_dn>`).
    pub images_dn: Dn,
}

impl RegistryState {
    pub fn new(mode: Mode, base_dn: &Dn) -> Self {
        Self {
            mode,
            images_dn: base_dn.child("ou", "images"),
        }
    }
}
