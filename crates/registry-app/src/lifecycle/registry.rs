use crate::config::{Config, ConfigError};
use crate::model::{Image, RegistryState};
use dir_model::handlers::{request_create, request_delete, request_get, request_list, request_put};
use dir_model::{Context, Directory, MemoryCache, ModelError, Request, Response};
use std::sync::Arc;
use tracing::info;

/// The image registry: one shared context plus the image routes.
pub struct RegistryApp {
    config: Config,
    ctx: Context<RegistryState>,
}

impl RegistryApp {
    pub fn new(config: Config, directory: Arc<dyn Directory>) -> Result<Self, ConfigError> {
        let base_dn = config.base_dn()?;
        let cache = Arc::new(MemoryCache::new(config.cache.size, config.cache.expiry()));
        let state = RegistryState::new(config.mode, &base_dn);
        info!(
            mode = %config.mode,
            images_dn = %state.images_dn,
            cache_size = config.cache.size,
            cache_expiry = config.cache.expiry,
            "registry app created"
        );
        Ok(Self {
            ctx: Context::new(cache, directory, state),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn context(&self) -> &Context<RegistryState> {
        &self.ctx
    }

    /// `GET /images`
    pub async fn list_images(&self, req: &Request) -> Result<Response, ModelError> {
        request_list::<Image>(&self.ctx, req).await
    }

    /// `GET /images/:uuid`
    pub async fn get_image(&self, req: &Request) -> Result<Response, ModelError> {
        request_get::<Image>(&self.ctx, req).await
    }

    /// `POST /images`
    pub async fn create_image(&self, req: &Request) -> Result<Response, ModelError> {
        request_create::<Image>(&self.ctx, req).await
    }

    /// `PUT /images/:uuid`
    pub async fn put_image(&self, req: &Request) -> Result<Response, ModelError> {
        request_put::<Image>(&self.ctx, req).await
    }

    /// `DELETE /images/:uuid`
    pub async fn delete_image(&self, req: &Request) -> Result<Response, ModelError> {
        request_delete::<Image>(&self.ctx, req).await
    }

    /// Drops every cached entry of every kind.
    pub async fn drop_caches(&self) {
        info!("dropping caches");
        self.ctx.cache().clear().await;
    }
}
