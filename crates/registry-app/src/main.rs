//! # Image Registry Demo
//!
//! Runs the registry against an in-memory directory and walks one image
//! through create, get, list, put and delete.
//!
//! ```bash
//! RUST_LOG=info cargo run -p registry-app
//! RUST_LOG=trace cargo run -p registry-app -- registry.json
//! ```

use dir_model::mock::MockDirectory;
use dir_model::tracing::setup_tracing;
use dir_model::{Caller, ModelError, Request};
use registry_app::config::Config;
use registry_app::lifecycle::RegistryApp;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

const OPERATOR: &str = "930896af-bf8c-48d4-885c-6573a94b1853";

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };

    let directory = Arc::new(MockDirectory::new());
    let base_dn = config.base_dn().map_err(|e| e.to_string())?;
    directory.add_container(&base_dn.child("ou", "images"));

    let app = RegistryApp::new(config, directory).map_err(|e| e.to_string())?;
    let caller = Caller::operator(OPERATOR, "admin");

    if let Err(e) = run(&app, caller).await {
        error!(code = e.rest_code(), error = %e, "demo failed");
        return Err(e.to_string());
    }

    info!("Application completed successfully");
    Ok(())
}

async fn run(app: &RegistryApp, caller: Caller) -> Result<(), ModelError> {
    let created = app
        .create_image(
            &Request::new()
                .body(json!({"name": "base64", "type": "zone-dataset", "os": "smartos"}))
                .caller(caller.clone()),
        )
        .await?;
    let image = created.body.unwrap_or(Value::Null);
    let uuid = image["uuid"].as_str().unwrap_or_default().to_string();
    info!(%uuid, "image created");

    let got = app
        .get_image(&Request::new().param("uuid", &uuid))
        .await?;
    info!(image = ?got.body, "image fetched");

    let mut replacement = image.clone();
    replacement["name"] = json!("base64-lts");
    let put = app
        .put_image(
            &Request::new()
                .param("uuid", &uuid)
                .body(raw_form(&replacement))
                .caller(caller.clone()),
        )
        .await?;
    info!(image = ?put.body, "image replaced");

    let listed = app.list_images(&Request::new()).await?;
    let count = listed
        .body
        .as_ref()
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    info!(count, "images listed");

    app.delete_image(
        &Request::new()
            .param("uuid", &uuid)
            .caller(caller),
    )
    .await?;
    info!(%uuid, "image deleted");

    app.drop_caches().await;
    Ok(())
}

/// Turns a serialized image back into its raw attribute names for Put.
fn raw_form(image: &Value) -> Value {
    let mut raw = image.clone();
    if let Value::Object(map) = &mut raw {
        for (api, attr) in [("tags", "tag"), ("datacenters", "datacenter")] {
            if let Some(value) = map.remove(api) {
                map.insert(attr.to_string(), value);
            }
        }
    }
    raw
}
