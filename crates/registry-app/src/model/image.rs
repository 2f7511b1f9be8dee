//! # Image
//!
//! A published machine image. Stored as an `sdcimage` entry at
//! `uuid=<uuid>,ou=images,<base_dn>`.
//!
//! Raw attributes:
//!
//! | attribute      | required | values                                   |
//! |----------------|----------|------------------------------------------|
//! | `uuid`         | yes      | lower-case hyphenated UUID               |
//! | `name`         | yes      | at most 512 characters                   |
//! | `type`         | yes      | `zone-dataset`, `zvol`                   |
//! | `os`           | yes      | `smartos`, `linux`, `windows`, `other`   |
//! | `published_at` | yes      | `YYYY-MM-DDTHH:MM:SS(.SSS)Z`             |
//! | `disabled`     | yes      | `true`, `false`                          |
//! | `owner`        | yes      | lower-case hyphenated UUID               |
//! | `description`  | no       |                                          |
//! | `tag`          | no       | multi-valued                             |
//! | `datacenter`   | no       | multi-valued                             |

use super::RegistryState;
use crate::config::Mode;
use async_trait::async_trait;
use chrono::{NaiveDateTime, SecondsFormat, Utc};
use dir_model::{Context, Dn, FieldError, Model, ModelError, RawRecord, Record, Request};
use serde_json::{json, Value};
use uuid::Uuid;

const MAX_NAME_LEN: usize = 512;
const TYPES: [&str; 2] = ["zone-dataset", "zvol"];
const OSES: [&str; 4] = ["smartos", "linux", "windows", "other"];

#[derive(Debug, Clone)]
pub struct Image {
    pub uuid: String,
    dn: Dn,
    raw: RawRecord,
}

impl Image {
    pub fn name(&self) -> &str {
        self.raw.first("name").unwrap_or_default()
    }

    pub fn owner(&self) -> &str {
        self.raw.first("owner").unwrap_or_default()
    }

    pub fn disabled(&self) -> bool {
        self.raw.first("disabled") == Some("true")
    }

    pub fn tags(&self) -> &[String] {
        self.raw.values("tag")
    }

    pub fn datacenters(&self) -> &[String] {
        self.raw.values("datacenter")
    }
}

/// Matches `^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$`.
fn is_uuid(s: &str) -> bool {
    Uuid::parse_str(s).is_ok_and(|u| u.hyphenated().to_string() == s)
}

/// Second precision, or exactly three fractional digits, always UTC.
fn is_timestamp(s: &str) -> bool {
    let shape_ok = match s.len() {
        20 => true,
        24 => s.as_bytes()[19] == b'.',
        _ => false,
    };
    shape_ok && NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ").is_ok()
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> Option<FieldError> {
    (!allowed.contains(&value)).then(|| {
        FieldError::invalid(field).with_message(format!(
            "invalid image {field}: \"{value}\" (must be one of: {})",
            allowed.join(", ")
        ))
    })
}

fn validate(raw: &RawRecord) -> Vec<FieldError> {
    let mut errors = Vec::new();

    match raw.first("uuid") {
        None => errors.push(FieldError::missing("uuid")),
        Some(uuid) if !is_uuid(uuid) => errors.push(FieldError::invalid("uuid")),
        Some(_) => {}
    }

    match raw.first("name") {
        None | Some("") => errors.push(FieldError::missing("name")),
        Some(name) if name.chars().count() > MAX_NAME_LEN => errors.push(
            FieldError::invalid("name")
                .with_message(format!("image name is too long (max {MAX_NAME_LEN} characters)")),
        ),
        Some(_) => {}
    }

    match raw.first("disabled") {
        None => errors.push(FieldError::missing("disabled")),
        Some("true" | "false") => {}
        Some(_) => errors.push(FieldError::invalid("disabled")),
    }

    match raw.first("published_at") {
        None => errors.push(FieldError::missing("published_at")),
        Some(ts) if !is_timestamp(ts) => errors.push(
            FieldError::invalid("published_at")
                .with_message("published_at date not in \"YYYY-MM-DDTHH:MM:SS(.SSS)Z\" format"),
        ),
        Some(_) => {}
    }

    match raw.first("type") {
        None => errors.push(FieldError::missing("type")),
        Some(value) => errors.extend(one_of("type", value, &TYPES)),
    }

    match raw.first("os") {
        None => errors.push(FieldError::missing("os")),
        Some(value) => errors.extend(one_of("os", value, &OSES)),
    }

    match raw.first("owner") {
        None => errors.push(FieldError::missing("owner")),
        Some(owner) if !is_uuid(owner) => errors.push(FieldError::invalid("owner")),
        Some(_) => {}
    }

    errors
}

#[async_trait]
impl Model for Image {
    const NAME: &'static str = "Image";
    const OBJECTCLASS: &'static str = "sdcimage";
    type State = RegistryState;

    fn from_raw(ctx: &Context<RegistryState>, raw: RawRecord) -> Result<Self, ModelError> {
        match raw.first("objectclass") {
            None => {
                return Err(ModelError::Internal(
                    "no \"objectclass\" field on raw image data".into(),
                ))
            }
            Some(oc) if !raw.has_objectclass(Self::OBJECTCLASS) => {
                return Err(ModelError::Internal(format!(
                    "invalid \"objectclass\" field on raw image data: \"{oc}\""
                )))
            }
            Some(_) => {}
        }

        let errors = validate(&raw);
        if !errors.is_empty() {
            let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
            return Err(ModelError::validation(
                format!("invalid image data: {}", fields.join(", ")),
                errors,
            ));
        }

        let uuid = raw.first("uuid").unwrap_or_default().to_string();
        Ok(Self {
            dn: ctx.state().images_dn.child("uuid", &uuid),
            uuid,
            raw,
        })
    }

    async fn create(ctx: &Context<RegistryState>, data: Record) -> Result<Self, ModelError> {
        let submitted = RawRecord::from(&data);

        let mut raw = RawRecord::new();
        raw.set("uuid", Uuid::new_v4().to_string())
            .set(
                "published_at",
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .set("disabled", submitted.first("disabled").unwrap_or("false"))
            .set("objectclass", Self::OBJECTCLASS);
        for (from, to) in [
            ("name", "name"),
            ("type", "type"),
            ("os", "os"),
            ("description", "description"),
            ("tags", "tag"),
            ("datacenters", "datacenter"),
        ] {
            raw.set_all(to, submitted.values(from).iter().cloned());
        }

        let owner = submitted
            .first("owner")
            .map(str::to_string)
            .or_else(|| ctx.caller().map(|c| c.uuid.clone()));
        if let Some(owner) = owner {
            raw.set("owner", owner);
        }

        Self::from_raw(ctx, raw)
    }

    fn dn_from_request(ctx: &Context<RegistryState>, req: &Request) -> Result<Dn, ModelError> {
        let uuid = req.param_str("uuid").unwrap_or_default();
        if !is_uuid(uuid) {
            return Err(ModelError::invalid_parameter(
                format!("invalid image uuid: \"{uuid}\""),
                vec![FieldError::invalid("uuid")],
            ));
        }
        Ok(ctx.state().images_dn.child("uuid", uuid))
    }

    fn parent_dn_from_request(
        ctx: &Context<RegistryState>,
        _req: &Request,
    ) -> Result<Dn, ModelError> {
        Ok(ctx.state().images_dn.clone())
    }

    fn dn(&self) -> &Dn {
        &self.dn
    }

    fn raw(&self) -> &RawRecord {
        &self.raw
    }

    fn serialize(&self) -> Value {
        let mut data = json!({
            "uuid": self.uuid,
            "owner": self.owner(),
            "name": self.name(),
            "os": self.raw.first("os"),
            "type": self.raw.first("type"),
            "published_at": self.raw.first("published_at"),
            "disabled": self.disabled(),
        });
        if let Value::Object(map) = &mut data {
            if !self.datacenters().is_empty() {
                map.insert("datacenters".into(), json!(self.datacenters()));
            }
            if !self.tags().is_empty() {
                map.insert("tags".into(), json!(self.tags()));
            }
            if let Some(description) = self.raw.first("description") {
                map.insert("description".into(), json!(description));
            }
        }
        data
    }

    async fn authorize_write(&self, ctx: &Context<RegistryState>) -> Result<(), ModelError> {
        match (ctx.state().mode, ctx.caller()) {
            (Mode::Public, Some(caller)) if caller.is_operator => Ok(()),
            (Mode::Public, _) => Err(ModelError::Unauthorized(
                "only operators may modify images in a public registry".into(),
            )),
            (_, Some(_)) => Ok(()),
            (_, None) => Err(ModelError::Unauthorized(
                "writing an image requires an authenticated caller".into(),
            )),
        }
    }

    async fn authorize_replace(
        &self,
        ctx: &Context<RegistryState>,
        current: &RawRecord,
    ) -> Result<(), ModelError> {
        match ctx.caller() {
            Some(caller) if caller.is_operator => Ok(()),
            Some(caller) if current.first("owner") == Some(caller.uuid.as_str()) => Ok(()),
            _ => Err(ModelError::Unauthorized(format!(
                "not allowed to replace image {}",
                self.uuid
            ))),
        }
    }

    async fn authorize_delete(&self, ctx: &Context<RegistryState>) -> Result<(), ModelError> {
        let mode = ctx.state().mode;
        match ctx.caller() {
            Some(caller) if caller.is_operator => Ok(()),
            Some(caller) if mode != Mode::Public && caller.uuid == self.owner() => Ok(()),
            _ => Err(ModelError::Unauthorized(format!(
                "not allowed to delete image {}",
                self.uuid
            ))),
        }
    }
}
