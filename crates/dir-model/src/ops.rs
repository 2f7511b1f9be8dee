//! # Data-Access Operations
//!
//! Generic list/get/create/put/update/delete over any [`Model`], composed
//! from the [`Cache`](crate::cache::Cache) and
//! [`Directory`](crate::directory::Directory) in the [`Context`].
//!
//! ## Cache protocol
//!
//! * **Reads** consult the cache first. A cached failure is returned as-is;
//!   cached raw data is rebuilt into instances, and if that fails the entry
//!   is dropped and the directory is searched again.
//! * **Placement**: an instance's [`Model::dn`] must name the entry its raw
//!   data was read from. A record whose attributes point elsewhere is treated
//!   like any other record that fails [`Model::from_raw`].
//! * **Failures** are cached unless they are transient
//!   ([`ModelError::is_transient`]); an unreachable directory is always
//!   re-attempted.
//! * **Mutations** invalidate the affected Get and List entries only after
//!   the directory confirmed the write.
//!
//! ## Operations
//!
//! * **List**: immediate children of a parent DN matching
//!   [`Model::list_filter`]. Records that fail [`Model::from_raw`] are logged
//!   and skipped; List only fails for directory-level errors.
//! * **Get**: the entry at exactly one DN. No entry maps to
//!   `ResourceNotFound` (cached); more than one maps to `Internal` (not
//!   cached).
//! * **Create**: [`Model::create`], then [`Model::authorize_write`], then
//!   `add`.
//! * **Put**: [`Model::from_raw`] on the submitted data, then
//!   `authorize_write`, then `add`; if the entry already exists,
//!   [`Model::authorize_replace`] sees the stored record and the entry is
//!   replaced in place with a single `modify`.
//! * **Update**: `authorize_write`, then `modify`.
//! * **Delete**: an uncached Get, then [`Model::authorize_delete`], then
//!   `delete`.

use crate::cache::{get_scope, list_key, list_scope, CacheEntry, Invalidation};
use crate::context::Context;
use crate::dn::Dn;
use crate::error::{DirectoryError, ModelError};
use crate::model::Model;
use crate::record::{Change, Entry, RawRecord, Record, SearchOptions};
use tracing::{debug, error, info, instrument, trace, warn};

fn invalidation<'a, M: Model>(item: &'a M, dn: &'a Dn) -> Invalidation<'a> {
    Invalidation {
        kind: M::NAME,
        dn,
        list_key: dn.parent().map(|p| list_key(&p, &M::list_filter())),
        raw: item.raw(),
    }
}

/// Rebuilds an instance from raw data read at `dn`.
fn from_raw_at<M: Model>(
    ctx: &Context<M::State>,
    dn: &Dn,
    raw: RawRecord,
) -> Result<M, ModelError> {
    let item = M::from_raw(ctx, raw)?;
    if !item.dn().same_entry(dn) {
        return Err(ModelError::Internal(format!(
            "{} data stored at {dn} describes {}",
            M::NAME.to_lowercase(),
            item.dn()
        )));
    }
    Ok(item)
}

/// Lists the `M` instances directly under `parent_dn`.
#[instrument(skip_all, fields(model = M::NAME, parent_dn = %parent_dn))]
pub async fn model_list<M: Model>(
    ctx: &Context<M::State>,
    parent_dn: &Dn,
) -> Result<Vec<M>, ModelError> {
    info!("modelList");
    let filter = M::list_filter();
    let scope = list_scope(M::NAME);
    let key = list_key(parent_dn, &filter);

    match ctx.cache().get(&scope, &key).await {
        Some(CacheEntry::Failed(err)) => {
            trace!(%scope, %key, error = %err, "cache hit (error)");
            return Err(err);
        }
        Some(CacheEntry::Items(raws)) => {
            let rebuilt: Result<Vec<M>, ModelError> = raws
                .into_iter()
                .map(|raw| {
                    let item = M::from_raw(ctx, raw)?;
                    match item.dn().parent() {
                        Some(parent) if parent.same_entry(parent_dn) => Ok(item),
                        _ => Err(ModelError::Internal(format!(
                            "cached {} at {} is not under {parent_dn}",
                            M::NAME.to_lowercase(),
                            item.dn()
                        ))),
                    }
                })
                .collect();
            match rebuilt {
                Ok(items) => {
                    trace!(%scope, %key, count = items.len(), "cache hit");
                    return Ok(items);
                }
                Err(e) => {
                    warn!(%scope, %key, error = %e, "error in cached data, dropping");
                    ctx.cache().delete(&scope, &key).await;
                }
            }
        }
        Some(CacheEntry::Item(_)) => {
            warn!(%scope, %key, "unexpected single item in list scope, dropping");
            ctx.cache().delete(&scope, &key).await;
        }
        None => trace!(%scope, %key, "cache miss"),
    }

    let opts = SearchOptions::one(filter);
    debug!(filter = ?opts.filter, scope = %opts.scope, "directory search");
    let entries = match ctx.directory().search(parent_dn, &opts).await {
        Ok(entries) => entries,
        Err(e) => {
            let err = ModelError::from(e);
            if err.is_transient() {
                warn!(error = %err, "directory unavailable, not caching");
            } else {
                ctx.cache()
                    .set(&scope, &key, CacheEntry::Failed(err.clone()))
                    .await;
            }
            return Err(err);
        }
    };

    let mut items = Vec::with_capacity(entries.len());
    for Entry { dn, raw } in entries {
        match from_raw_at::<M>(ctx, &dn, raw) {
            Ok(item) => items.push(item),
            Err(e) if e.is_validation() => {
                warn!(%dn, error = %e, "ignoring invalid {}", M::NAME);
            }
            Err(e) => {
                error!(%dn, error = %e, "unknown error with {} entry", M::NAME);
            }
        }
    }

    let raws = items.iter().map(|i| i.raw().clone()).collect();
    ctx.cache().set(&scope, &key, CacheEntry::Items(raws)).await;
    debug!(count = items.len(), "listed");
    Ok(items)
}

/// Gets the `M` instance at `dn`. With `skip_cache` the cache is neither
/// read nor written.
#[instrument(skip_all, fields(model = M::NAME, dn = %dn, skip_cache = skip_cache))]
pub async fn model_get<M: Model>(
    ctx: &Context<M::State>,
    dn: &Dn,
    skip_cache: bool,
) -> Result<M, ModelError> {
    info!("modelGet");
    let scope = get_scope(M::NAME);
    let key = dn.to_string();

    if !skip_cache {
        match ctx.cache().get(&scope, &key).await {
            Some(CacheEntry::Failed(err)) => {
                trace!(%scope, error = %err, "cache hit (error)");
                return Err(err);
            }
            Some(CacheEntry::Item(raw)) => match from_raw_at::<M>(ctx, dn, raw) {
                Ok(item) => {
                    trace!(%scope, "cache hit");
                    return Ok(item);
                }
                Err(e) => {
                    warn!(%scope, error = %e, "error in cached data, dropping");
                    ctx.cache().delete(&scope, &key).await;
                }
            },
            Some(CacheEntry::Items(_)) => {
                warn!(%scope, "unexpected list in get scope, dropping");
                ctx.cache().delete(&scope, &key).await;
            }
            None => trace!(%scope, "cache miss"),
        }
    }

    let not_found =
        || ModelError::ResourceNotFound(format!("{} not found", M::NAME.to_lowercase()));

    let outcome = match ctx.directory().search(dn, &SearchOptions::base()).await {
        Err(DirectoryError::Unavailable(msg)) => {
            warn!(error = %msg, "directory unavailable, not caching");
            return Err(ModelError::ServiceUnavailable(msg));
        }
        Err(DirectoryError::NoSuchObject(_)) => Err(not_found()),
        Err(e) => Err(ModelError::from(e)),
        Ok(entries) => match <[Entry; 1]>::try_from(entries) {
            Ok([entry]) => match from_raw_at::<M>(ctx, &entry.dn, entry.raw) {
                Ok(item) => Ok(item),
                Err(e) => {
                    error!(error = %e, "invalid entry");
                    return Err(ModelError::Internal(format!(
                        "invalid {} entry at {dn}",
                        M::NAME.to_lowercase()
                    )));
                }
            },
            Err(entries) if entries.is_empty() => Err(not_found()),
            Err(entries) => {
                error!(hits = entries.len(), "multiple hits in directory for one dn");
                return Err(ModelError::Internal("conflicting entries".to_string()));
            }
        },
    };

    if !skip_cache {
        let entry = match &outcome {
            Ok(item) => CacheEntry::Item(item.raw().clone()),
            Err(err) => CacheEntry::Failed(err.clone()),
        };
        ctx.cache().set(&scope, &key, entry).await;
    }
    outcome
}

/// Creates a new `M` from submitted `data`.
#[instrument(skip_all, fields(model = M::NAME))]
pub async fn model_create<M: Model>(
    ctx: &Context<M::State>,
    data: Record,
) -> Result<M, ModelError> {
    info!(?data, "modelCreate");

    let item = M::create(ctx, data).await?;
    authorize_write(ctx, &item).await?;

    let dn = item.dn();
    if let Err(e) = ctx.directory().add(dn, item.raw()).await {
        error!(%dn, error = %e, "error saving to directory");
        return Err(e.into());
    }

    trace!(%dn, "created");
    ctx.cache().invalidate_on_write(&invalidation(&item, item.dn())).await;
    Ok(item)
}

/// Creates or replaces the `M` described by `data`, which must already be
/// in raw form.
#[instrument(skip_all, fields(model = M::NAME))]
pub async fn model_put<M: Model>(ctx: &Context<M::State>, data: Record) -> Result<M, ModelError> {
    info!(?data, "modelPut");

    let mut raw = RawRecord::from(&data);
    if !raw.contains("objectclass") {
        raw.set("objectclass", M::OBJECTCLASS);
    }
    let item = M::from_raw(ctx, raw)?;
    authorize_write(ctx, &item).await?;

    let dn = item.dn();
    match ctx.directory().add(dn, item.raw()).await {
        Ok(()) => trace!(%dn, "added"),
        Err(DirectoryError::AlreadyExists(_)) => {
            debug!(%dn, "entry exists, replacing");
            let current = current_entry(ctx, dn).await?;
            if let Err(e) = item.authorize_replace(ctx, &current).await {
                debug!(%dn, error = %e, "authorizeReplace err");
                return Err(e);
            }
            let changes = current.diff(item.raw());
            if !changes.is_empty() {
                if let Err(e) = ctx.directory().modify(dn, &changes).await {
                    error!(%dn, error = %e, "error replacing entry");
                    return Err(e.into());
                }
            }
        }
        Err(e) => {
            error!(%dn, error = %e, "error saving to directory");
            return Err(e.into());
        }
    }

    ctx.cache().invalidate_on_put(&invalidation(&item, item.dn())).await;
    Ok(item)
}

/// The stored raw record at `dn`, read past the cache.
async fn current_entry<S>(ctx: &Context<S>, dn: &Dn) -> Result<RawRecord, ModelError> {
    let entries = ctx.directory().search(dn, &SearchOptions::base()).await?;
    match <[Entry; 1]>::try_from(entries) {
        Ok([entry]) => Ok(entry.raw),
        Err(entries) if entries.is_empty() => {
            Err(ModelError::ResourceNotFound(format!("{dn} not found")))
        }
        Err(_) => Err(ModelError::Internal("conflicting entries".to_string())),
    }
}

/// Applies `changes` to an existing instance.
#[instrument(skip_all, fields(model = M::NAME, dn = %item.dn()))]
pub async fn model_update<M: Model>(
    ctx: &Context<M::State>,
    item: &M,
    changes: &[Change],
) -> Result<(), ModelError> {
    info!(?changes, "modelUpdate");
    authorize_write(ctx, item).await?;

    if let Err(e) = ctx.directory().modify(item.dn(), changes).await {
        error!(error = %e, "error updating model");
        return Err(e.into());
    }

    trace!("updated");
    ctx.cache().invalidate_on_write(&invalidation(item, item.dn())).await;
    Ok(())
}

/// Deletes the `M` at `dn`.
#[instrument(skip_all, fields(model = M::NAME, dn = %dn))]
pub async fn model_delete<M: Model>(ctx: &Context<M::State>, dn: &Dn) -> Result<(), ModelError> {
    info!("modelDelete");

    // Fetched first so invalidation sees the item's prior state.
    let item: M = model_get(ctx, dn, true).await?;

    if let Err(e) = item.authorize_delete(ctx).await {
        debug!(error = %e, "authorizeDelete err");
        return Err(e);
    }

    if let Err(e) = ctx.directory().delete(dn).await {
        error!(error = %e, "error deleting from directory");
        return Err(e.into());
    }

    ctx.cache().invalidate_on_delete(&invalidation(&item, dn)).await;
    Ok(())
}

async fn authorize_write<M: Model>(ctx: &Context<M::State>, item: &M) -> Result<(), ModelError> {
    match item.authorize_write(ctx).await {
        Ok(()) => {
            debug!(dn = %item.dn(), "authorizeWrite: authorized");
            Ok(())
        }
        Err(e) => {
            debug!(dn = %item.dn(), error = %e, "authorizeWrite err");
            Err(e)
        }
    }
}
