//! # Item Retrieval
//!
//! Parse, resolve and fetch in one call. These are the entry points the
//! reconciler uses when an annotation or env value has to become a
//! concrete 1Password item.
//!
//! Resolution and the final fetch go through the same [`VaultLookup`].

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use super::lookup::{Item, VaultLookup};
use super::reference::{parse_path, parse_reference};
use super::resolver::{IdentifierResolver, ResolutionObserver, ResolvedIdentity};

/// Fetch the item addressed by a `vaults/{vault}/items/{item}` path
///
/// Both segments go through the resolver, so titles are accepted as well
/// as canonical IDs.
pub async fn get_item_by_path(
    lookup: &dyn VaultLookup,
    observer: Arc<dyn ResolutionObserver>,
    path: &str,
) -> Result<Item> {
    let item_path = parse_path(path)?;
    let identity = IdentifierResolver::with_observer(lookup, observer)
        .resolve_path(&item_path)
        .await?;

    let item = fetch_item(lookup, &identity).await?;
    info!(path, item_id = %item.id, "Retrieved 1Password item");
    Ok(item)
}

/// Fetch the item addressed by an `op://<vault>/<item>/<field>` reference
///
/// Returns the item together with the field label the reference asked for.
pub async fn get_item_by_reference(
    lookup: &dyn VaultLookup,
    observer: Arc<dyn ResolutionObserver>,
    reference: &str,
) -> Result<(Item, String)> {
    let parsed = parse_reference(reference)?;
    let identity = IdentifierResolver::with_observer(lookup, observer)
        .resolve_reference(&parsed)
        .await?;

    let item = fetch_item(lookup, &identity).await?;
    info!(reference, item_id = %item.id, "Retrieved 1Password item");
    Ok((item, parsed.field().to_string()))
}

async fn fetch_item(lookup: &dyn VaultLookup, identity: &ResolvedIdentity) -> Result<Item> {
    lookup
        .get_item(identity.item_id(), identity.vault_id())
        .await
        .with_context(|| format!("Failed to fetch 1Password item {identity}"))
}
