//! # Identifier Resolver
//!
//! Turns the vault and item segments of a reference into canonical
//! 1Password IDs.
//!
//! ## Resolution Flow
//!
//! 1. If the identifier already has the canonical-ID shape, return it unchanged
//! 2. Otherwise look it up by title (items are looked up within their vault)
//! 3. No candidates: `VaultNotFound` / `ItemNotFound`
//! 4. Several candidates: the oldest wins, and the choice is reported to the
//!    resolver's [`ResolutionObserver`]

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use super::connect::ConnectError;
use super::lookup::{VaultItemCandidate, VaultLookup};
use super::reference::{ItemPath, SecretReference};
use crate::constants::CANONICAL_ID_LENGTH;
use crate::observability::metrics;

static CANONICAL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^[a-z0-9]{{{CANONICAL_ID_LENGTH}}}$"))
        .expect("canonical id pattern is valid")
});

/// Errors raised while resolving identifiers
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No vaults found with identifier {0:?}")]
    VaultNotFound(String),

    #[error("No items found with identifier {title:?} in vault {vault_id:?}")]
    ItemNotFound { title: String, vault_id: String },

    #[error(transparent)]
    Lookup(#[from] ConnectError),
}

/// Canonical IDs of an item and the vault holding it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedIdentity {
    vault_id: String,
    item_id: String,
}

impl ResolvedIdentity {
    pub fn vault_id(&self) -> &str {
        &self.vault_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

impl fmt::Display for ResolvedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vaults/{}/items/{}", self.vault_id, self.item_id)
    }
}

/// What kind of identifier a lookup was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Vault,
    Item,
}

impl IdentifierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IdentifierKind::Vault => "vault",
            IdentifierKind::Item => "item",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted when a title matched more than one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousTitle {
    pub kind: IdentifierKind,
    pub title: String,
    pub count: usize,
    pub chosen_id: String,
}

/// Receives disambiguation decisions made during resolution
pub trait ResolutionObserver: Send + Sync {
    fn ambiguous_title(&self, event: &AmbiguousTitle);
}

/// Default observer: logs through `tracing` and counts in Prometheus
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ResolutionObserver for TracingObserver {
    fn ambiguous_title(&self, event: &AmbiguousTitle) {
        metrics::increment_ambiguous_titles(event.kind.as_str());
        info!(
            kind = %event.kind,
            title = %event.title,
            count = event.count,
            chosen_id = %event.chosen_id,
            "{} 1Password {}s found with the title {:?}. Will use {} {:?} as it is the oldest.",
            event.count,
            event.kind,
            event.title,
            event.kind,
            event.chosen_id
        );
    }
}

/// True if `identifier` has the shape of a 1Password canonical ID
///
/// A format check only; says nothing about whether the ID exists.
pub fn is_canonical_id(identifier: &str) -> bool {
    CANONICAL_ID.is_match(identifier)
}

/// Pick the candidate with the earliest `created_at`
///
/// Returns the choice and whether more than one candidate was offered.
/// Equal timestamps keep the first candidate encountered.
pub fn pick_oldest(candidates: &[VaultItemCandidate]) -> Option<(&VaultItemCandidate, bool)> {
    let (first, rest) = candidates.split_first()?;
    let oldest = rest.iter().fold(first, |oldest, candidate| {
        if candidate.created_at < oldest.created_at {
            candidate
        } else {
            oldest
        }
    });
    Some((oldest, !rest.is_empty()))
}

/// Resolves vault and item identifiers to canonical IDs
pub struct IdentifierResolver<'a> {
    lookup: &'a dyn VaultLookup,
    observer: Arc<dyn ResolutionObserver>,
}

impl fmt::Debug for IdentifierResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierResolver").finish_non_exhaustive()
    }
}

impl<'a> IdentifierResolver<'a> {
    /// Create a resolver that reports through [`TracingObserver`]
    pub fn new(lookup: &'a dyn VaultLookup) -> Self {
        Self::with_observer(lookup, Arc::new(TracingObserver))
    }

    /// Create a resolver with a custom observer
    pub fn with_observer(
        lookup: &'a dyn VaultLookup,
        observer: Arc<dyn ResolutionObserver>,
    ) -> Self {
        Self { lookup, observer }
    }

    /// Resolve a vault ID or title to a canonical vault ID
    pub async fn resolve_vault_id(&self, raw_vault: &str) -> Result<String, ResolveError> {
        if is_canonical_id(raw_vault) {
            return Ok(raw_vault.to_string());
        }

        metrics::increment_title_lookups(IdentifierKind::Vault.as_str());
        let vaults = self.lookup.vaults_by_title(raw_vault).await?;
        self.choose(IdentifierKind::Vault, raw_vault, &vaults)
            .ok_or_else(|| ResolveError::VaultNotFound(raw_vault.to_string()))
    }

    /// Resolve an item ID or title within `vault_id` to a canonical item ID
    pub async fn resolve_item_id(
        &self,
        raw_item: &str,
        vault_id: &str,
    ) -> Result<String, ResolveError> {
        if is_canonical_id(raw_item) {
            return Ok(raw_item.to_string());
        }

        metrics::increment_title_lookups(IdentifierKind::Item.as_str());
        let items = self.lookup.items_by_title(raw_item, vault_id).await?;
        self.choose(IdentifierKind::Item, raw_item, &items)
            .ok_or_else(|| ResolveError::ItemNotFound {
                title: raw_item.to_string(),
                vault_id: vault_id.to_string(),
            })
    }

    /// Resolve both segments of an `op://` reference
    pub async fn resolve_reference(
        &self,
        reference: &SecretReference,
    ) -> Result<ResolvedIdentity, ResolveError> {
        self.resolve_pair(reference.vault(), reference.item()).await
    }

    /// Resolve both segments of a `vaults/{vault}/items/{item}` path
    pub async fn resolve_path(&self, path: &ItemPath) -> Result<ResolvedIdentity, ResolveError> {
        self.resolve_pair(path.vault_id(), path.item_id()).await
    }

    async fn resolve_pair(
        &self,
        raw_vault: &str,
        raw_item: &str,
    ) -> Result<ResolvedIdentity, ResolveError> {
        let vault_id = self.resolve_vault_id(raw_vault).await?;
        let item_id = self.resolve_item_id(raw_item, &vault_id).await?;
        debug!(
            vault = raw_vault,
            item = raw_item,
            %vault_id,
            %item_id,
            "Resolved 1Password identifiers"
        );
        Ok(ResolvedIdentity { vault_id, item_id })
    }

    fn choose(
        &self,
        kind: IdentifierKind,
        title: &str,
        candidates: &[VaultItemCandidate],
    ) -> Option<String> {
        let (chosen, ambiguous) = pick_oldest(candidates)?;
        if ambiguous {
            self.observer.ambiguous_title(&AmbiguousTitle {
                kind,
                title: title.to_string(),
                count: candidates.len(),
                chosen_id: chosen.id.clone(),
            });
        }
        Some(chosen.id.clone())
    }
}
