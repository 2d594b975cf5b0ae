//! Common test utilities
//!
//! In-memory 1Password backend and a recording resolution observer, shared
//! by the resolver and item retrieval tests.

#![allow(dead_code, reason = "Not every test binary uses every helper")]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use onepassword_operator::onepassword::{
    AmbiguousTitle, ConnectError, Item, ResolutionObserver, VaultItemCandidate, VaultLookup,
    VaultRef,
};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn candidate(id: &str, title: &str, created_secs: i64) -> VaultItemCandidate {
    VaultItemCandidate {
        id: id.to_string(),
        title: title.to_string(),
        created_at: at(created_secs),
    }
}

pub fn item(id: &str, vault_id: &str, title: &str) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        vault: VaultRef {
            id: vault_id.to_string(),
        },
        category: None,
        version: None,
        tags: Vec::new(),
        fields: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

/// In-memory `VaultLookup` that counts every call
#[derive(Debug, Default)]
pub struct InMemoryLookup {
    pub vaults: Vec<VaultItemCandidate>,
    /// Item candidates keyed by vault id
    pub items: HashMap<String, Vec<VaultItemCandidate>>,
    /// Full items keyed by (vault id, item id)
    pub full_items: HashMap<(String, String), Item>,
    pub fail_with_unauthorized: bool,
    pub vault_lookups: AtomicUsize,
    pub item_lookups: AtomicUsize,
    pub fetches: AtomicUsize,
}

impl InMemoryLookup {
    pub fn lookups(&self) -> usize {
        self.vault_lookups.load(Ordering::SeqCst) + self.item_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VaultLookup for InMemoryLookup {
    async fn vaults_by_title(&self, title: &str) -> Result<Vec<VaultItemCandidate>, ConnectError> {
        self.vault_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_with_unauthorized {
            return Err(ConnectError::Unauthorized);
        }
        Ok(self
            .vaults
            .iter()
            .filter(|v| v.title == title)
            .cloned()
            .collect())
    }

    async fn items_by_title(
        &self,
        title: &str,
        vault_id: &str,
    ) -> Result<Vec<VaultItemCandidate>, ConnectError> {
        self.item_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_with_unauthorized {
            return Err(ConnectError::Unauthorized);
        }
        Ok(self
            .items
            .get(vault_id)
            .into_iter()
            .flatten()
            .filter(|i| i.title == title)
            .cloned()
            .collect())
    }

    async fn get_item(&self, item_id: &str, vault_id: &str) -> Result<Item, ConnectError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.full_items
            .get(&(vault_id.to_string(), item_id.to_string()))
            .cloned()
            .ok_or_else(|| ConnectError::NotFound(format!("item {item_id} in vault {vault_id}")))
    }
}

/// Observer that records every disambiguation event
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AmbiguousTitle>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<AmbiguousTitle> {
        self.events.lock().unwrap().clone()
    }
}

impl ResolutionObserver for RecordingObserver {
    fn ambiguous_title(&self, event: &AmbiguousTitle) {
        self.events.lock().unwrap().push(event.clone());
    }
}
