//! # Vault Lookup
//!
//! The capability the resolver needs from a 1Password backend, plus the
//! item shapes that backend returns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::connect::ConnectError;

/// A vault or item returned by a title lookup
///
/// Several candidates may share the same title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultItemCandidate {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Reference from an item back to the vault that holds it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VaultRef {
    pub id: String,
}

/// A single field on a 1Password item
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
}

/// A 1Password item with field values
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    pub vault: VaultRef,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Find a field by label, falling back to its id
    pub fn field(&self, label: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.label.as_deref() == Some(label))
            .or_else(|| self.fields.iter().find(|f| f.id == label))
    }

    /// Value of the field with the given label, if present
    pub fn field_value(&self, label: &str) -> Option<&str> {
        self.field(label).and_then(|f| f.value.as_deref())
    }

    /// Labels of every field, for diagnostics that must not print values
    pub fn field_labels(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|f| f.label.as_deref().unwrap_or(f.id.as_str()))
            .collect()
    }
}

/// Title lookups and item fetches against a 1Password backend
///
/// Implementations must be safe for concurrent use; the resolver holds no
/// state of its own.
#[async_trait]
pub trait VaultLookup: Send + Sync {
    /// All vaults whose title equals `title`
    async fn vaults_by_title(&self, title: &str) -> Result<Vec<VaultItemCandidate>, ConnectError>;

    /// All items in `vault_id` whose title equals `title`
    async fn items_by_title(
        &self,
        title: &str,
        vault_id: &str,
    ) -> Result<Vec<VaultItemCandidate>, ConnectError>;

    /// Fetch a single item with all field values
    async fn get_item(&self, item_id: &str, vault_id: &str) -> Result<Item, ConnectError>;
}
