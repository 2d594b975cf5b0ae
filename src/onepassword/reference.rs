//! # Reference Parsing
//!
//! Parses the two textual forms that point at a 1Password item:
//!
//! - secret references: `op://<vault>/<item>/<field>`
//! - item paths: `vaults/<vault_id>/items/<item_id>`
//!
//! Vault and item segments of a reference may be canonical IDs or titles.
//! Parsing never decides which; that is left to the
//! [`IdentifierResolver`](super::resolver::IdentifierResolver).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::SECRET_REFERENCE_PREFIX;

/// Errors raised while parsing references and item paths
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("Invalid secret reference: {reference}. {reason}")]
    InvalidReferenceFormat { reference: String, reason: String },

    #[error("{0:?} is not an acceptable path for a 1Password item. Must be of the format: `vaults/{{vault_id}}/items/{{item_id}}`")]
    InvalidPathFormat(String),
}

/// A parsed `op://<vault>/<item>/<field>` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretReference {
    vault: String,
    item: String,
    field: String,
}

impl SecretReference {
    /// Vault segment (canonical ID or title)
    pub fn vault(&self) -> &str {
        &self.vault
    }

    /// Item segment (canonical ID or title)
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Field segment; may be empty
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The `vaults/{vault}/items/{item}` path addressing the same item
    pub fn item_path(&self) -> ItemPath {
        ItemPath {
            vault_id: self.vault.clone(),
            item_id: self.item.clone(),
        }
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{SECRET_REFERENCE_PREFIX}{}/{}/{}",
            self.vault, self.item, self.field
        )
    }
}

impl FromStr for SecretReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_reference(s)
    }
}

/// A parsed `vaults/<vault_id>/items/<item_id>` path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemPath {
    vault_id: String,
    item_id: String,
}

impl ItemPath {
    pub fn vault_id(&self) -> &str {
        &self.vault_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vaults/{}/items/{}", self.vault_id, self.item_id)
    }
}

impl FromStr for ItemPath {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

/// Parse an `op://<vault>/<item>/<field>` secret reference
///
/// The field segment is not validated; callers that need a field must
/// check [`SecretReference::field`] themselves.
pub fn parse_reference(reference: &str) -> Result<SecretReference, ReferenceError> {
    let invalid = |reason: &str| ReferenceError::InvalidReferenceFormat {
        reference: reference.to_string(),
        reason: reason.to_string(),
    };

    let path = reference
        .strip_prefix(SECRET_REFERENCE_PREFIX)
        .ok_or_else(|| invalid("Secret references should start with op://"))?;

    let segments: Vec<&str> = path.split('/').collect();
    let [vault, item, field] = segments.as_slice() else {
        return Err(invalid(
            "Secret references should match op://<vault>/<item>/<field>",
        ));
    };

    if vault.is_empty() {
        return Err(invalid("Vault can't be empty."));
    }
    if item.is_empty() {
        return Err(invalid("Item can't be empty."));
    }

    Ok(SecretReference {
        vault: (*vault).to_string(),
        item: (*item).to_string(),
        field: (*field).to_string(),
    })
}

/// Parse a `vaults/<vault_id>/items/<item_id>` item path
pub fn parse_path(path: &str) -> Result<ItemPath, ReferenceError> {
    let segments: Vec<&str> = path.split('/').collect();
    match segments.as_slice() {
        ["vaults", vault_id, "items", item_id] if !vault_id.is_empty() && !item_id.is_empty() => {
            Ok(ItemPath {
                vault_id: (*vault_id).to_string(),
                item_id: (*item_id).to_string(),
            })
        }
        _ => Err(ReferenceError::InvalidPathFormat(path.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid_reference(input: &str) {
        match parse_reference(input) {
            Err(ReferenceError::InvalidReferenceFormat { reference, .. }) => {
                assert_eq!(reference, input);
            }
            other => panic!("expected InvalidReferenceFormat for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_reference_valid() {
        let parsed = parse_reference("op://v/i/f").unwrap();
        assert_eq!(parsed.vault(), "v");
        assert_eq!(parsed.item(), "i");
        assert_eq!(parsed.field(), "f");
    }

    #[test]
    fn test_parse_reference_with_titles() {
        let parsed = parse_reference("op://Production/Database Login/password").unwrap();
        assert_eq!(parsed.vault(), "Production");
        assert_eq!(parsed.item(), "Database Login");
        assert_eq!(parsed.field(), "password");
    }

    #[test]
    fn test_parse_reference_empty_field_is_accepted() {
        let parsed = parse_reference("op://vault/item/").unwrap();
        assert_eq!(parsed.field(), "");
    }

    #[test]
    fn test_parse_reference_missing_prefix() {
        assert_invalid_reference("vault/item/field");
        assert_invalid_reference("op:/vault/item/field");
        assert_invalid_reference("OP://vault/item/field");
        assert_invalid_reference("");
    }

    #[test]
    fn test_parse_reference_wrong_segment_count() {
        assert_invalid_reference("op://vault/item");
        assert_invalid_reference("op://vault");
        assert_invalid_reference("op://");
        assert_invalid_reference("op://vault/item/field/extra");
        assert_invalid_reference("op://vault/item/section/field");
    }

    #[test]
    fn test_parse_reference_empty_vault_or_item() {
        assert_invalid_reference("op:///item/field");
        assert_invalid_reference("op://vault//field");
        assert_invalid_reference("op:////");
    }

    #[test]
    fn test_parse_reference_error_message_names_reason() {
        let err = parse_reference("op:///item/field").unwrap_err();
        assert!(err.to_string().contains("Vault can't be empty"));

        let err = parse_reference("op://vault//field").unwrap_err();
        assert!(err.to_string().contains("Item can't be empty"));
    }

    #[test]
    fn test_reference_display_round_trips() {
        let parsed: SecretReference = "op://vault/item/field".parse().unwrap();
        assert_eq!(parsed.to_string(), "op://vault/item/field");
        assert_eq!(parsed.item_path().to_string(), "vaults/vault/items/item");
    }

    #[test]
    fn test_parse_path_valid() {
        let path = parse_path("vaults/abc/items/def").unwrap();
        assert_eq!(path.vault_id(), "abc");
        assert_eq!(path.item_id(), "def");
    }

    #[test]
    fn test_parse_path_invalid_literals() {
        for input in [
            "vault/abc/items/def",
            "vaults/abc/item/def",
            "items/abc/vaults/def",
            "VAULTS/abc/items/def",
        ] {
            assert_eq!(
                parse_path(input),
                Err(ReferenceError::InvalidPathFormat(input.to_string())),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_path_invalid_segment_count() {
        for input in [
            "",
            "vaults/abc",
            "vaults/abc/items",
            "vaults/abc/items/def/extra",
            "/vaults/abc/items/def",
        ] {
            assert!(
                matches!(parse_path(input), Err(ReferenceError::InvalidPathFormat(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_path_empty_ids() {
        assert!(parse_path("vaults//items/def").is_err());
        assert!(parse_path("vaults/abc/items/").is_err());
    }
}
