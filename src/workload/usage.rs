//! # Usage Detection
//!
//! Decides whether a workload depends on a set of Kubernetes secrets or
//! 1Password items, and which of those secrets need to be pushed to it.
//!
//! Known secrets and vault items are opaque to this module: they are keyed
//! by name and cloned into the result, never inspected.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::Workload;
use crate::constants::CONTAINER_INJECT_ANNOTATION;
use crate::onepassword::reference::parse_reference;

/// True if any annotation, container or volume of `workload` reads a secret in `known_secrets`
pub fn is_using_secrets<W: Workload, S>(workload: &W, known_secrets: &HashMap<String, S>) -> bool {
    workload.secret_sources().any(|source| {
        source
            .referenced_secret_name()
            .is_some_and(|name| known_secrets.contains_key(name))
    })
}

/// The subset of `known_secrets` that `workload` reads, keyed by secret name
///
/// A secret referenced from several places appears once. An empty map means
/// there is nothing to propagate.
pub fn compute_updated_secrets<W: Workload, S: Clone>(
    workload: &W,
    known_secrets: &HashMap<String, S>,
) -> HashMap<String, S> {
    let mut updated = HashMap::new();
    for source in workload.secret_sources() {
        let Some((name, secret)) = source
            .referenced_secret_name()
            .and_then(|name| known_secrets.get_key_value(name))
        else {
            continue;
        };
        if !updated.contains_key(name) {
            debug!(secret = %name, surface = ?source.surface(), "Workload uses updated secret");
            updated.insert(name.clone(), secret.clone());
        }
    }
    updated
}

/// True if an injection-enabled container of `workload` references an item in `vault_items`
///
/// Injection is opt-in: without the `operator.1password.io/inject` annotation
/// on the pod template this is always `false`. Containers missing from the
/// annotation's comma-separated list are ignored even when their env values
/// reference a known item.
///
/// An env value matches when it is itself a key of `vault_items`, or when it
/// is an `op://` reference whose `vaults/{vault}/items/{item}` path is a key.
pub fn is_using_injected_secrets<W: Workload, I>(
    workload: &W,
    vault_items: &HashMap<String, I>,
) -> bool {
    let Some(allowlist) = workload
        .pod_template_annotations()
        .and_then(|annotations| annotations.get(CONTAINER_INJECT_ANNOTATION))
    else {
        return false;
    };

    let injected: HashSet<&str> = parse_container_allowlist(allowlist).collect();

    workload
        .containers()
        .filter(|container| injected.contains(container.name.as_str()))
        .flat_map(|container| container.env.iter().flatten())
        .filter_map(|var| var.value.as_deref())
        .any(|value| references_vault_item(value, vault_items))
}

fn parse_container_allowlist(allowlist: &str) -> impl Iterator<Item = &str> {
    allowlist
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

fn references_vault_item<I>(value: &str, vault_items: &HashMap<String, I>) -> bool {
    if vault_items.contains_key(value) {
        return true;
    }
    parse_reference(value)
        .is_ok_and(|reference| vault_items.contains_key(&reference.item_path().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_container_allowlist() {
        let names: Vec<&str> = parse_container_allowlist("app, sidecar,,init ").collect();
        assert_eq!(names, vec!["app", "sidecar", "init"]);
        assert_eq!(parse_container_allowlist("").count(), 0);
    }

    #[test]
    fn test_references_vault_item_by_value() {
        let items = HashMap::from([("op://vault/item/password".to_string(), ())]);
        assert!(references_vault_item("op://vault/item/password", &items));
        assert!(!references_vault_item("op://vault/other/password", &items));
    }

    #[test]
    fn test_references_vault_item_by_item_path() {
        let items = HashMap::from([("vaults/vault/items/item".to_string(), ())]);
        assert!(references_vault_item("op://vault/item/password", &items));
        assert!(references_vault_item("op://vault/item/username", &items));
        assert!(!references_vault_item("plain-value", &items));
        assert!(!references_vault_item("op://vault//password", &items));
    }
}
