//! # 1Password
//!
//! Everything that talks about vaults and items:
//!
//! - `reference`: parsing `op://` references and `vaults/.../items/...` paths
//! - `resolver`: turning titles into canonical IDs (oldest wins)
//! - `lookup`: the backend capability the resolver depends on
//! - `connect`: the Connect REST implementation of that capability
//! - `items`: parse + resolve + fetch helpers

pub mod connect;
pub mod items;
pub mod lookup;
pub mod reference;
pub mod resolver;

pub use connect::{ConnectClient, ConnectError};
pub use items::{get_item_by_path, get_item_by_reference};
pub use lookup::{Field, Item, VaultItemCandidate, VaultLookup, VaultRef};
pub use reference::{parse_path, parse_reference, ItemPath, ReferenceError, SecretReference};
pub use resolver::{
    is_canonical_id, pick_oldest, AmbiguousTitle, IdentifierKind, IdentifierResolver,
    ResolutionObserver, ResolveError, ResolvedIdentity, TracingObserver,
};
