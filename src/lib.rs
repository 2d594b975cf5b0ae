//! 1Password Operator Library
//!
//! Secret-resolution core of a Kubernetes operator that keeps workloads in
//! sync with items stored in 1Password.
//!
//! - [`onepassword`]: parse `op://` references and item paths, resolve titles
//!   to canonical IDs, and fetch items through 1Password Connect
//! - [`workload`]: detect which workloads use which secrets and compute the
//!   secrets that must be pushed to them
//! - [`connect_setup`]: bootstrap the Connect server into the cluster
//!
//! Tests are included in the module files and under `tests/`.

pub mod config;
pub mod connect_setup;
pub mod constants;
pub mod observability;
pub mod onepassword;
pub mod workload;
