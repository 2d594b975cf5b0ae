//! # Constants
//!
//! Shared constants used throughout the operator.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Workload annotation naming the Kubernetes secret generated from a 1Password item
pub const ITEM_NAME_ANNOTATION: &str = "operator.1password.io/item-name";

/// Workload annotation holding the `vaults/{vault}/items/{item}` path of the item
pub const ITEM_PATH_ANNOTATION: &str = "operator.1password.io/item-path";

/// Pod template annotation listing containers eligible for secret injection
pub const CONTAINER_INJECT_ANNOTATION: &str = "operator.1password.io/inject";

/// Scheme prefix of a secret reference (`op://<vault>/<item>/<field>`)
pub const SECRET_REFERENCE_PREFIX: &str = "op://";

/// Length of a 1Password canonical identifier
pub const CANONICAL_ID_LENGTH: usize = 26;

/// Name shared by the Connect Deployment and Service
pub const CONNECT_RESOURCE_NAME: &str = "onepassword-connect";

/// Default namespace the Connect server is bootstrapped into
pub const DEFAULT_CONNECT_NAMESPACE: &str = "default";

/// Default location of the Connect Deployment manifest
pub const DEFAULT_CONNECT_DEPLOYMENT_MANIFEST: &str = "deploy/connect/deployment.yaml";

/// Default location of the Connect Service manifest
pub const DEFAULT_CONNECT_SERVICE_MANIFEST: &str = "deploy/connect/service.yaml";

/// Default Connect server URL (in-cluster service)
pub const DEFAULT_CONNECT_HOST: &str = "http://onepassword-connect:8080";

/// Default timeout for a single Connect API request (seconds)
pub const DEFAULT_CONNECT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Field manager used when the operator creates Kubernetes objects
pub const FIELD_MANAGER: &str = "onepassword-operator";
