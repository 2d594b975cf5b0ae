//! # Connect Bootstrap
//!
//! Creates the 1Password Connect `Service` and `Deployment` from static
//! manifests when they are not already present in the cluster.
//!
//! Existing objects are left untouched; this is a create-if-missing step,
//! not a reconciliation of their contents.

use std::fmt::Debug;
use std::path::Path;

use anyhow::{Context, Result};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, PostParams};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::OperatorConfig;
use crate::constants::{CONNECT_RESOURCE_NAME, FIELD_MANAGER};

/// Outcome of ensuring a single Connect object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    AlreadyExists,
    Created,
}

/// What `setup_connect` did for each Connect object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectSetup {
    pub service: SetupOutcome,
    pub deployment: SetupOutcome,
}

/// Ensure the Connect Service and Deployment exist, Service first
///
/// A failure on the Service stops the bootstrap before the Deployment is
/// looked at.
pub async fn setup_connect(client: &Client, config: &OperatorConfig) -> Result<ConnectSetup> {
    let namespace = config.connect_namespace.as_str();

    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let service =
        ensure_from_manifest(&services, "Service", namespace, &config.connect_service_manifest)
            .await?;

    let deployments: Api<Deployment> = Api::namespaced(client.clone(), namespace);
    let deployment = ensure_from_manifest(
        &deployments,
        "Deployment",
        namespace,
        &config.connect_deployment_manifest,
    )
    .await?;

    Ok(ConnectSetup {
        service,
        deployment,
    })
}

async fn ensure_from_manifest<K>(
    api: &Api<K>,
    kind: &str,
    namespace: &str,
    manifest_path: &Path,
) -> Result<SetupOutcome>
where
    K: Resource + Clone + DeserializeOwned + Serialize + Debug,
{
    match api.get(CONNECT_RESOURCE_NAME).await {
        Ok(_) => {
            debug!("Connect {} {}/{} already exists", kind, namespace, CONNECT_RESOURCE_NAME);
            Ok(SetupOutcome::AlreadyExists)
        }
        Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
            info!("No existing Connect {} found. Creating {}", kind, kind);
            let mut object: K = load_manifest(manifest_path).await?;
            let meta = object.meta_mut();
            meta.name = Some(CONNECT_RESOURCE_NAME.to_string());
            meta.namespace = Some(namespace.to_string());

            let params = PostParams {
                field_manager: Some(FIELD_MANAGER.to_string()),
                ..Default::default()
            };
            api.create(&params, &object)
                .await
                .with_context(|| format!("Failed to create Connect {kind} in {namespace}"))?;
            Ok(SetupOutcome::Created)
        }
        Err(e) => Err(e).with_context(|| {
            format!("Failed to get Connect {kind} {namespace}/{CONNECT_RESOURCE_NAME}")
        }),
    }
}

/// Load a Kubernetes object from a YAML or JSON manifest
pub async fn load_manifest<K: DeserializeOwned>(path: &Path) -> Result<K> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to decode manifest {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_manifest_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: onepassword-connect\nspec:\n  ports:\n    - port: 8080\n      name: connect-api"
        )
        .unwrap();

        let service: Service = load_manifest(file.path()).await.unwrap();
        assert_eq!(service.metadata.name.as_deref(), Some("onepassword-connect"));
        let ports = service.spec.unwrap().ports.unwrap();
        assert_eq!(ports[0].port, 8080);
    }

    #[tokio::test]
    async fn test_load_manifest_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"apiVersion":"apps/v1","kind":"Deployment","metadata":{{"name":"onepassword-connect"}},"spec":{{"selector":{{}},"template":{{}}}}}}"#
        )
        .unwrap();

        let deployment: Deployment = load_manifest(file.path()).await.unwrap();
        assert_eq!(
            deployment.metadata.name.as_deref(),
            Some("onepassword-connect")
        );
    }

    #[tokio::test]
    async fn test_load_manifest_missing_file() {
        let err = load_manifest::<Service>(Path::new("/nonexistent/service.yaml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest"));
    }

    #[tokio::test]
    async fn test_load_manifest_invalid_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "metadata: [this is not an object").unwrap();

        let err = load_manifest::<Service>(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to decode manifest"));
    }
}
