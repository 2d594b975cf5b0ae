//! # 1Password Operator CLI
//!
//! Operational entry points around the secret-resolution core.
//!
//! ## Usage
//!
//! ```bash
//! # Create the Connect Service and Deployment if they are missing
//! onepassword-operator setup-connect
//!
//! # Resolve a reference or item path to canonical IDs (field values are never printed)
//! onepassword-operator resolve op://Production/Database/password
//! onepassword-operator resolve vaults/Production/items/Database
//!
//! # Report which Deployments in a namespace read which Secrets
//! onepassword-operator scan --namespace default
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, ListParams};
use kube::Client;
use tracing::{info, warn};

use onepassword_operator::config::OperatorConfig;
use onepassword_operator::connect_setup::setup_connect;
use onepassword_operator::constants::{ITEM_PATH_ANNOTATION, SECRET_REFERENCE_PREFIX};
use onepassword_operator::observability::{init_logging, metrics};
use onepassword_operator::onepassword::{
    get_item_by_path, get_item_by_reference, ConnectClient, Item, TracingObserver,
};
use onepassword_operator::workload::compute_updated_secrets;

/// 1Password Operator CLI
#[derive(Parser)]
#[command(name = "onepassword-operator")]
#[command(about = "Resolve 1Password references and inspect secret usage in Kubernetes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print Prometheus metrics to stdout before exiting
    #[arg(long, global = true)]
    print_metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the Connect Service and Deployment from manifests if missing
    SetupConnect,
    /// Resolve an op:// reference or vaults/{vault}/items/{item} path
    Resolve {
        /// Reference or item path; vault and item may be titles
        #[arg(value_name = "REFERENCE")]
        reference: String,
    },
    /// List Deployments that read Secrets in a namespace
    Scan {
        /// Kubernetes namespace (defaults to current context namespace)
        #[arg(short, long)]
        namespace: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any other operations
    // Required for rustls 0.23+ when no default provider is set via features
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_existing| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let config = OperatorConfig::from_env();
    init_logging(&config)?;
    if config.enable_metrics {
        metrics::register_metrics()?;
    }

    let cli = Cli::parse();
    run(cli.command, &config).await?;

    if cli.print_metrics {
        print!("{}", metrics::gather_metrics()?);
    }

    Ok(())
}

/// Dispatch a subcommand; only `setup-connect` and `scan` talk to Kubernetes
async fn run(command: Commands, config: &OperatorConfig) -> Result<()> {
    match command {
        Commands::SetupConnect => {
            if !config.manage_connect {
                info!("MANAGE_CONNECT is disabled; bootstrapping Connect on explicit request");
            }
            let client = kube_client().await?;
            let outcome = setup_connect(&client, config).await?;
            info!(
                service = ?outcome.service,
                deployment = ?outcome.deployment,
                "Connect bootstrap complete in namespace {}",
                config.connect_namespace
            );
        }
        Commands::Resolve { reference } => resolve_command(config, &reference).await?,
        Commands::Scan { namespace } => {
            let client = kube_client().await?;
            scan_command(client, namespace).await?;
        }
    }

    Ok(())
}

async fn kube_client() -> Result<Client> {
    Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")
}

async fn resolve_command(config: &OperatorConfig, reference: &str) -> Result<()> {
    let Some(token) = config.connect_token.as_deref() else {
        bail!("OP_CONNECT_TOKEN must be set to resolve references");
    };
    let client =
        ConnectClient::new(&config.connect_host, token, config.connect_request_timeout())?;
    let observer = Arc::new(TracingObserver);

    let (item, field) = if reference.starts_with(SECRET_REFERENCE_PREFIX) {
        let (item, field) = get_item_by_reference(&client, observer, reference).await?;
        (item, Some(field))
    } else {
        (get_item_by_path(&client, observer, reference).await?, None)
    };

    print_item(&item, field.as_deref());
    Ok(())
}

fn print_item(item: &Item, field: Option<&str>) {
    println!("vault:  {}", item.vault.id);
    println!("item:   {} ({})", item.id, item.title);
    println!("fields: {}", item.field_labels().join(", "));
    match field {
        Some(label) if item.field(label).is_some() => println!("field {label:?} present"),
        Some(label) => warn!("Field {:?} not found on item {}", label, item.id),
        None => {}
    }
}

async fn scan_command(client: Client, namespace: Option<String>) -> Result<()> {
    let namespace = namespace.unwrap_or_else(|| client.default_namespace().to_string());

    let secrets: Api<Secret> = Api::namespaced(client.clone(), &namespace);
    let known: HashMap<String, Secret> = secrets
        .list(&ListParams::default())
        .await
        .with_context(|| format!("Failed to list Secrets in {namespace}"))?
        .items
        .into_iter()
        .filter_map(|secret| Some((secret.metadata.name.clone()?, secret)))
        .collect();

    let deployments: Api<Deployment> = Api::namespaced(client, &namespace);
    let deployment_list = deployments
        .list(&ListParams::default())
        .await
        .with_context(|| format!("Failed to list Deployments in {namespace}"))?;

    for deployment in &deployment_list.items {
        let name = deployment.metadata.name.as_deref().unwrap_or("unknown");
        if let Some(path) = deployment
            .metadata
            .annotations
            .as_ref()
            .and_then(|annotations| annotations.get(ITEM_PATH_ANNOTATION))
        {
            println!("{namespace}/{name}: item path {path}");
        }

        let used = compute_updated_secrets(deployment, &known);
        if used.is_empty() {
            continue;
        }
        let mut names: Vec<&str> = used.keys().map(String::as_str).collect();
        names.sort_unstable();
        println!("{namespace}/{name}: {}", names.join(", "));
    }

    Ok(())
}
