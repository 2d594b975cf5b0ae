//! # Workloads
//!
//! Read-only view over the Kubernetes workloads the operator inspects, and
//! the usage detection that runs over them.
//!
//! - `source`: the secret-source shapes found on a workload
//! - `usage`: usage detection and the updated-secret diff

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec, Volume};

pub mod source;
pub mod usage;

pub use source::{SecretSource, Surface};
pub use usage::{compute_updated_secrets, is_using_injected_secrets, is_using_secrets};

/// Read accessors the usage detectors need from a workload
pub trait Workload {
    /// Annotations on the workload object itself
    fn annotations(&self) -> Option<&BTreeMap<String, String>>;

    /// The pod template the workload stamps out
    fn pod_template(&self) -> Option<&PodTemplateSpec>;

    /// Annotations on the pod template metadata
    fn pod_template_annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.pod_template()?.metadata.as_ref()?.annotations.as_ref()
    }

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.pod_template()?.spec.as_ref()
    }

    /// Containers followed by init containers
    fn containers(&self) -> impl Iterator<Item = &Container> {
        self.pod_spec().into_iter().flat_map(|spec| {
            spec.containers
                .iter()
                .chain(spec.init_containers.iter().flatten())
        })
    }

    fn volumes(&self) -> impl Iterator<Item = &Volume> {
        self.pod_spec()
            .into_iter()
            .flat_map(|spec| spec.volumes.iter().flatten())
    }

    /// Every secret source, in the order annotations, containers, volumes
    fn secret_sources(&self) -> impl Iterator<Item = SecretSource<'_>>
    where
        Self: Sized,
    {
        source::annotation_sources(self)
            .chain(source::container_sources(self))
            .chain(source::volume_sources(self))
    }
}

macro_rules! impl_workload {
    ($($kind:ty),+ $(,)?) => {
        $(
            impl Workload for $kind {
                fn annotations(&self) -> Option<&BTreeMap<String, String>> {
                    self.metadata.annotations.as_ref()
                }

                fn pod_template(&self) -> Option<&PodTemplateSpec> {
                    self.spec.as_ref().map(|spec| &spec.template)
                }
            }
        )+
    };
}

impl_workload!(Deployment, StatefulSet, DaemonSet);
