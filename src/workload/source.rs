//! # Secret Sources
//!
//! The closed set of places a workload can pull a Kubernetes secret from.
//! Each variant answers the same question, [`SecretSource::referenced_secret_name`],
//! so the usage detectors fold over sources without caring where they came from.

use k8s_openapi::api::core::v1::{
    SecretEnvSource, SecretKeySelector, SecretProjection, SecretVolumeSource,
};

use super::Workload;
use crate::constants::ITEM_NAME_ANNOTATION;

/// Which part of the workload a source was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Annotations,
    Containers,
    Volumes,
}

/// A single reference from a workload to a Kubernetes secret
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SecretSource<'a> {
    /// `operator.1password.io/item-name` annotation on the workload
    ItemNameAnnotation(&'a str),
    /// `env[].valueFrom.secretKeyRef`
    EnvSecretKey(&'a SecretKeySelector),
    /// `envFrom[].secretRef`
    EnvFromSecret(&'a SecretEnvSource),
    /// `volumes[].secret`
    Volume(&'a SecretVolumeSource),
    /// `volumes[].projected.sources[].secret`
    ProjectedVolume(&'a SecretProjection),
}

impl<'a> SecretSource<'a> {
    /// Name of the Kubernetes secret this source reads from
    pub fn referenced_secret_name(self) -> Option<&'a str> {
        let name = match self {
            SecretSource::ItemNameAnnotation(name) => name,
            SecretSource::EnvSecretKey(selector) => selector.name.as_str(),
            SecretSource::EnvFromSecret(source) => source.name.as_str(),
            SecretSource::Volume(volume) => volume.secret_name.as_deref()?,
            SecretSource::ProjectedVolume(projection) => projection.name.as_str(),
        };
        (!name.is_empty()).then_some(name)
    }

    pub fn surface(self) -> Surface {
        match self {
            SecretSource::ItemNameAnnotation(_) => Surface::Annotations,
            SecretSource::EnvSecretKey(_) | SecretSource::EnvFromSecret(_) => Surface::Containers,
            SecretSource::Volume(_) | SecretSource::ProjectedVolume(_) => Surface::Volumes,
        }
    }
}

/// Sources declared through workload annotations
pub fn annotation_sources<W: Workload>(workload: &W) -> impl Iterator<Item = SecretSource<'_>> {
    workload
        .annotations()
        .and_then(|annotations| annotations.get(ITEM_NAME_ANNOTATION))
        .map(|name| SecretSource::ItemNameAnnotation(name.as_str()))
        .into_iter()
}

/// Sources declared on containers and init containers
pub fn container_sources<W: Workload>(workload: &W) -> impl Iterator<Item = SecretSource<'_>> {
    workload.containers().flat_map(|container| {
        let env = container
            .env
            .iter()
            .flatten()
            .filter_map(|var| var.value_from.as_ref()?.secret_key_ref.as_ref())
            .map(SecretSource::EnvSecretKey);
        let env_from = container
            .env_from
            .iter()
            .flatten()
            .filter_map(|source| source.secret_ref.as_ref())
            .map(SecretSource::EnvFromSecret);
        env.chain(env_from)
    })
}

/// Sources declared on pod volumes
pub fn volume_sources<W: Workload>(workload: &W) -> impl Iterator<Item = SecretSource<'_>> {
    workload.volumes().flat_map(|volume| {
        let secret = volume.secret.as_ref().map(SecretSource::Volume);
        let projected = volume
            .projected
            .iter()
            .flat_map(|projected| projected.sources.iter().flatten())
            .filter_map(|projection| projection.secret.as_ref())
            .map(SecretSource::ProjectedVolume);
        secret.into_iter().chain(projected)
    })
}
