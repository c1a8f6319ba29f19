use k8s_openapi::api::core::v1::Pod;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::runtime::WatchStreamExt;
use kube::runtime::watcher::{Config as WatcherConfig, watcher};
use kube::{Api, Client, Config};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::informer::{Informer, ResourceEventHandler, WatchHandle};
use crate::types::Selector;

/// Resolve cluster credentials, preferring the in-cluster service account and
/// falling back to the kubeconfig file at `kubeconfig`.
pub async fn load_config(kubeconfig: Option<&Path>) -> Result<Config> {
    let in_cluster = match Config::incluster() {
        Ok(config) => {
            debug!("Using in-cluster configuration");
            return Ok(config);
        }
        Err(e) => e.to_string(),
    };

    let Some(path) = kubeconfig else {
        return Err(Error::ConfigResolution {
            in_cluster,
            kubeconfig: "no kubeconfig path given and no home directory found".to_string(),
        });
    };

    match load_kubeconfig(path).await {
        Ok(config) => {
            debug!("Using kubeconfig {}", path.display());
            Ok(config)
        }
        Err(kubeconfig) => Err(Error::ConfigResolution {
            in_cluster,
            kubeconfig,
        }),
    }
}

async fn load_kubeconfig(path: &Path) -> std::result::Result<Config, String> {
    let kubeconfig = Kubeconfig::read_from(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| format!("failed to load {}: {}", path.display(), e))
}

pub fn build_client(config: Config) -> Result<Client> {
    Ok(Client::try_from(config)?)
}

/// Watches pods in one namespace (or all of them) that match a label selector.
pub struct PodWatcher<H> {
    client: Client,
    handler: H,
}

impl<H: ResourceEventHandler<Pod>> PodWatcher<H> {
    pub fn new(client: Client, handler: H) -> Self {
        Self { client, handler }
    }

    /// Start the watch in the background and return immediately.
    ///
    /// `namespace` of `None` (or empty) watches all namespaces. Every `resync` the cached
    /// pods are replayed as updates; zero disables that.
    pub fn watch(
        self,
        namespace: Option<&str>,
        selector: &Selector,
        resync: Duration,
    ) -> WatchHandle<Pod> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        let pods_api: Api<Pod> = match namespace {
            Some(ns) => Api::namespaced(self.client, ns),
            None => Api::all(self.client),
        };

        let mut cfg = WatcherConfig::default();
        if !selector.is_empty() {
            cfg = cfg.labels(&selector.to_string());
        }
        debug!(
            "Starting pod watcher for namespace: {}, selector: {}",
            namespace.unwrap_or("<all>"),
            selector
        );

        let stream = watcher(pods_api, cfg).default_backoff();
        Informer::new(self.handler).spawn(stream, resync)
    }
}
