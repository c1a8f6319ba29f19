use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::types::Selector;
use crate::utils::default_kubeconfig_path;

#[derive(Parser)]
#[command(name = "pod-event-logger")]
#[command(about = "Log pod create, update and delete events for a namespace and label selector")]
pub struct Cli {
    /// Absolute path to the kubeconfig file (defaults to ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace to watch (all namespaces when omitted)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Print pod object details and update diffs
    #[arg(long)]
    pub details: bool,

    /// Selector (label query) to filter on
    #[arg(short = 'l', long, default_value = "baz=quux,foo=bar")]
    pub selector: Selector,

    /// Resync period in seconds (0 disables periodic resync)
    #[arg(long, default_value_t = 300)]
    pub resync: u64,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Kubeconfig path from the flag, falling back to the one under the home directory.
    pub fn kubeconfig_path(&self) -> Option<PathBuf> {
        self.kubeconfig.clone().or_else(default_kubeconfig_path)
    }

    pub fn resync_period(&self) -> Duration {
        Duration::from_secs(self.resync)
    }
}
