use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Neither the in-cluster service account nor the kubeconfig file produced a config.
    #[error("unable to load cluster configuration: in-cluster: {in_cluster}; kubeconfig: {kubeconfig}")]
    ConfigResolution {
        in_cluster: String,
        kubeconfig: String,
    },

    #[error("failed to create Kubernetes client: {0}")]
    ClientConstruction(#[from] kube::Error),

    #[error("invalid label selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("failed to serialize object: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
