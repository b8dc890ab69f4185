use crate::host::HostError;
use wavescape_common::ConfigError;

/// Errors that prevent a world from being assembled.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The configured container does not exist. Construction stops here.
    #[error("container `{0}` not found; it must exist before the world is built")]
    ContainerNotFound(String),
    #[error(transparent)]
    Host(HostError),
}

impl From<HostError> for WorldError {
    fn from(e: HostError) -> Self {
        match e {
            HostError::ContainerNotFound(id) => Self::ContainerNotFound(id),
            other => Self::Host(other),
        }
    }
}
