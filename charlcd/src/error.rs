use charlcd_core::InitError;
use charlcd_hal_linux::HalError;
use thiserror::Error;

/// Opening a display failed
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid size {0:?}, expected WxH")]
    Size(String),

    #[error("{connection} connection needs `{field}`")]
    Missing {
        connection: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    Device(#[from] HalError),

    #[error("display init failed: {0}")]
    Init(InitError),
}

impl From<InitError> for OpenError {
    fn from(err: InitError) -> Self {
        OpenError::Init(err)
    }
}
