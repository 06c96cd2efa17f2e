use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Controller error: {0}")]
    Controller(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Logging error: {0}")]
    Logging(String),
}

/// Why a single fetch/normalize/push/render cycle was abandoned.
///
/// These never escape the polling loop; they are logged and handed to the
/// controller's error hook.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycleError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Cycle from generation {started} discarded (current generation {current})")]
    Cancelled { started: u64, current: u64 },
}

impl CycleError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CycleError::Cancelled { .. })
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render failed: {0}")]
    Failed(String),
}
