use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("API request to {endpoint} failed: {detail}")]
    Fetch { endpoint: String, detail: String },

    #[error("Unexpected response from {endpoint}: {detail}")]
    Parse { endpoint: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Process exit status for this error.
    ///
    /// Configuration problems exit with 2 so wrappers can tell them apart
    /// from upstream API failures, which exit with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Fetch { .. } | Self::Parse { .. } | Self::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
