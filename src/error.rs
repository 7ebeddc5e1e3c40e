use std::path::PathBuf;

use thiserror::Error;

/// Startup-time failures. Every variant is fatal: the dashboard cannot run
/// without a canonical table and a roster.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("data load failed for {}: {message}", .path.display())]
    DataLoad { path: PathBuf, message: String },

    #[error("data format error: {0}")]
    DataFormat(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn data_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn data_format(message: impl Into<String>) -> Self {
        Self::DataFormat(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn is_data_load(&self) -> bool {
        matches!(self, Self::DataLoad { .. } | Self::Io(_))
    }

    pub fn is_data_format(&self) -> bool {
        matches!(self, Self::DataFormat(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
