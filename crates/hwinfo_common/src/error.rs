//! Error types for hwinfo.
//!
//! The traversal and rendering core never fails. These errors only come from
//! the outer surface: parsing paths, loading config, snapshots and class tables.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HwinfoError {
    #[error("Invalid probe path '{0}'")]
    InvalidPath(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Class table error: {0}")]
    ClassTable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl HwinfoError {
    /// Short machine-readable code, used in CLI error output.
    pub fn code(&self) -> &'static str {
        match self {
            HwinfoError::InvalidPath(_) => "invalid_path",
            HwinfoError::Config(_) => "config",
            HwinfoError::Snapshot(_) => "snapshot",
            HwinfoError::ClassTable(_) => "class_table",
            HwinfoError::Io(_) => "io",
            HwinfoError::Json(_) => "json",
            HwinfoError::Toml(_) => "toml",
        }
    }
}

pub type Result<T> = std::result::Result<T, HwinfoError>;
