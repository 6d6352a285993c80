use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("embedded catalog payload is missing")]
    MissingPayload,
    #[error("embedded catalog digest mismatch (expected {expected}, found {actual})")]
    DigestMismatch { expected: String, actual: String },
    #[error("failed to parse catalog JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("request template is empty")]
    Empty,
    #[error("request line must be 'METHOD URL', got '{0}'")]
    InvalidRequestLine(String),
    #[error("header line must be 'Key: Value', got '{0}'")]
    InvalidHeader(String),
    #[error("an image is required for this request")]
    MissingImage,
    #[error("audio is required for this request")]
    MissingAudio,
    #[error("multipart file uploads cannot be rendered into a request body")]
    FilesNotSupported,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to parse TOML configuration: {0}")]
    InvalidToml(#[from] toml::de::Error),
    #[error("configuration key '{0}' is missing")]
    MissingKey(String),
    #[error("configured llmSpec is not a valid request template: {0}")]
    InvalidTemplate(#[from] RequestError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("results file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("scan results were empty")]
    EmptyInput,
    #[error("failure rate for module '{0}' is not a finite number")]
    NonFiniteRate(String),
    #[error("failed to parse JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
