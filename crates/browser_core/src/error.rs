//! Error types surfaced by the session core.

use shared::error::ApiError;
use thiserror::Error;

/// User-visible failure of a file-system or administrative mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to {action} {target}: {reason}")]
pub struct MutationError {
    pub action: &'static str,
    pub target: String,
    pub reason: String,
}

impl MutationError {
    pub fn new(action: &'static str, target: impl Into<String>, source: &anyhow::Error) -> Self {
        Self {
            action,
            target: target.into(),
            reason: source.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed settings file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidOverride { key: &'static str, value: String },
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid backend url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("backend request {command} failed: {source}")]
    Request {
        command: &'static str,
        source: reqwest::Error,
    },
    #[error("backend rejected {command}: {error}")]
    Backend {
        command: &'static str,
        error: ApiError,
    },
    #[error("backend returned status {status} for {command}")]
    Status {
        command: &'static str,
        status: u16,
    },
    #[error("undecodable preview payload for {path}: {source}")]
    PreviewPayload {
        path: String,
        source: base64::DecodeError,
    },
}
