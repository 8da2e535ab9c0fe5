//! CLI error type

use std::path::PathBuf;

use assetform_lib::error::ConfigError;
use assetform_lib::error::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("invalid form definition: {0}")]
    Form(#[from] ConfigError),

    #[error("invalid values file: {0}")]
    Values(serde_json::Error),

    #[error("cannot write submission snapshot: {0}")]
    Snapshot(serde_json::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no API base URL configured (set [api] base_url)")]
    MissingBaseUrl,

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{0}' has no remote options")]
    NotRemote(String),

    #[error("submission rejected: {0} invalid fields")]
    Rejected(usize),
}
