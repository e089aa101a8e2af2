use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Tenant configuration parsing error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml_edit::de::Error),

    #[error("tenant '{tenant}' requires a secret when no fixed recipient is set")]
    OpenRelay { tenant: String },

    #[error("tenant '{tenant}' has no sender address")]
    MissingSender { tenant: String },
}
