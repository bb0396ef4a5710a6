//! Error types for Scholar Digest.

/// Top-level error type for the digest tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural errors raised while querying a document tree.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document has no content container")]
    MissingContentContainer,

    #[error("Entry has no title hyperlink in its first fragment")]
    MissingTitleLink,
}

/// Pipeline-related errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No source documents to process")]
    NoSourceDocuments,

    #[error("Template construction failed: {0}")]
    Template(DocumentError),

    #[error("Digest composition failed: {0}")]
    Compose(DocumentError),
}

/// Mail transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to connect to {host}: {reason}")]
    ConnectFailed { host: String, reason: String },

    #[error("Authentication failed for {user}")]
    AuthFailed { user: String },

    #[error("Failed to fetch messages: {0}")]
    FetchFailed(String),

    #[error("Failed to update message flags: {0}")]
    FlagUpdateFailed(String),

    #[error("Failed to send digest: {0}")]
    SendFailed(String),
}

/// Result type alias for the digest tool.
pub type Result<T> = std::result::Result<T, Error>;
