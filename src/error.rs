/// Errors raised while turning descriptors into TypeScript.
///
/// Every variant is fatal: the run stops and no partial output is produced.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("no type found for {0}")]
    NoTypeFound(String),

    #[error("duplicate type name '{name}' in '{file}'")]
    DuplicateType { file: String, name: String },

    #[error("unsupported field '{field}' in message '{message}': {reason}")]
    UnsupportedField {
        message: String,
        field: String,
        reason: String,
    },

    #[error("unsupported method '{method}' in service '{service}': {reason}")]
    UnsupportedMethod {
        service: String,
        method: String,
        reason: String,
    },

    #[error("descriptor '{0}' has no name")]
    MissingName(String),

    #[error("file '{0}' is listed for generation but not present in the request")]
    UnknownFile(String),
}

/// Errors from the protoc plugin plumbing around the generator.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("failed to decode CodeGeneratorRequest: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("failed to encode CodeGeneratorResponse: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error type that wraps all sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Result type alias for protots operations.
pub type Result<T> = std::result::Result<T, Error>;
