//! Error types for the emitter

pub type Result<T> = std::result::Result<T, EmitterError>;

#[derive(Debug, thiserror::Error)]
pub enum EmitterError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A context value could not be represented and was substituted
    #[error("Encoding degraded: {count} value(s) replaced")]
    EncodingDegradation { count: usize },

    /// A sink failed to accept an encoded record
    #[error("Sink '{sink}' write failed: {message}")]
    SinkWrite { sink: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    SinkRotation { path: String, message: String },

    /// Host name could not be resolved to a socket address
    #[error("Cannot resolve address '{address}': {message}")]
    AddressResolution { address: String, message: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Emitter already closed
    #[error("Emitter already closed")]
    EmitterClosed,
}

impl EmitterError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        EmitterError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a sink write error
    pub fn sink_write(sink: impl Into<String>, message: impl Into<String>) -> Self {
        EmitterError::SinkWrite {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn sink_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        EmitterError::SinkRotation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an address resolution error
    pub fn address(address: impl Into<String>, message: impl Into<String>) -> Self {
        EmitterError::AddressResolution {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        EmitterError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Short, stable tag for the error variant.
    ///
    /// Used as part of the deduplication key for stderr diagnostics, so two
    /// failures of the same kind on the same sink collapse into one report.
    pub fn kind(&self) -> &'static str {
        match self {
            EmitterError::IoOperation { .. } => "io_operation",
            EmitterError::IoError(_) => "io",
            EmitterError::EncodingDegradation { .. } => "encoding_degradation",
            EmitterError::SinkWrite { .. } => "sink_write",
            EmitterError::SinkRotation { .. } => "sink_rotation",
            EmitterError::AddressResolution { .. } => "address_resolution",
            EmitterError::InvalidConfiguration { .. } => "invalid_configuration",
            EmitterError::EmitterClosed => "closed",
        }
    }
}
