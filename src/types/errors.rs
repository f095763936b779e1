use std::fmt;

// === TransportError ===

/// Errors raised while talking to the remote manga API.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, reset, timeout).
    Network(String),
    /// The request URL could not be built from the configured base URL.
    InvalidUrl(String),
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The response body was not the expected JSON shape.
    Decode(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "Network error: {}", msg),
            TransportError::InvalidUrl(url) => write!(f, "Invalid API URL: {}", url),
            TransportError::Status(code) => write!(f, "Unexpected HTTP status: {}", code),
            TransportError::Decode(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

// === ConnectionError ===

/// Failure of a catalog or chapter-list fetch.
///
/// Distinct from an empty result: callers render an error state with a retry
/// affordance for this, and an "no results" state for an empty list.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionError {
    /// The request never reached the server or the connection dropped.
    Network(String),
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The server answered 2xx but the body could not be decoded.
    Decode(String),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Network(msg) => write!(f, "Connection error: {}", msg),
            ConnectionError::Status(code) => write!(f, "Connection error: status {}", code),
            ConnectionError::Decode(msg) => {
                write!(f, "Connection error: malformed response: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

impl From<TransportError> for ConnectionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(msg) => ConnectionError::Network(msg),
            TransportError::InvalidUrl(url) => ConnectionError::Network(format!("invalid URL {}", url)),
            TransportError::Status(code) => ConnectionError::Status(code),
            TransportError::Decode(msg) => ConnectionError::Decode(msg),
        }
    }
}

// === LoadError ===

/// Failure of a chapter page-list fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The request never reached the server or the connection dropped.
    Network(String),
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The server answered 2xx but the body could not be decoded.
    Decode(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Network(msg) => write!(f, "Chapter load failed: {}", msg),
            LoadError::Status(code) => write!(f, "Chapter load failed: status {}", code),
            LoadError::Decode(msg) => {
                write!(f, "Chapter load failed: malformed response: {}", msg)
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl From<TransportError> for LoadError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(msg) => LoadError::Network(msg),
            TransportError::InvalidUrl(url) => LoadError::Network(format!("invalid URL {}", url)),
            TransportError::Status(code) => LoadError::Status(code),
            TransportError::Decode(msg) => LoadError::Decode(msg),
        }
    }
}

// === StorageError ===

/// Errors related to the local key-value store.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Database operation failed.
    DatabaseError(String),
    /// Failed to serialize a value for storage.
    SerializationError(String),
    /// A stored value exists but is not valid JSON for its key.
    /// Stores recover from this by falling back to defaults.
    Malformed { key: String, reason: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DatabaseError(msg) => write!(f, "Storage database error: {}", msg),
            StorageError::SerializationError(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
            StorageError::Malformed { key, reason } => {
                write!(f, "Malformed stored value for '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for StorageError {}

// === ConfigError ===

/// Errors related to loading the application configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading the config file.
    IoError(String),
    /// The config file exists but could not be parsed.
    ParseError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
