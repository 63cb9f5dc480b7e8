use thiserror::Error;

/// Errors raised while parsing a compact-serialized JWT
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: expected 3 dot-separated segments, found {segments}")]
    MalformedStructure { segments: usize },

    #[error("Invalid token header: {reason}")]
    InvalidHeader { reason: String },

    #[error("Invalid token claims: {reason}")]
    InvalidClaims { reason: String },

    #[error("Invalid token signature encoding: {reason}")]
    InvalidSignature { reason: String },
}

/// Cache backend errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O failed for {path}: {message}")]
    Io { path: String, message: String },

    #[error("Cache serialization failed: {message}")]
    Serialization { message: String },

    #[error("Cache backend unavailable: {message}")]
    Unavailable { message: String },
}

/// Errors surfaced by a token storage implementation
///
/// Both variants are pass-through: the cache adapter never converts them into
/// an absent token.
#[derive(Error, Debug)]
pub enum TokenStorageError {
    #[error("Token cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Stored token could not be parsed: {0}")]
    Parse(#[from] TokenError),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },

    #[error("Configuration file error: {message}")]
    FileError { message: String },
}

/// Errors for the admin client and its registration
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Missing required configuration: keycloak-admin.{key}")]
    MissingConfiguration { key: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Token storage error: {0}")]
    TokenStorage(#[from] TokenStorageError),

    #[error("Token acquisition failed: {reason}")]
    TokenAcquisitionFailed { reason: String },

    #[error("Token refresh failed: {reason}")]
    TokenRefreshFailed { reason: String },

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Keycloak error: {0}")]
    Keycloak(#[from] keycloak::KeycloakError),

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Service container error: {0}")]
    Container(#[from] ContainerError),
}

/// Result type for admin client operations
pub type AdminResult<T> = Result<T, AdminError>;

impl From<ConfigError> for AdminError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingRequired { key } => AdminError::MissingConfiguration { key },
            ConfigError::FileError { message } => AdminError::Configuration { message },
        }
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        AdminError::Http {
            status: err.status().map(|s| s.as_u16()).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

/// Service container errors
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("No binding registered for {key}")]
    Unbound { key: String },

    #[error("Unknown alias: {alias}")]
    UnknownAlias { alias: String },

    #[error("Binding {key} does not hold a {expected}")]
    TypeMismatch { key: String, expected: String },

    #[error("Failed to resolve {key}: {source}")]
    Resolution {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
