//! Error handling for domain scouting operations.
//!
//! This module defines a comprehensive error type that covers all the different
//! ways domain scouting can fail, from network issues to invalid input.

use std::fmt;

/// Main error type for domain scouting operations.
///
/// This enum covers all possible failure modes in the scouting process,
/// providing detailed context for debugging and user-friendly error messages.
#[derive(Debug, Clone)]
pub enum DomainScoutError {
    /// Invalid domain name format
    InvalidDomain {
        domain: String,
        reason: String,
    },

    /// Network-related errors (connection, timeout, etc.)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// Registration metadata could not be resolved for a domain
    ResolutionFailed {
        domain: String,
        message: String,
    },

    /// WHOIS server discovery failures for a suffix
    ServerDiscovery {
        suffix: String,
        message: String,
    },

    /// Parsing errors for WHOIS responses and export documents
    ParseError {
        message: String,
        content: Option<String>,
    },

    /// Configuration errors (invalid settings, etc.)
    ConfigError {
        message: String,
    },

    /// File I/O errors when reading or writing documents
    FileError {
        path: String,
        message: String,
    },

    /// Timeout errors when operations take too long
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    /// Rate limiting errors when servers reject requests
    RateLimited {
        service: String,
        message: String,
        retry_after: Option<std::time::Duration>,
    },

    /// A listing already exists for the given domain name
    DuplicateListing {
        domain: String,
    },

    /// Listing store failures (database open, query, migration)
    StoreError {
        message: String,
        source: Option<String>,
    },

    /// Generic internal errors that don't fit other categories
    Internal {
        message: String,
    },
}

impl DomainScoutError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new resolution error.
    pub fn resolution<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::ResolutionFailed {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new server discovery error.
    pub fn server_discovery<S: Into<String>, M: Into<String>>(suffix: S, message: M) -> Self {
        Self::ServerDiscovery {
            suffix: suffix.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new duplicate listing error.
    pub fn duplicate_listing<D: Into<String>>(domain: D) -> Self {
        Self::DuplicateListing {
            domain: domain.into(),
        }
    }

    /// Create a new store error.
    pub fn store<M: Into<String>>(message: M) -> Self {
        Self::StoreError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new store error with source information.
    pub fn store_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::StoreError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error suggests the operation should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

impl fmt::Display for DomainScoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::ResolutionFailed { domain, message } => {
                write!(f, "Could not resolve '{}': {}", domain, message)
            }
            Self::ServerDiscovery { suffix, message } => {
                write!(f, "Server discovery failed for suffix '{}': {}", suffix, message)
            }
            Self::ParseError { message, content: _ } => {
                write!(f, "Parse error: {}", message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Timeout { operation, duration } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::RateLimited { service, message, retry_after } => {
                if let Some(retry) = retry_after {
                    write!(f, "Rate limited by {} (retry after {:?}): {}", service, retry, message)
                } else {
                    write!(f, "Rate limited by {}: {}", service, message)
                }
            }
            Self::DuplicateListing { domain } => {
                write!(f, "A listing for '{}' already exists", domain)
            }
            Self::StoreError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Listing store error: {} (source: {})", message, source)
                } else {
                    write!(f, "Listing store error: {}", message)
                }
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for DomainScoutError {}

// Implement From conversions for common error types
impl From<serde_json::Error> for DomainScoutError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
            content: None,
        }
    }
}

impl From<std::io::Error> for DomainScoutError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<sqlx::Error> for DomainScoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreError {
            message: "Database operation failed".to_string(),
            source: Some(err.to_string()),
        }
    }
}
