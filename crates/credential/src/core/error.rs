//! Error types for collaborator operations
//!
//! Three leaf error families, one per seam:
//! - [`ValidationError`]: malformed key ids
//! - [`KeyStoreError`]: list / delete / create against the identity's key set
//! - [`SinkError`]: persisting a new credential pair
//!
//! The rotation engine wraps these with step context in
//! [`RotationError`](crate::rotation::RotationError).

use std::path::PathBuf;

use thiserror::Error;

/// Validation errors for identifiers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Key id is empty
    #[error("Access key id cannot be empty")]
    EmptyKeyId,

    /// Key id is malformed
    #[error("Invalid access key id '{id}': {reason}")]
    InvalidKeyId {
        /// Offending id
        id: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Key store operation errors
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// The key does not exist in the identity's key set
    #[error("Access key '{id}' not found")]
    NotFound {
        /// Key id
        id: String,
    },

    /// The store refused to delete a key that is in use
    #[error("Access key '{id}' is in use and cannot be deleted")]
    InUse {
        /// Key id
        id: String,
    },

    /// The identity already holds the maximum number of keys
    #[error("Access key quota exceeded for the identity")]
    LimitExceeded,

    /// Remote call failed
    #[error("{operation} request failed: {message}")]
    Request {
        /// `list`, `delete` or `create`
        operation: &'static str,
        /// Rendered service error
        message: String,
    },

    /// Remote call succeeded but the response is unusable
    #[error("Malformed {operation} response: {reason}")]
    MalformedResponse {
        /// `list`, `delete` or `create`
        operation: &'static str,
        /// What was missing or invalid
        reason: String,
    },

    /// The credentials the process runs with could not be resolved
    #[error("Could not resolve the current access key: {0}")]
    Credentials(String),
}

/// Credential sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// File I/O failed
    #[error("Failed to write '{path}': {source}")]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding/decoding failed
    #[error("Failed to encode credential: {0}")]
    Serialize(#[from] serde_json::Error),

    /// External program could not be started
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// External program exited unsuccessfully
    #[error("'{program}' exited with {status}: {output}")]
    Command {
        /// Program name
        program: String,
        /// Exit status as rendered by the OS
        status: String,
        /// Captured stderr (stdout when stderr is empty)
        output: String,
    },

    /// HTTP endpoint answered with a non-200 status
    #[error("Failed to update context variable {variable} (HTTP {status}): {body}")]
    Http {
        /// Variable being updated
        variable: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// HTTP request could not be sent
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_messages() {
        let err = KeyStoreError::InUse {
            id: "AKIA1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Access key 'AKIA1' is in use and cannot be deleted"
        );

        let err = KeyStoreError::Request {
            operation: "list",
            message: "throttled".to_string(),
        };
        assert_eq!(err.to_string(), "list request failed: throttled");
    }

    #[test]
    fn test_http_sink_error_carries_body() {
        let err = SinkError::Http {
            variable: "AWS_ACCESS_KEY_ID",
            status: 403,
            body: "{\"message\":\"Permission denied\"}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("Permission denied"));
    }
}
