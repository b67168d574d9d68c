use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage operation failed: {0}")]
    Backend(String),

    #[error("Stored value is not valid JSON: {0}")]
    Serialization(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP error from {endpoint}: status {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("Unexpected response from {endpoint}: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No files selected")]
    EmptySelection,

    #[error("A request is already in flight")]
    Busy,

    #[error("Unknown document: {0}")]
    UnknownDocument(String),
}

impl ClientError {
    /// Network, status and decode failures, handled alike by every view
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::Status { .. } | ClientError::Decode { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClientError::Status {
            endpoint: "summarize",
            status: 502,
        };
        assert_eq!(err.to_string(), "HTTP error from summarize: status 502");

        let err: ClientError = StorageError::Unavailable("no localStorage".into()).into();
        assert_eq!(err.to_string(), "Storage unavailable: no localStorage");
    }

    #[test]
    fn test_request_failure_classes() {
        assert!(ClientError::Transport("offline".into()).is_request_failure());
        assert!(ClientError::Decode {
            endpoint: "chat",
            message: "missing field".into()
        }
        .is_request_failure());
        assert!(!ClientError::Busy.is_request_failure());
        assert!(!ClientError::EmptySelection.is_request_failure());
    }
}
