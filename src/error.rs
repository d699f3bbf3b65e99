use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Vault not detected: VAULT_ADDR not set")]
    VaultNotDetected,

    #[error("Vault token missing: VAULT_TOKEN not set")]
    MissingToken,

    /// The server answered with a status the endpoint does not accept.
    #[error("Vault operation failed ({status}): {}", .errors.join("; "))]
    Operation { status: u16, errors: Vec<String> },

    #[error("Vault request error: {0}")]
    RequestError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VaultError {
    /// HTTP status of a failed operation.
    pub fn status(&self) -> Option<u16> {
        match self {
            VaultError::Operation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Error messages reported by the server, in the order it sent them.
    pub fn errors(&self) -> &[String] {
        match self {
            VaultError::Operation { errors, .. } => errors,
            _ => &[],
        }
    }
}
