// Error types shared by the storage layer and the import/export codec.
// Store operations that merely violate a tab rule return bool/Option instead.

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Import document is not shaped like a backup.
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Storage unavailable: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
