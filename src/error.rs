//! Error handling types and utilities.

/// A specialized Result type for docnav-mcp operations.
///
/// Defaults to `anyhow::Error`, with context added via `.context()` and
/// `.with_context()` throughout the codebase. Typed errors name their own `E`.
pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// Error returned by a navigation snapshot store.
///
/// Callers recover from every variant by treating the snapshot as absent.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The store could not be read or written.
    #[error("storage unavailable for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// The stored value could not be encoded or decoded.
    #[error("corrupt snapshot for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The store has been disabled (no writable location).
    #[error("storage disabled")]
    Disabled,
}

/// Error returned when a page reference cannot be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The reference could not be turned into a location.
    #[error("invalid page reference '{href}'")]
    InvalidReference { href: String },
    /// The transport failed before a response arrived.
    #[error("failed to fetch '{href}': {message}")]
    Transport { href: String, message: String },
    /// The server answered with a non-success status.
    #[error("HTTP {status} for '{href}'")]
    Status { href: String, status: u16 },
}

impl FetchError {
    /// The page reference that failed.
    pub fn href(&self) -> &str {
        match self {
            Self::InvalidReference { href }
            | Self::Transport { href, .. }
            | Self::Status { href, .. } => href,
        }
    }
}

/// Error returned by navigation controller transitions.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// Incremental load failed; the content pane keeps its previous page.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// There is no history entry in the requested direction.
    #[error("no {0} history entry")]
    NoHistory(&'static str),
}
