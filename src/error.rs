use serde::Serialize;

/// All errors that can surface at the edges of the desktop session.
///
/// In-game outcomes (mismatched hashes, missed circles) are never errors;
/// they travel as `UiEvent`s.
#[derive(Debug, thiserror::Error)]
pub enum DesktopError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Please input a hash.")]
    EmptyInput,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Desktop session is not running")]
    RuntimeClosed,
}

// Tauri requires error types to implement Serialize for IPC transport.
impl Serialize for DesktopError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DesktopError>;
