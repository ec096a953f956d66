// top-level error for the public API

#[derive(Debug, thiserror::Error)]
pub enum TorchloadError {
    #[error(
        "unsupported platform `{requested}`: expected one of the linux, macos, or windows aliases"
    )]
    UnsupportedPlatform { requested: String },

    #[error("incompatible configuration: {reason}")]
    IncompatibleConfig { reason: String },

    #[error("version resolution failed: {reason}")]
    Resolution { reason: String },

    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("extraction of '{archive}' failed: {reason}")]
    Extraction {
        archive: std::path::PathBuf,
        reason: String,
    },

    #[error("{operation} failed for '{path}'")]
    FileSystem {
        operation: &'static str,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type TorchloadResult<T> = std::result::Result<T, TorchloadError>;

impl TorchloadError {
    pub fn file_system(
        operation: &'static str,
        path: impl Into<std::path::PathBuf>,
        err: impl Into<std::io::Error>,
    ) -> Self {
        Self::FileSystem {
            operation,
            path: path.into(),
            source: err.into(),
        }
    }
}
