//! Error types for mnist-core
//!
//! Every variant names the archive (or split) it concerns, and
//! [`MnistError::stage`] reports which stage of the pipeline failed.

use thiserror::Error;

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Building the loader from configuration
    Configure,
    /// Reading the compressed archive from its source
    Fetch,
    /// Reading or writing the local cache
    Cache,
    /// Gunzipping the archive
    Decompress,
    /// Interpreting the IDX layout
    Parse,
    /// Pairing images with labels
    Assemble,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Configure => "configure",
            Stage::Fetch => "fetch",
            Stage::Cache => "cache",
            Stage::Decompress => "decompress",
            Stage::Parse => "parse",
            Stage::Assemble => "assemble",
        };
        f.write_str(name)
    }
}

/// Primary error type for all mnist-core operations
#[derive(Debug, Error)]
pub enum MnistError {
    // ========== Source Errors ==========

    /// Source archive does not exist
    #[error("Archive not found: {archive}")]
    NotFound { archive: String },

    /// HTTP request to the archive origin failed
    #[error("Fetching {archive} from {url} failed: {message}")]
    Network {
        archive: String,
        url: String,
        message: String,
    },

    // ========== Filesystem Errors ==========

    /// Read or write failure other than not-found
    #[error("I/O error during {stage} of {archive}: {source}")]
    Io {
        archive: String,
        stage: Stage,
        #[source]
        source: std::io::Error,
    },

    // ========== Payload Errors ==========

    /// Compressed payload is corrupt
    #[error("Failed to decompress {archive}: {source}")]
    Decompression {
        archive: String,
        #[source]
        source: std::io::Error,
    },

    /// Header declares a shape inconsistent with the payload
    #[error("Malformed {archive}: {reason}")]
    Format { archive: String, reason: String },

    /// Image and label counts differ within a split
    #[error("Split {split} has {images} images but {labels} labels")]
    ShapeMismatch {
        split: String,
        images: usize,
        labels: usize,
    },

    // ========== Runtime Errors ==========

    /// Configuration value could not be used
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl MnistError {
    /// Stage of the pipeline this error was raised in
    pub fn stage(&self) -> Stage {
        match self {
            MnistError::NotFound { .. } | MnistError::Network { .. } => Stage::Fetch,
            MnistError::Io { stage, .. } => *stage,
            MnistError::Decompression { .. } => Stage::Decompress,
            MnistError::Format { .. } => Stage::Parse,
            MnistError::ShapeMismatch { .. } | MnistError::Internal { .. } => Stage::Assemble,
            MnistError::InvalidConfig { .. } => Stage::Configure,
        }
    }

    /// Archive (or split, for shape mismatches) this error concerns
    pub fn archive(&self) -> Option<&str> {
        match self {
            MnistError::NotFound { archive }
            | MnistError::Network { archive, .. }
            | MnistError::Io { archive, .. }
            | MnistError::Decompression { archive, .. }
            | MnistError::Format { archive, .. } => Some(archive),
            MnistError::ShapeMismatch { split, .. } => Some(split),
            MnistError::Internal { .. } | MnistError::InvalidConfig { .. } => None,
        }
    }

    /// Returns true if the payload itself is bad, as opposed to its transport
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            MnistError::Decompression { .. }
                | MnistError::Format { .. }
                | MnistError::ShapeMismatch { .. }
        )
    }

    pub(crate) fn io(archive: &str, stage: Stage, source: std::io::Error) -> Self {
        MnistError::Io {
            archive: archive.to_string(),
            stage,
            source,
        }
    }

    pub(crate) fn format(archive: &str, reason: impl Into<String>) -> Self {
        MnistError::Format {
            archive: archive.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for mnist-core operations
pub type Result<T> = std::result::Result<T, MnistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        let err = MnistError::Decompression {
            archive: "train-images-idx3-ubyte".into(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "bad header"),
        };
        assert_eq!(err.stage(), Stage::Decompress);
        assert_eq!(err.archive(), Some("train-images-idx3-ubyte"));
        assert!(err.is_corruption());

        let err = MnistError::io(
            "t10k-labels-idx1-ubyte",
            Stage::Cache,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.stage(), Stage::Cache);
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_message_names_archive_and_stage() {
        let err = MnistError::io(
            "train-labels-idx1-ubyte",
            Stage::Fetch,
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        let msg = err.to_string();
        assert!(msg.contains("train-labels-idx1-ubyte"));
        assert!(msg.contains("fetch"));
    }
}
