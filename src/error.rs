//! Error handling and custom error types
//!
//! Provides unified error handling across the dashboard using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Could not obtain upload authorization: {0}")]
    AuthorizationFetchFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// The media object was stored but no record references it.
    #[error("Uploaded {locator} but attaching it to the {slot} record failed: {reason}")]
    MetadataWriteFailed {
        slot: String,
        locator: String,
        reason: String,
    },

    #[error("{0}")]
    LoginRejected(String),

    #[error("File size must be less than {} (got {size} bytes)", format_limit(.limit))]
    OversizeFile { size: u64, limit: u64 },

    #[error("Content API error: {0}")]
    ContentApi(String),

    #[error("Not authenticated; run `portfolio-admin login` first")]
    NotAuthenticated,

    #[error("Session storage error: {0}")]
    SessionStore(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

const MIB: u64 = 1024 * 1024;

fn format_limit(bytes: &u64) -> String {
    let bytes = *bytes;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= MIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use pretty_assertions::assert_eq;

    fn oversize(limit: u64) -> String {
        Error::OversizeFile {
            size: limit + 1,
            limit,
        }
        .to_string()
    }

    #[test]
    fn test_oversize_message_whole_megabytes() {
        assert_eq!(
            oversize(10 * 1024 * 1024),
            "File size must be less than 10MB (got 10485761 bytes)"
        );
    }

    #[test]
    fn test_oversize_message_small_and_fractional_limits() {
        assert_eq!(
            oversize(500_000),
            "File size must be less than 500000 bytes (got 500001 bytes)"
        );
        assert!(oversize(1536 * 1024).starts_with("File size must be less than 1.5MB"));
    }
}
