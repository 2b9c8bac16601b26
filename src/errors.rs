use std::io;

use thiserror::Error;

/// Longest tag key or value accepted by the OSM API.
pub const MAX_TAG_LENGTH: usize = 255;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("tag {part} too long (max. 255 chars): {text}")]
    TagTooLong { part: &'static str, text: String },

    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometryType(String),

    #[error("processor {processor} failed: {message}")]
    Processing { processor: &'static str, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Message(String),
}

impl Error {
    /// True when the error only invalidates the feature being encoded, so the
    /// caller can skip it and carry on with the rest of the stream.
    pub fn is_feature_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidGeometry(_)
                | Error::TagTooLong { .. }
                | Error::UnsupportedGeometryType(_)
                | Error::Processing { .. }
        )
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Message(value.to_string())
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Message(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_errors_are_recoverable() {
        assert!(Error::InvalidGeometry("ring".into()).is_feature_error());
        assert!(Error::TagTooLong { part: "key", text: "k".into() }.is_feature_error());
        assert!(!Error::Config("bad".into()).is_feature_error());
        assert!(!Error::from("boom").is_feature_error());
    }

    #[test]
    fn tag_too_long_message_names_the_limit() {
        let err = Error::TagTooLong { part: "value", text: "x".into() };
        assert_eq!(err.to_string(), "tag value too long (max. 255 chars): x");
    }
}
