//! Error types shared by the domain and infrastructure layers.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The analysis data is not a JSON array of records.
    #[error("malformed analysis input: {0}")]
    MalformedInput(String),

    #[error("XML syntax error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Empty document, or an element still open at end of input.
    #[error("incomplete XML document: {0}")]
    Incomplete(String),

    #[error("root element must be <function>, found <{0}>")]
    UnexpectedRoot(String),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
