use thiserror::Error;

#[derive(Error, Debug)]
pub enum KoverError {
    #[error("Failed to read report {path}: {source}")]
    ReadReport {
        path: String,
        source: std::io::Error,
    },

    #[error("XML parse error at position {position}: {source}")]
    Xml {
        source: quick_xml::Error,
        position: usize,
    },

    #[error("Malformed report at position {position}: {reason}")]
    MalformedReport { reason: String, position: usize },

    #[error("Invalid report {path}: {source}")]
    InvalidReport {
        path: String,
        source: Box<KoverError>,
    },

    #[error("No Kover report detected in path {0}")]
    NoCoverageData(String),

    #[error("Unknown counter type: '{0}'. Supported: INSTRUCTION, BRANCH, LINE, METHOD, CLASS")]
    UnknownCounterType(String),

    #[error("{0}")]
    Other(String),
}

impl KoverError {
    /// Whether the error means the report document itself could not be decoded.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        match self {
            KoverError::Xml { .. } | KoverError::MalformedReport { .. } => true,
            KoverError::InvalidReport { source, .. } => source.is_malformed(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, KoverError>;
