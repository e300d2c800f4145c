use std::fmt;

//------------ PcError --------------------------------------------------------

/// Errors returned by the point-cloud tree, codec, schema and filter
/// operations.
#[derive(Debug)]
pub enum PcError {
    /// Bad input: hash out of range, XML malformed, binary header mismatch.
    Malformed { detail: String },
    /// A coordinate or a packed attribute value is out of range.
    Range { detail: String },
    /// A schema lookup by name or index missed.
    NotFound { detail: String },
    /// A file operation failed.
    Io(std::io::Error),
    /// A binary version or a dimension type was not recognized.
    Unsupported { detail: String },
    /// A generic invariant violation not covered by the variants above.
    Invariant { detail: String },
}

impl PcError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        PcError::Malformed { detail: detail.into() }
    }

    pub(crate) fn range(detail: impl Into<String>) -> Self {
        PcError::Range { detail: detail.into() }
    }

    pub(crate) fn not_found(detail: impl Into<String>) -> Self {
        PcError::NotFound { detail: detail.into() }
    }

    pub(crate) fn unsupported(detail: impl Into<String>) -> Self {
        PcError::Unsupported { detail: detail.into() }
    }

    pub(crate) fn invariant(detail: impl Into<String>) -> Self {
        PcError::Invariant { detail: detail.into() }
    }
}

impl fmt::Display for PcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PcError::Malformed { detail } => {
                write!(f, "Error: malformed input: {detail}")
            }
            PcError::Range { detail } => {
                write!(f, "Error: value out of range: {detail}")
            }
            PcError::NotFound { detail } => {
                write!(f, "Error: not found: {detail}")
            }
            PcError::Io(e) => write!(f, "Error: I/O failure: {e}"),
            PcError::Unsupported { detail } => {
                write!(f, "Error: unsupported: {detail}")
            }
            PcError::Invariant { detail } => {
                write!(f, "Error: invariant violated: {detail}")
            }
        }
    }
}

impl std::error::Error for PcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PcError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PcError {
    fn from(e: std::io::Error) -> Self {
        PcError::Io(e)
    }
}

/// Convenience alias used throughout this crate.
pub type PcResult<T> = Result<T, PcError>;
