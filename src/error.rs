use crate::annotation::MappingKind;
use std::path::PathBuf;

/// Result type alias for the resolution pass
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors of a resolution pass.
///
/// Any of these aborts the whole pass; nothing is aggregated or written once one
/// has been returned.
#[derive(Debug)]
pub enum Error {
    /// A required route attribute could not be found anywhere in the fallback chain
    Resolution {
        declaration: String,
        attribute: RouteAttribute,
    },
    /// The report file could not be read, removed or written
    Io { path: PathBuf, source: std::io::Error },
    /// A declaration model file could not be decoded
    Model(String),
}

/// Non-fatal findings of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A declaration carries more than one mapping annotation; only `selected` is used
    AmbiguousAnnotation {
        declaration: String,
        found: Vec<MappingKind>,
        selected: MappingKind,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Warning::AmbiguousAnnotation {
                declaration,
                found,
                selected,
            } => {
                let found: Vec<&str> = found.iter().map(|k| k.name()).collect();
                write!(
                    f,
                    "found multiple mapping annotations on {} ({}), only {} will be considered",
                    declaration,
                    found.join(", "),
                    selected
                )
            }
        }
    }
}

/// Route attributes that must resolve to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAttribute {
    Path,
    Methods,
}

impl std::fmt::Display for RouteAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RouteAttribute::Path => write!(f, "path"),
            RouteAttribute::Methods => write!(f, "request methods"),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Resolution {
                declaration,
                attribute,
            } => write!(
                f,
                "could not resolve {} for {}: no mapping on it or any enclosing declaration provides one",
                attribute, declaration
            ),
            Error::Io { path, source } => {
                write!(f, "report I/O failed for {}: {}", path.display(), source)
            }
            Error::Model(msg) => write!(f, "invalid declaration model: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Model(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Model(format!("YAML: {}", err))
    }
}
