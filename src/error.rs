use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    /// A named type could not be found in any reachable package
    UnresolvedType { name: String, package: String },
    /// A selector qualifier matches no import of the referencing file
    UnresolvedImport { qualifier: String, file: PathBuf },
    /// A source file does not belong to any loaded package
    UnresolvedPackage { file: PathBuf },
    /// A type shape the synthesizer cannot express
    UnsupportedConstruct(String),
    /// A serialization tag that is not a valid quoted literal
    MalformedTag { field: String, tag: String },
    /// An external name that cannot be turned into a reference path
    ReferenceConstruction { name: String, reason: String },
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    InvalidArgument(String),
    SerializationError(String),
}

impl Error {
    /// Whether this error only means "no declaration by that name".
    ///
    /// Call sites mapping a bare identifier treat this as recoverable and fall
    /// back to the primitive table.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::UnresolvedType { .. } | Error::UnresolvedPackage { .. })
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::UnresolvedType { name, package } => {
                write!(f, "unable to find type {} in {}", name, package)
            }
            Error::UnresolvedImport { qualifier, file } => {
                write!(f, "no import found for {} in {}", qualifier, file.display())
            }
            Error::UnresolvedPackage { file } => {
                write!(f, "unable to determine package for {}", file.display())
            }
            Error::UnsupportedConstruct(what) => write!(f, "{} is unsupported for a schema", what),
            Error::MalformedTag { field, tag } => {
                write!(f, "malformed tag {} on field {}", tag, field)
            }
            Error::ReferenceConstruction { name, reason } => {
                write!(f, "cannot build a reference to {:?}: {}", name, reason)
            }
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "parse error in {}: {}", file.display(), message)
            }
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}

impl From<syn::Error> for Error {
    fn from(err: syn::Error) -> Self {
        Error::ParseError {
            file: PathBuf::from("<unknown>"),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_errors_are_recoverable() {
        let err = Error::UnresolvedType {
            name: "Pet".to_string(),
            package: "crate::models".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!Error::UnsupportedConstruct("tuple".to_string()).is_not_found());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::UnresolvedImport {
            qualifier: "models".to_string(),
            file: PathBuf::from("src/api.rs"),
        };
        assert_eq!(err.to_string(), "no import found for models in src/api.rs");

        let err = Error::UnsupportedConstruct("fn pointer".to_string());
        assert_eq!(err.to_string(), "fn pointer is unsupported for a schema");
    }
}
