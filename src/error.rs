//! Error types for descriptor loading and schema conversion.

use std::path::PathBuf;
use thiserror::Error;

use crate::descriptor::FieldKind;

/// Errors converting a message. Any of them aborts the whole message; no
/// partial schema is produced.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unrecognized field type: {kind} (field {field} in message {message})")]
    UnrecognizedFieldKind {
        field: String,
        message: String,
        kind: FieldKind,
    },

    #[error("no such message type named {type_name} (field {field} in message {message})")]
    UnresolvedTypeReference {
        type_name: String,
        field: String,
        message: String,
    },

    #[error("cyclic reference to message type {type_name} (field {field} in message {message})")]
    CyclicTypeReference {
        type_name: String,
        field: String,
        message: String,
    },
}

impl ConvertError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors reading descriptor input.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Input errors (exit code 2)
    #[error("invalid descriptor data: {source}")]
    Decode {
        #[source]
        source: prost::DecodeError,
    },

    #[error("file {name} is not part of the descriptor set")]
    UnknownFile { name: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } | Self::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors generating output files for a set of proto files.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("{file}: {source}")]
    Convert {
        file: String,
        #[source]
        source: ConvertError,
    },
}

impl GenerateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Load(e) => e.exit_code(),
            Self::Convert { source, .. } => source.exit_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("schema.pb"),
        };
        assert_eq!(err.exit_code(), 3);

        let err = LoadError::UnknownFile {
            name: "missing.proto".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn generate_error_exit_codes() {
        let err = GenerateError::Convert {
            file: "shop.proto".into(),
            source: ConvertError::UnresolvedTypeReference {
                type_name: ".shop.Missing".into(),
                field: "item".into(),
                message: "Order".into(),
            },
        };
        assert_eq!(err.exit_code(), 2);

        let err = GenerateError::from(LoadError::ReadError {
            path: PathBuf::from("schema.pb"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn convert_error_display() {
        let err = ConvertError::UnrecognizedFieldKind {
            field: "blob".into(),
            message: "Upload".into(),
            kind: FieldKind::Unknown(42),
        };
        assert_eq!(
            err.to_string(),
            "unrecognized field type: unknown type 42 (field blob in message Upload)"
        );

        let err = ConvertError::UnresolvedTypeReference {
            type_name: ".shop.Itme".into(),
            field: "item".into(),
            message: "Order".into(),
        };
        assert_eq!(
            err.to_string(),
            "no such message type named .shop.Itme (field item in message Order)"
        );
    }
}
