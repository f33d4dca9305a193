//! Failure kinds surfaced to callers.
//!
//! `invalid_portal` is deliberately absent: an invalid portal is data (a
//! `Portal` with an `InvalidityReason`), never an error value.

use std::fmt;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Discriminant of [`Error`], used for propagation decisions and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RemoteUnavailable,
    Unauthenticated,
    NotFound,
    SchemaError,
    Cancelled,
    IoError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::RemoteUnavailable => "remote_unavailable",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::NotFound => "not_found",
            ErrorKind::SchemaError => "schema_error",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::IoError => "io_error",
        }
    }

    /// Whether a failure of this kind on one map aborts a whole-space analysis.
    ///
    /// Only `not_found` is local to the map.
    pub fn aborts_analysis(self) -> bool {
        !matches!(self, ErrorKind::NotFound)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("remote unavailable{}: {cause}", at_map(.map_id))]
    RemoteUnavailable {
        map_id: Option<String>,
        cause: String,
    },

    #[error("unauthenticated{}: {cause}", at_map(.map_id))]
    Unauthenticated {
        map_id: Option<String>,
        cause: String,
    },

    #[error("not found{}: {cause}", at_map(.map_id))]
    NotFound {
        map_id: Option<String>,
        cause: String,
    },

    #[error("schema error{}: {cause}", at_map(.map_id))]
    Schema {
        map_id: Option<String>,
        cause: String,
    },

    #[error("analysis cancelled")]
    Cancelled,

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn at_map(map_id: &Option<String>) -> String {
    match map_id {
        Some(id) => format!(" (map `{id}`)"),
        None => String::new(),
    }
}

impl Error {
    /// Build an error of a remote-facing kind.
    ///
    /// `Cancelled` and `IoError` carry no map/cause pair; asking for them here
    /// yields `Cancelled` and a schema error respectively, so callers should use
    /// [`Error::Cancelled`] and [`Error::io`] directly for those kinds.
    pub fn from_kind(kind: ErrorKind, map_id: Option<&str>, cause: impl Into<String>) -> Self {
        let map_id = map_id.map(str::to_string);
        let cause = cause.into();
        match kind {
            ErrorKind::RemoteUnavailable => Error::RemoteUnavailable { map_id, cause },
            ErrorKind::Unauthenticated => Error::Unauthenticated { map_id, cause },
            ErrorKind::NotFound => Error::NotFound { map_id, cause },
            ErrorKind::SchemaError | ErrorKind::IoError => Error::Schema { map_id, cause },
            ErrorKind::Cancelled => Error::Cancelled,
        }
    }

    pub fn remote_unavailable(map_id: Option<&str>, cause: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::RemoteUnavailable, map_id, cause)
    }

    pub fn unauthenticated(map_id: Option<&str>, cause: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Unauthenticated, map_id, cause)
    }

    pub fn not_found(map_id: Option<&str>, cause: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::NotFound, map_id, cause)
    }

    pub fn schema(map_id: Option<&str>, cause: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::SchemaError, map_id, cause)
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RemoteUnavailable { .. } => ErrorKind::RemoteUnavailable,
            Error::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Schema { .. } => ErrorKind::SchemaError,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Io { .. } => ErrorKind::IoError,
        }
    }

    pub fn map_id(&self) -> Option<&str> {
        match self {
            Error::RemoteUnavailable { map_id, .. }
            | Error::Unauthenticated { map_id, .. }
            | Error::NotFound { map_id, .. }
            | Error::Schema { map_id, .. } => map_id.as_deref(),
            Error::Cancelled | Error::Io { .. } => None,
        }
    }

    /// Underlying cause without the kind/map prefix.
    pub fn cause(&self) -> String {
        match self {
            Error::RemoteUnavailable { cause, .. }
            | Error::Unauthenticated { cause, .. }
            | Error::NotFound { cause, .. }
            | Error::Schema { cause, .. } => cause.clone(),
            Error::Cancelled => "cancellation requested".to_string(),
            Error::Io { source, .. } => source.to_string(),
        }
    }

    /// Attach a map id if the error does not carry one yet.
    pub fn with_map_id(mut self, id: &str) -> Self {
        match &mut self {
            Error::RemoteUnavailable { map_id, .. }
            | Error::Unauthenticated { map_id, .. }
            | Error::NotFound { map_id, .. }
            | Error::Schema { map_id, .. } => {
                if map_id.is_none() {
                    *map_id = Some(id.to_string());
                }
            }
            Error::Cancelled | Error::Io { .. } => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_map_and_cause() {
        let err = Error::schema(Some("M1"), "objects must be a list or mapping");
        assert_eq!(
            err.to_string(),
            "schema error (map `M1`): objects must be a list or mapping"
        );
        assert_eq!(err.kind(), ErrorKind::SchemaError);
        assert_eq!(err.map_id(), Some("M1"));
    }

    #[test]
    fn with_map_id_does_not_override() {
        let err = Error::not_found(Some("A"), "404").with_map_id("B");
        assert_eq!(err.map_id(), Some("A"));

        let err = Error::remote_unavailable(None, "timeout").with_map_id("B");
        assert_eq!(err.map_id(), Some("B"));
        assert_eq!(err.to_string(), "remote unavailable (map `B`): timeout");
    }

    #[test]
    fn only_not_found_is_local() {
        assert!(!ErrorKind::NotFound.aborts_analysis());
        assert!(ErrorKind::RemoteUnavailable.aborts_analysis());
        assert!(ErrorKind::Unauthenticated.aborts_analysis());
        assert!(ErrorKind::SchemaError.aborts_analysis());
        assert!(ErrorKind::Cancelled.aborts_analysis());
    }
}
