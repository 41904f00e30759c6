//! Error taxonomy for resource resolution
//!
//! Every gateway, walker and aggregator call returns [`Result`]. Errors raised
//! while fetching a specific resource are wrapped in [`Error::Fetch`] so the
//! caller can see which link of an ownership chain broke, while
//! [`Error::kind`] still reports the underlying condition.

use crate::models::ResourceIdentity;

/// Result type for resolver operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Resolver errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("cluster unavailable: {0}")]
    Unavailable(String),

    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("malformed {kind}: {message}")]
    Malformed { kind: String, message: String },

    #[error("failed to fetch {identity}: {source}")]
    Fetch {
        identity: ResourceIdentity,
        #[source]
        source: Box<Error>,
    },
}

/// Classification of an [`Error`], independent of how deeply it was wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Forbidden,
    Unavailable,
    UnknownKind,
    Malformed,
}

impl Error {
    /// Wrap an error with the identity of the resource being fetched
    pub fn fetching(identity: ResourceIdentity, source: Error) -> Self {
        Error::Fetch {
            identity,
            source: Box::new(source),
        }
    }

    pub fn malformed(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Malformed {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// The innermost error, skipping `Fetch` wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::Fetch { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::Forbidden(_) => ErrorKind::Forbidden,
            Error::Unavailable(_) => ErrorKind::Unavailable,
            Error::UnknownKind(_) => ErrorKind::UnknownKind,
            Error::Malformed { .. } => ErrorKind::Malformed,
            Error::Fetch { .. } => unreachable!("root() never returns a Fetch wrapper"),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<kube::Error> for Error {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) => match resp.code {
                404 => Error::NotFound(resp.message.clone()),
                401 => Error::Unauthorized(resp.message.clone()),
                403 => Error::Forbidden(resp.message.clone()),
                code => Error::Unavailable(format!("{} ({})", resp.message, code)),
            },
            other => Error::Unavailable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::malformed("document", err.to_string())
    }
}
