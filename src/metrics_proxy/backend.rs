//! Backend targets and the capability to open a stream to them.

use std::future::Future;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixStream;

use crate::error::{HandlerError, ValidationError};

/// Block kind selecting the unix-socket backend.
pub const UNIX_BACKEND_KIND: &str = "uds";

/// A validated description of one backend target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSpec {
    /// Stream socket at an absolute filesystem path
    UnixSocket { path: PathBuf },
}

impl BackendSpec {
    /// Builds a unix-socket spec. Empty paths are not absolute either.
    pub fn unix_socket(path: impl Into<PathBuf>) -> Result<Self, ValidationError> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(ValidationError::RelativePath {
                path: path.display().to_string(),
            });
        }
        Ok(Self::UnixSocket { path })
    }

    /// Block kind name this backend is written under.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnixSocket { .. } => UNIX_BACKEND_KIND,
        }
    }

    /// Human-readable address for logs and errors.
    pub fn address(&self) -> String {
        match self {
            Self::UnixSocket { path } => path.display().to_string(),
        }
    }
}

/// Serialized form of the unix-socket backend: `{"path": "/abs/path"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnixBackend {
    pub path: String,
}

/// Something that can open a byte stream to a backend.
pub trait Backend: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Opens a fresh stream. No timeout is applied here.
    fn open(&self) -> impl Future<Output = Result<Self::Stream, HandlerError>> + Send;

    /// Address used in log fields.
    fn address(&self) -> String;
}

/// Client side of a local stream socket.
#[derive(Debug, Clone)]
pub struct UnixSocketBackend {
    path: PathBuf,
}

impl UnixSocketBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Backend for UnixSocketBackend {
    type Stream = UnixStream;

    async fn open(&self) -> Result<UnixStream, HandlerError> {
        UnixStream::connect(&self.path)
            .await
            .map_err(|source: io::Error| HandlerError::Dial {
                network: "unix",
                address: self.path.display().to_string(),
                source,
            })
    }

    fn address(&self) -> String {
        self.path.display().to_string()
    }
}

