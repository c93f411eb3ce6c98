//! Local file delivery.
//!
//! # Responsibilities
//! - Resolve a decoded file name against the document root
//! - Answer 404 for anything that cannot be opened as a regular file
//! - Stream found files with an exact `Content-Length`
//!
//! # Design Decisions
//! - Bodies are streamed in bounded chunks, never fully buffered
//! - Once the head is written, a failure aborts the connection instead of
//!   emitting a second status line
//! - Confinement to the root is optional; the default resolves paths as given

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::StatusCode;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::{FileConfig, TimeoutConfig};
use crate::http::content_type::ContentType;
use crate::http::response::{ResponseHead, NOT_FOUND};
use crate::resilience::with_deadline;

/// Bytes read from disk per write to the client.
const CHUNK_SIZE: usize = 64 * 1024;

/// Failures while serving a local file.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("client went away: {0}")]
    ClientGone(#[source] io::Error),

    #[error("failed reading {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} shrank while being served ({sent} of {expected} bytes)", .path.display())]
    Truncated {
        path: PathBuf,
        sent: u64,
        expected: u64,
    },
}

/// What a completed local request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeOutcome {
    Served { content_type: ContentType, bytes: u64 },
    NotFound,
}

impl ServeOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeOutcome::Served { .. } => StatusCode::OK,
            ServeOutcome::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Serves files below a document root.
#[derive(Debug, Clone)]
pub struct FileServer {
    root: PathBuf,
    confine_to_root: bool,
    write_timeout: Option<Duration>,
}

impl FileServer {
    pub fn new(files: &FileConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            root: files.root.clone(),
            confine_to_root: files.confine_to_root,
            write_timeout: timeouts.client_write(),
        }
    }

    /// Map a file name to a path, or `None` if it escapes a confined root.
    pub async fn resolve(&self, name: &str) -> Option<PathBuf> {
        let path = self.root.join(name);
        if !self.confine_to_root {
            return Some(path);
        }

        let root = tokio::fs::canonicalize(&self.root).await.ok()?;
        let resolved = tokio::fs::canonicalize(&path).await.ok()?;
        if resolved.starts_with(&root) {
            Some(resolved)
        } else {
            tracing::warn!(name = %name, "Rejected path outside document root");
            None
        }
    }

    /// Write a complete response for `name` to `client`.
    pub async fn serve<W>(&self, client: &mut W, name: &str) -> Result<ServeOutcome, ServeError>
    where
        W: AsyncWrite + Unpin,
    {
        let Some(path) = self.resolve(name).await else {
            return self.not_found(client).await;
        };

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "File not opened");
                return self.not_found(client).await;
            }
        };
        let metadata = file.metadata().await.map_err(|source| ServeError::FileRead {
            path: path.clone(),
            source,
        })?;
        if !metadata.is_file() {
            return self.not_found(client).await;
        }

        let length = metadata.len();
        let content_type = ContentType::for_name(name);
        tracing::debug!(
            path = %path.display(),
            content_type = %content_type,
            length,
            "Serving from local filesystem"
        );

        self.write(client, &ResponseHead::ok(content_type, length).encode())
            .await?;
        let sent = self.stream_body(client, file, &path, length).await?;

        Ok(ServeOutcome::Served {
            content_type,
            bytes: sent,
        })
    }

    async fn not_found<W>(&self, client: &mut W) -> Result<ServeOutcome, ServeError>
    where
        W: AsyncWrite + Unpin,
    {
        self.write(client, NOT_FOUND).await?;
        Ok(ServeOutcome::NotFound)
    }

    async fn stream_body<W, R>(
        &self,
        client: &mut W,
        body: R,
        path: &Path,
        length: u64,
    ) -> Result<u64, ServeError>
    where
        W: AsyncWrite + Unpin,
        R: AsyncRead + Unpin,
    {
        // Never send more than the advertised length, even if the file grew.
        let mut body = body.take(length);
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut sent = 0u64;

        loop {
            let n = body
                .read(&mut buf)
                .await
                .map_err(|source| ServeError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })?;
            if n == 0 {
                break;
            }
            self.write(client, &buf[..n]).await?;
            sent += n as u64;
        }

        if sent < length {
            return Err(ServeError::Truncated {
                path: path.to_path_buf(),
                sent,
                expected: length,
            });
        }

        with_deadline(self.write_timeout, client.flush())
            .await
            .map_err(ServeError::ClientGone)?;
        Ok(sent)
    }

    async fn write<W>(&self, client: &mut W, bytes: &[u8]) -> Result<(), ServeError>
    where
        W: AsyncWrite + Unpin,
    {
        with_deadline(self.write_timeout, client.write_all(bytes))
            .await
            .map_err(ServeError::ClientGone)
    }
}
