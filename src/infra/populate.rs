//! Cache population
//!
//! [`CacheWriter`] owns the destination file of a cache entry and
//! [`tee_to_cache`] duplicates an origin body into it while handing the same
//! chunks to the client.
//!
//! Two write modes exist:
//!
//! - **In place** (default): the entry file is created (truncated) directly at
//!   its final path. A failed or interrupted copy leaves a truncated entry that
//!   later requests will serve as a hit, and a concurrent reader may observe a
//!   partially written file.
//! - **Atomic**: bytes go to a hidden sibling temp file which is renamed onto
//!   the entry path only after the origin body ended cleanly. Anything else
//!   deletes the temp file.

use std::error::Error as StdError;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::defaults;
use crate::error::CacheError;
use crate::infra::locks::Lease;

/// Open destination of one cache entry
#[derive(Debug)]
pub struct CacheWriter {
    /// Final entry path
    path: PathBuf,
    /// Open handle, to `path` or to the temp file
    file: File,
    /// Temp file in atomic mode, removed on drop unless persisted
    temp: Option<TempPath>,
    /// Bytes written so far
    written: u64,
    /// Set once the entry is complete
    finished: bool,
}

impl CacheWriter {
    /// Create the parent directories and open the destination for writing
    ///
    /// In place mode truncates any existing file at `path`. A failure after
    /// the directories were created leaves them behind.
    pub async fn create(path: &Path, atomic: bool) -> Result<Self, CacheError> {
        let parent = path.parent().ok_or_else(|| CacheError::NotAnEntry {
            uri: path.display().to_string(),
        })?;

        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CacheError::CreateDir {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;

        let (file, temp) = if atomic {
            let (file, temp) = create_temp_sibling(path, parent)?;
            (File::from_std(file), Some(temp))
        } else {
            let file = File::create(path)
                .await
                .map_err(|e| CacheError::CreateFile {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                })?;
            (file, None)
        };

        debug!(path = %path.display(), atomic, "writing cache entry");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            temp,
            written: 0,
            finished: false,
        })
    }

    /// Append a chunk to the entry
    ///
    /// Returns once the chunk has reached the file, not just tokio's buffer.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), CacheError> {
        let result = match self.file.write_all(chunk).await {
            Ok(()) => self.file.flush().await,
            Err(e) => Err(e),
        };
        result.map_err(|e| CacheError::WriteFile {
            path: self.path.clone(),
            error: e.to_string(),
        })?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush and close the entry, moving it into place in atomic mode
    pub async fn commit(mut self) -> Result<u64, CacheError> {
        self.file.flush().await.map_err(|e| CacheError::WriteFile {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        if let Some(temp) = self.temp.take() {
            temp.persist(&self.path).map_err(|e| CacheError::Commit {
                path: self.path.clone(),
                error: e.to_string(),
            })?;
        }

        self.finished = true;
        debug!(path = %self.path.display(), bytes = self.written, "cache entry complete");
        Ok(self.written)
    }
}

impl Drop for CacheWriter {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if self.temp.is_some() {
            debug!(path = %self.path.display(), bytes = self.written, "discarding partial cache entry");
        } else {
            warn!(
                path = %self.path.display(),
                bytes = self.written,
                "cache entry left incomplete"
            );
        }
    }
}

/// Hidden temp file next to `path`
///
/// The name is fixed length so it fits wherever the entry name itself fits.
fn create_temp_sibling(path: &Path, parent: &Path) -> Result<(std::fs::File, TempPath), CacheError> {
    let temp = tempfile::Builder::new()
        .prefix(defaults::PARTIAL_PREFIX)
        .suffix(defaults::PARTIAL_SUFFIX)
        .tempfile_in(parent)
        .map_err(|e| CacheError::CreateFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

    Ok(temp.into_parts())
}

struct Tee<S> {
    upstream: Pin<Box<S>>,
    writer: Option<CacheWriter>,
    _lease: Option<Lease>,
}

/// Stream `upstream` to the caller while writing every chunk to `writer`
///
/// Each chunk is written to the cache file before it is yielded, and the next
/// chunk is only pulled from `upstream` when the consumer polls again, so the
/// client's read rate paces the origin. The first upstream or file error ends
/// the stream with that error. A clean end of `upstream` commits the entry.
/// `lease` is released together with the stream.
pub fn tee_to_cache<S, E>(
    upstream: S,
    writer: CacheWriter,
    lease: Option<Lease>,
) -> impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    let state = Tee {
        upstream: Box::pin(upstream),
        writer: Some(writer),
        _lease: lease,
    };

    futures::stream::unfold(state, |mut state| async move {
        if state.writer.is_none() {
            return None;
        }

        match state.upstream.next().await {
            Some(Ok(chunk)) => {
                let written = match state.writer.as_mut() {
                    Some(writer) => writer.write_chunk(&chunk).await,
                    None => Ok(()),
                };
                match written {
                    Ok(()) => Some((Ok(chunk), state)),
                    Err(e) => {
                        warn!(error = %e, "cache write failed, aborting response");
                        state.writer = None;
                        Some((Err(io::Error::other(e)), state))
                    }
                }
            }
            Some(Err(e)) => {
                warn!(error = %e, "origin body failed mid-stream");
                state.writer = None;
                Some((Err(io::Error::other(e)), state))
            }
            None => {
                if let Some(writer) = state.writer.take() {
                    if let Err(e) = writer.commit().await {
                        warn!(error = %e, "failed to finish cache entry");
                    }
                }
                None
            }
        }
    })
}
