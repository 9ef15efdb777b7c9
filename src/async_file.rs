use crate::tempfile::{closed_file, remove_if_present};
use crate::{Error, TempFile};
use std::fmt::{Debug, Formatter};
use std::io::{IoSlice, SeekFrom};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite, ReadBuf};
use tracing::{debug, warn};

/// An asynchronous view of a [`TempFile`], backed by `tokio::fs`.
///
/// Obtained through [`TempFile::into_async`]. The name and delete flag carry over.
pub struct AsyncTempFile {
    path: PathBuf,
    file: Option<File>,
    delete: bool,
    disposed: bool,
}

impl TempFile {
    /// Converts an open temporary file into an [`AsyncTempFile`].
    ///
    /// Buffered writes are flushed first. Fails with [`Error::NotOpen`] if the
    /// stream was closed or the file was created name-only; the handle is then
    /// dropped and cleaned up as usual.
    ///
    /// ## Example
    ///
    /// ```
    /// # use managed_tempfile::{TempFile, Error};
    /// # use tokio::io::AsyncWriteExt;
    /// # let rt = tokio::runtime::Runtime::new().unwrap();
    /// # rt.block_on(async {
    /// let mut file = TempFile::new()?.into_async()?;
    /// file.write_all(b"hello").await?;
    /// file.flush().await?;
    ///
    /// let path = file.file_path().to_path_buf();
    /// assert_eq!(tokio::fs::read(&path).await?, b"hello");
    ///
    /// file.dispose().await?;
    /// assert!(!path.exists());
    /// # Ok::<(), Error>(())
    /// # }).unwrap();
    /// ```
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    pub fn into_async(mut self) -> Result<AsyncTempFile, Error> {
        if !self.is_open() {
            return Err(Error::NotOpen);
        }
        let (path, stream, delete) = self.take_parts();
        let file = match stream.map(|stream| stream.into_file()).transpose() {
            Ok(file) => file,
            Err(e) => {
                if delete {
                    if let Err(e) = remove_if_present(&path) {
                        warn!(path = %path.display(), "Failed to clean up temporary file: {}", e);
                    }
                }
                return Err(e.into());
            }
        };
        Ok(AsyncTempFile {
            path,
            file: file.map(File::from_std),
            delete,
            disposed: false,
        })
    }
}

impl AsyncTempFile {
    /// Returns the path of the underlying temporary file.
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    pub fn delete_on_drop(&self) -> bool {
        self.delete
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Returns the underlying file while open.
    pub fn file(&self) -> Option<&File> {
        self.file.as_ref()
    }

    /// Closes the file handle. The file stays on disk until disposal.
    pub async fn close(&mut self) -> Result<(), Error> {
        if let Some(mut file) = self.file.take() {
            debug!(path = %self.path.display(), "Closing temporary file");
            // Waits for in-flight writes of the tokio file to land.
            tokio::io::AsyncWriteExt::flush(&mut file).await?;
        }
        Ok(())
    }

    /// Asynchronously closes the file and removes it if the delete flag is set.
    /// Only the first call has an effect; a missing file is not an error.
    pub async fn dispose(&mut self) -> Result<(), Error> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        let closed = self.close().await;
        if self.delete {
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => debug!(path = %self.path.display(), "Removed temporary file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        closed
    }

    fn file_mut(&mut self) -> std::io::Result<&mut File> {
        self.file.as_mut().ok_or_else(closed_file)
    }
}

/// Falls back to blocking removal if [`AsyncTempFile::dispose`] was not awaited.
impl Drop for AsyncTempFile {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        // Closing the file handle first, as otherwise the file might not be deleted.
        drop(self.file.take());

        if self.delete {
            if let Err(e) = remove_if_present(&self.path) {
                warn!(path = %self.path.display(), "Failed to clean up temporary file: {}", e);
            }
        }
    }
}

impl Debug for AsyncTempFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.path)
    }
}

/// Forwarding AsyncWrite to the embedded File
impl AsyncWrite for AsyncTempFile {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        match self.file_mut() {
            Ok(file) => Pin::new(file).poll_write(cx, buf),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn poll_flush(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        match self.file_mut() {
            Ok(file) => Pin::new(file).poll_flush(cx),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        match self.file_mut() {
            Ok(file) => Pin::new(file).poll_shutdown(cx),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[IoSlice<'_>],
    ) -> Poll<Result<usize, std::io::Error>> {
        match self.file_mut() {
            Ok(file) => Pin::new(file).poll_write_vectored(cx, bufs),
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}

/// Forwarding AsyncRead to the embedded File
impl AsyncRead for AsyncTempFile {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.file_mut() {
            Ok(file) => Pin::new(file).poll_read(cx, buf),
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}

/// Forwarding AsyncSeek to the embedded File
impl AsyncSeek for AsyncTempFile {
    fn start_seek(mut self: Pin<&mut Self>, position: SeekFrom) -> std::io::Result<()> {
        Pin::new(self.file_mut()?).start_seek(position)
    }

    fn poll_complete(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<u64>> {
        match self.file_mut() {
            Ok(file) => Pin::new(file).poll_complete(cx),
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}
