use crate::stream::Stream;
use crate::{Builder, Error};
use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::io::{ErrorKind, IoSlice, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A named temporary file that is removed when disposed or dropped.
///
/// Reads, writes and seeks are forwarded to the owned stream. Once the stream
/// is closed, every forwarded operation fails.
pub struct TempFile {
    /// The path of the contained file.
    path: PathBuf,

    /// The open stream, or `None` if closed or created name-only.
    stream: Option<Stream>,

    /// If set, the file at `path` is removed on disposal.
    delete: bool,

    /// Set once cleanup ran, so that the file is removed at most once.
    disposed: bool,
}

impl TempFile {
    /// Creates a new temporary file in the default location using the
    /// default settings of [`Builder`].
    ///
    /// ## Example
    ///
    /// ```
    /// # use managed_tempfile::{TempFile, Error};
    /// let file = TempFile::new()?;
    ///
    /// // The file exists.
    /// let file_path = file.file_path().to_path_buf();
    /// assert!(file_path.is_file());
    ///
    /// // Deletes the file.
    /// drop(file);
    ///
    /// // The file was removed.
    /// assert!(!file_path.exists());
    /// # Ok::<(), Error>(())
    /// ```
    pub fn new() -> Result<Self, Error> {
        Builder::new().open()
    }

    /// Creates a new temporary file in the specified directory.
    ///
    /// ## Arguments
    ///
    /// * `dir` - The directory to create the file in.
    pub fn new_in<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        Builder::new().dir(dir).open()
    }

    pub(crate) fn from_parts(path: PathBuf, stream: Option<Stream>, delete: bool) -> Self {
        Self {
            path,
            stream,
            delete,
            disposed: false,
        }
    }

    /// Returns the path of the underlying temporary file.
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Returns the generated name, i.e. the full path of the file.
    pub fn name(&self) -> &Path {
        &self.path
    }

    /// Whether the file will be removed on disposal.
    pub fn delete_on_drop(&self) -> bool {
        self.delete
    }

    /// Returns `true` while the underlying stream exists and has not been closed.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns the underlying file while the stream is open.
    ///
    /// Writes buffered in the stream are not visible through this handle
    /// until [`flush`](Write::flush) is called.
    pub fn file(&self) -> Option<&File> {
        self.stream.as_ref().map(Stream::get_ref)
    }

    /// Mutable variant of [`file`](Self::file).
    pub fn file_mut(&mut self) -> Option<&mut File> {
        self.stream.as_mut().map(Stream::get_mut)
    }

    /// Flushes and closes the stream. Closing an already closed file does nothing.
    ///
    /// The file stays on disk; it is only removed on disposal.
    pub fn close(&mut self) -> Result<(), Error> {
        if let Some(stream) = self.stream.take() {
            debug!(path = %self.path.display(), "Closing temporary file");
            drop(stream.into_file()?);
        }
        Ok(())
    }

    /// Closes the stream and, if the delete flag is set, removes the file.
    ///
    /// Only the first call does anything. A file that no longer exists is not
    /// an error; any other failure to remove it is returned.
    ///
    /// ## Example
    ///
    /// ```
    /// # use managed_tempfile::{TempFile, Error};
    /// let mut file = TempFile::new()?;
    /// let path = file.file_path().to_path_buf();
    ///
    /// file.dispose()?;
    /// assert!(!path.exists());
    ///
    /// // Disposing twice is fine.
    /// file.dispose()?;
    /// # Ok::<(), Error>(())
    /// ```
    pub fn dispose(&mut self) -> Result<(), Error> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        // The handle must be closed first, otherwise the file might not be deleted.
        let closed = self.close();

        if self.delete {
            remove_if_present(&self.path)?;
        }
        closed
    }

    /// Hands the path, stream and delete flag to the async adapter.
    /// No cleanup runs for `self` afterwards.
    #[cfg(feature = "tokio")]
    pub(crate) fn take_parts(&mut self) -> (PathBuf, Option<Stream>, bool) {
        self.disposed = true;
        (self.path.clone(), self.stream.take(), self.delete)
    }

    fn stream_mut(&mut self) -> std::io::Result<&mut Stream> {
        self.stream.as_mut().ok_or_else(closed_file)
    }
}

/// The error forwarded operations fail with once the stream is gone.
pub(crate) fn closed_file() -> std::io::Error {
    std::io::Error::new(ErrorKind::Other, "I/O operation on closed file")
}

/// Removes `path`, treating a file that is already gone as success.
pub(crate) fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed temporary file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Runs the disposal that the owner did not run explicitly.
impl Drop for TempFile {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            warn!(path = %self.path.display(), "Failed to clean up temporary file: {}", e);
        }
    }
}

impl Debug for TempFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.path)
    }
}

/// Forwarding Read to the open stream
impl Read for TempFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stream_mut()?.read(buf)
    }
}

/// Forwarding Write to the open stream
impl Write for TempFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.stream_mut()?.write(buf)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> std::io::Result<usize> {
        self.stream_mut()?.write_vectored(bufs)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stream_mut()?.flush()
    }
}

/// Forwarding Seek to the open stream
impl Seek for TempFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.stream_mut()?.seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_operations_fail_after_close() {
        let mut file = TempFile::new().unwrap();
        file.write_all(b"data").unwrap();
        file.close().unwrap();

        assert!(!file.is_open());
        assert!(file.file().is_none());
        assert!(file.write(b"more").is_err());
        assert!(file.read(&mut [0u8; 4]).is_err());
        assert!(file.seek(SeekFrom::Start(0)).is_err());

        // Closing again is a no-op.
        file.close().unwrap();
    }

    #[test]
    fn close_flushes_buffered_writes() {
        let mut file = TempFile::new().unwrap();
        file.write_all(b"buffered").unwrap();
        file.close().unwrap();
        assert_eq!(std::fs::read(file.file_path()).unwrap(), b"buffered");
    }

    #[test]
    fn remove_if_present_tolerates_missing_file() {
        let path = std::env::temp_dir().join("managed-tempfile-does-not-exist");
        assert!(remove_if_present(&path).is_ok());
    }

    #[test]
    fn dispose_surfaces_other_removal_errors() {
        // A directory cannot be removed with remove_file.
        let dir = std::env::temp_dir().join(format!("mtf_dir_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut file = TempFile::from_parts(dir.clone(), None, true);
        assert!(matches!(file.dispose(), Err(Error::Io(_))));
        assert!(dir.is_dir());

        // Only the first disposal attempts the removal.
        assert!(file.dispose().is_ok());
        std::fs::remove_dir(&dir).unwrap();
    }
}
