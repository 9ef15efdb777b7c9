use crate::random_name::RandomName;
use crate::stream::{Buffering, Stream};
use crate::{Error, Mode, TempFile};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FILE_PREFIX: &str = "tmp";

/// Configures and creates a [`TempFile`].
///
/// ## Example
///
/// ```
/// # use managed_tempfile::{Builder, Error};
/// # use std::io::Write;
/// let dir = std::env::temp_dir();
/// let mut file = Builder::new()
///     .prefix("report_")
///     .suffix(".txt")
///     .mode("w")
///     .dir(&dir)
///     .open()?;
///
/// let name = file.file_path().file_name().unwrap().to_str().unwrap();
/// assert!(name.starts_with("report_"));
/// assert!(name.ends_with(".txt"));
/// assert!(file.file_path().starts_with(&dir));
///
/// file.write_all(b"hello")?;
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    mode: Option<String>,
    buffering: Buffering,
    prefix: String,
    suffix: String,
    dir: Option<PathBuf>,
    delete: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            mode: Some(crate::DEFAULT_MODE.to_string()),
            buffering: Buffering::Default,
            prefix: FILE_PREFIX.to_string(),
            suffix: String::new(),
            dir: None,
            delete: true,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access mode the stream is opened with, e.g. `"w"`, `"r+b"` or `"a"`.
    pub fn mode<M: Into<String>>(&mut self, mode: M) -> &mut Self {
        self.mode = Some(mode.into());
        self
    }

    /// Only generates a name; no file is created and no stream is opened.
    pub fn name_only(&mut self) -> &mut Self {
        self.mode = None;
        self
    }

    pub fn buffering(&mut self, buffering: Buffering) -> &mut Self {
        self.buffering = buffering;
        self
    }

    pub fn prefix<S: Into<String>>(&mut self, prefix: S) -> &mut Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix<S: Into<String>>(&mut self, suffix: S) -> &mut Self {
        self.suffix = suffix.into();
        self
    }

    /// Sets the directory to create the file in. Defaults to [`std::env::temp_dir`].
    pub fn dir<P: AsRef<Path>>(&mut self, dir: P) -> &mut Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Whether the file is removed on disposal. Defaults to `true`.
    pub fn delete(&mut self, delete: bool) -> &mut Self {
        self.delete = delete;
        self
    }

    /// Generates a unique name and creates the file.
    ///
    /// The file is always created in binary read-write mode first. If another
    /// mode was requested, that handle is closed and the path is reopened with it.
    pub fn open(&self) -> Result<TempFile, Error> {
        // Validate before touching the filesystem.
        let mode = self.mode.as_deref().map(str::parse::<Mode>).transpose()?;
        if let Some(mode) = &mode {
            self.buffering.validate(mode)?;
        }

        let dir = self.resolve_dir()?;
        let name = RandomName::new(&self.prefix, &self.suffix);
        let path = dir.join(name.as_ref());

        let mode = match mode {
            Some(mode) => mode,
            None => {
                debug!(path = %path.display(), "Reserved temporary file name");
                return Ok(TempFile::from_parts(path, None, self.delete));
            }
        };

        let mut file = Mode::read_write().open_options().open(&path)?;
        debug!(path = %path.display(), "Created temporary file");

        if !mode.is_default_read_write() {
            drop(file);
            debug!(path = %path.display(), %mode, "Reopening temporary file");
            file = match mode.open_options().open(&path) {
                Ok(file) => file,
                Err(e) => {
                    self.discard(&path);
                    return Err(e.into());
                }
            };
        }

        let stream = Stream::new(file, self.buffering);
        Ok(TempFile::from_parts(path, Some(stream), self.delete))
    }

    /// Removes a file created by a failed `open`, honoring the delete flag.
    fn discard(&self, path: &Path) {
        if self.delete {
            if let Err(e) = crate::tempfile::remove_if_present(path) {
                warn!(path = %path.display(), "Failed to clean up temporary file: {}", e);
            }
        }
    }

    fn resolve_dir(&self) -> Result<PathBuf, Error> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => std::env::temp_dir(),
        };
        if dir.is_absolute() {
            Ok(dir)
        } else {
            Ok(std::env::current_dir()?.join(dir))
        }
    }
}
