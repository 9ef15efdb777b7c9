use crate::{Error, Mode};
use std::fs::File;
use std::io::{BufWriter, IoSlice, LineWriter, Read, Seek, SeekFrom, Write};

/// Buffering applied to writes on the open stream.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default)]
pub enum Buffering {
    /// Block buffering with the standard library's default capacity.
    #[default]
    Default,
    /// Every write goes straight to the file. Not allowed for text modes.
    Unbuffered,
    /// Writes are flushed whenever a newline is written.
    LineBuffered,
    /// Block buffering with the given capacity in bytes.
    Capacity(usize),
}

/// The owned stream behind a [`TempFile`](crate::TempFile).
///
/// Reads always go to the file directly; pending writes are flushed first.
pub(crate) enum Stream {
    Direct(File),
    Buffered(BufWriter<File>),
    Line(LineWriter<File>),
}

impl Buffering {
    /// Checks that this buffering can be combined with `mode`.
    pub(crate) fn validate(&self, mode: &Mode) -> Result<(), Error> {
        if *self == Buffering::Unbuffered && !mode.is_binary() {
            return Err(Error::InvalidMode(
                "can't have unbuffered text I/O".to_string(),
            ));
        }
        Ok(())
    }
}

impl Stream {
    /// Wraps `file`; the buffering must already be validated against the mode.
    pub fn new(file: File, buffering: Buffering) -> Self {
        match buffering {
            Buffering::Unbuffered => Self::Direct(file),
            Buffering::Default => Self::Buffered(BufWriter::new(file)),
            Buffering::Capacity(capacity) => {
                Self::Buffered(BufWriter::with_capacity(capacity, file))
            }
            Buffering::LineBuffered => Self::Line(LineWriter::new(file)),
        }
    }

    pub fn get_ref(&self) -> &File {
        match self {
            Self::Direct(file) => file,
            Self::Buffered(writer) => writer.get_ref(),
            Self::Line(writer) => writer.get_ref(),
        }
    }

    pub fn get_mut(&mut self) -> &mut File {
        match self {
            Self::Direct(file) => file,
            Self::Buffered(writer) => writer.get_mut(),
            Self::Line(writer) => writer.get_mut(),
        }
    }

    /// Flushes pending writes and hands out the bare file.
    pub fn into_file(self) -> std::io::Result<File> {
        match self {
            Self::Direct(file) => Ok(file),
            Self::Buffered(writer) => writer.into_inner().map_err(|e| e.into_error()),
            Self::Line(writer) => writer.into_inner().map_err(|e| e.into_error()),
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Direct(file) => file,
            Self::Buffered(writer) => writer,
            Self::Line(writer) => writer,
        }
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.flush()?;
        self.get_mut().read(buf)
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> std::io::Result<usize> {
        self.writer().write_vectored(bufs)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer().flush()
    }
}

impl Seek for Stream {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.flush()?;
        self.get_mut().seek(pos)
    }
}
