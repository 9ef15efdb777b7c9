use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    /// The access mode string could not be parsed, or conflicts with the buffering setting.
    InvalidMode(String),
    /// The operation requires an open stream, but the handle is closed or name-only.
    NotOpen,
    /// An I/O error occurred.
    Io(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMode(reason) => write!(f, "Invalid mode: {}", reason),
            Self::NotOpen => write!(f, "The temporary file has no open stream"),
            Self::Io(e) => Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
