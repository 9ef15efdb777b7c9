use crate::Error;
use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::str::FromStr;

/// The mode every temporary file is first created with.
pub const DEFAULT_MODE: &str = "w+b";

/// How the file is opened with respect to existing content.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
enum Access {
    /// `r`: open an existing file.
    Read,
    /// `w`: create or truncate.
    Write,
    /// `x`: create, failing if the file exists.
    Exclusive,
    /// `a`: create if missing, all writes go to the end.
    Append,
}

/// A parsed access mode such as `"r"`, `"w+b"` or `"a+t"`.
///
/// Text and binary modes behave identically on disk; the flag is kept so that
/// buffering rules that only apply to text streams can be checked.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct Mode {
    access: Access,
    update: bool,
    binary: bool,
}

impl Mode {
    /// Binary read-write with truncation, i.e. `"w+b"`.
    pub const fn read_write() -> Self {
        Self {
            access: Access::Write,
            update: true,
            binary: true,
        }
    }

    /// Whether the stream can be read from.
    pub fn is_readable(&self) -> bool {
        self.access == Access::Read || self.update
    }

    /// Whether the stream can be written to.
    pub fn is_writable(&self) -> bool {
        self.access != Access::Read || self.update
    }

    /// Whether the mode requested binary (`b`) rather than text I/O.
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Whether this is the mode the file is created with, so no reopen is needed.
    pub fn is_default_read_write(&self) -> bool {
        *self == Self::read_write()
    }

    /// Converts the mode into the matching [`OpenOptions`].
    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.is_readable()).write(self.is_writable());
        match self.access {
            Access::Read => {}
            Access::Write => {
                options.create(true).truncate(true);
            }
            Access::Exclusive => {
                options.create_new(true);
            }
            Access::Append => {
                options.append(true).create(true);
            }
        }
        options
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::read_write()
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMode(format!("invalid mode: '{}'", s));

        let mut access = None;
        let mut update = false;
        let mut binary = false;
        let mut text = false;

        for c in s.chars() {
            let (flag, seen) = match c {
                'r' | 'w' | 'x' | 'a' => {
                    if access.is_some() {
                        return Err(Error::InvalidMode(format!(
                            "must have exactly one of read/write/create/append mode: '{}'",
                            s
                        )));
                    }
                    access = Some(match c {
                        'r' => Access::Read,
                        'w' => Access::Write,
                        'x' => Access::Exclusive,
                        _ => Access::Append,
                    });
                    continue;
                }
                '+' => (&mut update, "+"),
                'b' => (&mut binary, "b"),
                't' => (&mut text, "t"),
                _ => return Err(invalid()),
            };
            if *flag {
                return Err(Error::InvalidMode(format!("duplicate '{}' in mode '{}'", seen, s)));
            }
            *flag = true;
        }

        if binary && text {
            return Err(Error::InvalidMode(format!(
                "can't have text and binary mode at once: '{}'",
                s
            )));
        }

        let access = access.ok_or_else(|| {
            Error::InvalidMode(format!(
                "must have exactly one of read/write/create/append mode: '{}'",
                s
            ))
        })?;

        Ok(Self {
            access,
            update,
            binary,
        })
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let access = match self.access {
            Access::Read => 'r',
            Access::Write => 'w',
            Access::Exclusive => 'x',
            Access::Append => 'a',
        };
        write!(f, "{}", access)?;
        if self.update {
            write!(f, "+")?;
        }
        if self.binary {
            write!(f, "b")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Mode {
        s.parse().unwrap()
    }

    #[test]
    fn default_mode_is_binary_read_write() {
        let mode = parse(DEFAULT_MODE);
        assert!(mode.is_default_read_write());
        assert!(mode.is_readable());
        assert!(mode.is_writable());
        assert!(mode.is_binary());
        assert_eq!(mode, Mode::default());
    }

    #[test]
    fn flag_order_does_not_matter() {
        assert_eq!(parse("b+w"), parse("w+b"));
        assert!(parse("+bw").is_default_read_write());
    }

    #[test]
    fn text_read_write_requires_reopen() {
        let mode = parse("w+");
        assert!(!mode.is_binary());
        assert!(!mode.is_default_read_write());
    }

    #[test]
    fn read_only_and_write_only() {
        let read = parse("r");
        assert!(read.is_readable());
        assert!(!read.is_writable());

        let write = parse("w");
        assert!(!write.is_readable());
        assert!(write.is_writable());

        let append = parse("ab");
        assert!(!append.is_readable());
        assert!(append.is_writable());
        assert!(parse("a+").is_readable());
    }

    #[test]
    fn open_options_follow_writability() {
        let path = std::env::temp_dir().join(format!("mtf_mode_{}", std::process::id()));
        let mut created = parse("w").open_options().open(&path).unwrap();
        std::io::Write::write_all(&mut created, b"abc").unwrap();
        drop(created);

        let mut read_only = parse("r").open_options().open(&path).unwrap();
        assert!(std::io::Write::write_all(&mut read_only, b"x").is_err());
        drop(read_only);

        let mut appended = parse("a").open_options().open(&path).unwrap();
        std::io::Write::write_all(&mut appended, b"def").unwrap();
        drop(appended);

        assert_eq!(std::fs::read(&path).unwrap(), b"abcdef");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn display_normalizes() {
        assert_eq!(parse("bw+").to_string(), "w+b");
        assert_eq!(parse("rt").to_string(), "r");
    }

    #[test]
    fn rejects_invalid_modes() {
        for bad in ["", "+", "b", "rw", "r++", "rbb", "rbt", "wz", "U"] {
            assert!(
                matches!(bad.parse::<Mode>(), Err(Error::InvalidMode(_))),
                "mode {:?} should be rejected",
                bad
            );
        }
    }
}
