//! # managed-tempfile
//!
//! Provides the [`TempFile`] struct, a named temporary file whose lifecycle is managed by
//! its handle: the file gets a random, unguessable name, can be read and written like a
//! regular file, and is removed when the handle is disposed or dropped.
//!
//! ```
//! use managed_tempfile::{Builder, TempFile};
//! use std::io::Write;
//!
//! let mut file = Builder::new().mode("w").suffix(".txt").open().unwrap();
//! file.write_all(b"hello").unwrap();
//! file.close().unwrap();
//! assert!(!file.is_open());
//!
//! // The file outlives the stream; it is removed on disposal.
//! let path = file.file_path().to_path_buf();
//! assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
//!
//! drop(file);
//! assert!(!path.exists());
//! ```
//!
//! ## Features
//!
//! * `tokio` - Enables [`TempFile::into_async`], converting a handle into an `AsyncTempFile`
//!             backed by [`tokio::fs::File`](https://docs.rs/tokio/latest/tokio/fs/struct.File.html).

// Document crate features on docs.rs.
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "tokio")]
mod async_file;
mod builder;
mod errors;
mod mode;
mod random_name;
mod stream;
mod tempfile;

#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub use async_file::AsyncTempFile;
pub use builder::Builder;
pub use errors::Error;
pub use mode::{Mode, DEFAULT_MODE};
pub use stream::Buffering;
pub use tempfile::TempFile;
