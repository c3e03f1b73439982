//! # repotextlib
//!
//! Flattens a source tree into a single text stream for downstream consumers
//! such as language models.
//!
//! ## Overview
//!
//! The library has two moving parts:
//!
//! - **Ignore list**: glob patterns loaded from a `.gptignore` file. `*` and
//!   `?` stay within one path component, `**` crosses directories. A pattern
//!   that does not compile simply never matches.
//! - **Walker**: a depth-first traversal that tests each file's path relative
//!   to the root against the ignore list and yields the accepted files one at
//!   a time.
//!
//! Accepted files are framed as `----`, the relative path, then the raw bytes,
//! and the stream is closed with `--END--`.
//!
//! ## Example
//!
//! ```rust
//! use repotextlib::{concat_to_writer, IgnoreList, Preamble};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! fs::write(dir.path().join("a.txt"), "hello").unwrap();
//! fs::write(dir.path().join("debug.log"), "noise").unwrap();
//!
//! let ignore = IgnoreList::parse("*.log");
//! let preamble = Preamble::Custom(b"Repository:".to_vec());
//! let (bytes, summary) = concat_to_writer(dir.path(), &ignore, &preamble, Vec::new()).unwrap();
//!
//! assert_eq!(bytes, b"Repository:\n----\na.txt\nhello\n--END--");
//! assert_eq!(summary.files_ignored, 1);
//! ```

pub mod concat;
pub mod error;
pub mod ignore;
pub mod output;
pub mod walker;

pub use concat::{
    concat_repository, concat_to_writer, ConcatOptions, ConcatSummary, DEFAULT_OUTPUT,
};
pub use error::RepotextError;
pub use ignore::{
    executable_dir, normalize_separators, resolve_ignore_file, IgnoreList, IGNORE_FILE_NAME,
};
pub use output::{OutputWriter, Preamble, DEFAULT_PREAMBLE, END_MARKER, RECORD_DELIMITER};
pub use walker::{FileRecord, RepoWalker, Records, WalkState, WalkSummary};

/// Result type for repotextlib operations
pub type Result<T> = std::result::Result<T, RepotextError>;
