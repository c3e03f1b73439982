//! Output framing.
//!
//! The stream is laid out as:
//!
//! ```text
//! <preamble>
//! ----
//! <relative path>
//! <file bytes>
//! ----
//! ...
//! --END--
//! ```
//!
//! A custom preamble is followed by a single newline; the default preamble
//! already ends with one. Nothing is written after the end marker.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::RepotextError;
use crate::walker::FileRecord;
use crate::Result;

/// Line opening every file record.
pub const RECORD_DELIMITER: &str = "----";

/// Marker closing the stream.
pub const END_MARKER: &str = "--END--";

/// Preamble written when no preamble file is given.
pub const DEFAULT_PREAMBLE: &str = "The following text is a Git repository with code. \
The structure of the text are sections that begin with ----, followed by a single line \
containing the file path and file name, followed by a variable amount of lines containing \
the file contents. The text representing the Git repository ends when the symbols --END-- \
are encounted. Any further text beyond --END-- are meant to be interpreted as \
instructions using the aforementioned Git repository as context.\n";

/// Text placed before the first record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Preamble {
    #[default]
    Default,
    Custom(Vec<u8>),
}

impl Preamble {
    /// Read a preamble file verbatim.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        fs::read(path)
            .map(Preamble::Custom)
            .map_err(|source| RepotextError::PreambleRead {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Writes a framed stream onto any byte sink.
#[derive(Debug)]
pub struct OutputWriter<W: Write> {
    inner: W,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_preamble(&mut self, preamble: &Preamble) -> Result<()> {
        match preamble {
            Preamble::Default => self.write(DEFAULT_PREAMBLE.as_bytes()),
            Preamble::Custom(bytes) => {
                self.write(bytes)?;
                self.write(b"\n")
            }
        }
    }

    pub fn write_record(&mut self, record: &FileRecord) -> Result<()> {
        self.write(RECORD_DELIMITER.as_bytes())?;
        self.write(b"\n")?;
        self.write(&path_bytes(&record.relative_path))?;
        self.write(b"\n")?;
        self.write(&record.contents)?;
        self.write(b"\n")
    }

    /// Write the end marker, flush, and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.write(END_MARKER.as_bytes())?;
        self.inner.flush().map_err(RepotextError::OutputWrite)?;
        Ok(self.inner)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(RepotextError::OutputWrite)
    }
}

/// The bytes of a path as stored by the OS.
#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn record(path: &str, contents: &str) -> FileRecord {
        FileRecord {
            relative_path: PathBuf::from(path),
            contents: contents.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_default_preamble_then_end_marker() {
        let mut out = OutputWriter::new(Vec::new());
        out.write_preamble(&Preamble::Default).unwrap();

        let bytes = out.finish().unwrap();

        assert_eq!(bytes, format!("{DEFAULT_PREAMBLE}--END--").into_bytes());
    }

    #[test]
    fn test_custom_preamble_gets_one_newline() {
        let mut out = OutputWriter::new(Vec::new());
        out.write_preamble(&Preamble::Custom(b"Read this.".to_vec()))
            .unwrap();
        out.write_record(&record("a.txt", "hello")).unwrap();

        let bytes = out.finish().unwrap();

        assert_eq!(bytes, b"Read this.\n----\na.txt\nhello\n--END--");
    }

    #[test]
    fn test_records_are_framed_in_order() {
        let mut out = OutputWriter::new(Vec::new());
        out.write_record(&record("one", "1\n")).unwrap();
        out.write_record(&record("two", "")).unwrap();

        let bytes = out.finish().unwrap();

        assert_eq!(bytes, b"----\none\n1\n\n----\ntwo\n\n--END--");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_written_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut out = OutputWriter::new(Vec::new());
        out.write_record(&FileRecord {
            relative_path: PathBuf::from(OsStr::from_bytes(b"caf\xe9.txt")),
            contents: b"x".to_vec(),
        })
        .unwrap();

        let bytes = out.finish().unwrap();

        assert_eq!(bytes, b"----\ncaf\xe9.txt\nx\n--END--");
    }

    #[test]
    fn test_default_preamble_text() {
        assert!(DEFAULT_PREAMBLE.starts_with("The following text is a Git repository with code."));
        assert!(DEFAULT_PREAMBLE.contains("ends when the symbols --END-- are encounted."));
        assert!(DEFAULT_PREAMBLE.ends_with("as context.\n"));
    }

    #[test]
    fn test_preamble_from_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("preamble.txt");
        fs::write(&path, "custom\n").unwrap();

        let preamble = Preamble::from_file(&path).unwrap();

        assert_eq!(preamble, Preamble::Custom(b"custom\n".to_vec()));
    }

    #[test]
    fn test_missing_preamble_file() {
        let temp = tempdir().unwrap();

        let result = Preamble::from_file(temp.path().join("absent.txt"));

        assert!(matches!(result, Err(RepotextError::PreambleRead { .. })));
    }

    #[test]
    fn test_write_failure_is_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut out = OutputWriter::new(Broken);
        let result = out.write_preamble(&Preamble::Default);

        assert!(matches!(result, Err(RepotextError::OutputWrite(_))));
    }
}
