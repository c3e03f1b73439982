//! Depth-first repository traversal.
//!
//! [`RepoWalker::records`] yields one [`FileRecord`] per non-ignored file,
//! reading each file only when the iterator is advanced to it. Directories
//! are descended into but never tested against the ignore list; only file
//! paths relative to the root are.
//!
//! Entries are visited in file-name order within each directory, so an
//! unchanged tree always produces the same sequence.

use std::fs;
use std::io::Write;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::RepotextError;
use crate::ignore::IgnoreList;
use crate::output::OutputWriter;
use crate::Result;

/// A file accepted by the walker: its path relative to the root and its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub relative_path: PathBuf,
    pub contents: Vec<u8>,
}

/// Lifecycle of a single traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Created, nothing read yet
    Idle,
    /// Traversal in progress
    Walking,
    /// Every entry has been visited
    Done,
    /// An I/O error stopped the traversal; no further records are produced
    Failed,
}

/// Counts gathered over a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub files_written: usize,
    pub files_ignored: usize,
}

/// Walks a repository root, filtering files through an [`IgnoreList`].
#[derive(Debug)]
pub struct RepoWalker<'a> {
    root: PathBuf,
    ignore: &'a IgnoreList,
}

impl<'a> RepoWalker<'a> {
    pub fn new(root: impl AsRef<Path>, ignore: &'a IgnoreList) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ignore,
        }
    }

    /// Start a fresh traversal.
    pub fn records(&self) -> Records<'a> {
        Records {
            root: self.root.clone(),
            ignore: self.ignore,
            entries: None,
            state: WalkState::Idle,
            summary: WalkSummary::default(),
        }
    }

    /// Stream every accepted record into `out`.
    ///
    /// Each file is written before the next one is read. The first error
    /// aborts the walk; whatever was already written stays in the sink.
    pub fn walk_into<W: Write>(&self, out: &mut OutputWriter<W>) -> Result<WalkSummary> {
        let mut records = self.records();
        for record in records.by_ref() {
            out.write_record(&record?)?;
        }
        Ok(records.summary())
    }
}

/// Lazy, single-pass sequence of records produced by [`RepoWalker::records`].
pub struct Records<'a> {
    root: PathBuf,
    ignore: &'a IgnoreList,
    entries: Option<walkdir::IntoIter>,
    state: WalkState,
    summary: WalkSummary,
}

impl Records<'_> {
    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Files yielded and skipped so far.
    pub fn summary(&self) -> WalkSummary {
        self.summary
    }

    fn fail(&mut self, err: RepotextError) -> Option<Result<FileRecord>> {
        self.state = WalkState::Failed;
        self.entries = None;
        Some(Err(err))
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path.to_path_buf(),
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Result<FileRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            WalkState::Done | WalkState::Failed => return None,
            WalkState::Idle => {
                self.entries = Some(
                    WalkDir::new(&self.root)
                        .follow_links(false)
                        .sort_by_file_name()
                        .into_iter(),
                );
                self.state = WalkState::Walking;
            }
            WalkState::Walking => {}
        }

        loop {
            let next = self.entries.as_mut().and_then(|entries| entries.next());
            let entry = match next {
                None => {
                    self.state = WalkState::Done;
                    self.entries = None;
                    return None;
                }
                Some(Err(e)) => return self.fail(RepotextError::Walk(e)),
                Some(Ok(entry)) => entry,
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let relative_path = self.relative_path(entry.path());
            if self.ignore.is_ignored(&relative_path) {
                debug!("ignoring {}", relative_path.display());
                self.summary.files_ignored += 1;
                continue;
            }

            let contents = match fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(source) => {
                    return self.fail(RepotextError::FileRead {
                        path: entry.path().to_path_buf(),
                        source,
                    })
                }
            };

            self.summary.files_written += 1;
            return Some(Ok(FileRecord {
                relative_path,
                contents,
            }));
        }
    }
}

impl FusedIterator for Records<'_> {}
