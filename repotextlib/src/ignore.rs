//! Ignore-pattern loading and matching.
//!
//! Patterns use shell "doublestar" glob syntax: `*` and `?` never cross a
//! path separator, while a `**` path component spans any number of
//! directories. Character classes (`[a-z]`, `[^a]`), alternation
//! (`{png,jpg}`) and backslash escapes are supported. A `**` that is not a
//! whole path component behaves like `*`. A path is ignored when it matches
//! any pattern.
//!
//! Patterns that fail to compile never match anything. They are kept in the
//! list so [`IgnoreList::patterns`] still reflects the file as written.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

use globset::{GlobBuilder, GlobMatcher};
use log::debug;

use crate::error::RepotextError;
use crate::Result;

/// Name of the ignore file looked up in the repository and next to the binary.
pub const IGNORE_FILE_NAME: &str = ".gptignore";

/// An immutable, ordered set of ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    patterns: Vec<String>,
    compiled: Vec<Option<GlobMatcher>>,
}

impl IgnoreList {
    /// Create an empty list that ignores nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from patterns that are already in native-separator form.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let compiled = patterns.iter().map(|p| compile(p)).collect();
        Self { patterns, compiled }
    }

    /// Parse ignore-file contents, one pattern per line.
    ///
    /// Each line has its separators normalized and surrounding whitespace
    /// trimmed. Blank lines are kept as empty patterns.
    pub fn parse(contents: &str) -> Self {
        Self::from_patterns(
            contents
                .lines()
                .map(|line| normalize_separators(line).trim().to_string()),
        )
    }

    /// Load patterns from an ignore file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| RepotextError::IgnoreFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::parse(&String::from_utf8_lossy(&bytes));
        debug!(
            "loaded {} ignore patterns from {}",
            list.len(),
            path.display()
        );
        Ok(list)
    }

    /// The patterns in file order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check whether a path relative to the repository root is ignored.
    ///
    /// The path is matched on its raw bytes, so non-UTF-8 names are tested
    /// as they are on disk.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        self.compiled
            .iter()
            .flatten()
            .any(|matcher| matcher.is_match(relative))
    }

    /// Check a relative path given as a string.
    pub fn matches(&self, relative: &str) -> bool {
        self.is_ignored(Path::new(relative))
    }
}

fn compile(pattern: &str) -> Option<GlobMatcher> {
    // globset compares against `/`-separated candidates on every platform
    let pattern = if MAIN_SEPARATOR == '/' {
        Cow::Borrowed(pattern)
    } else {
        Cow::Owned(pattern.replace(MAIN_SEPARATOR, "/"))
    };
    let pattern = collapse_partial_double_stars(&pattern);

    match GlobBuilder::new(&pattern).literal_separator(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            debug!("ignore pattern '{pattern}' never matches: {e}");
            None
        }
    }
}

/// Rewrite every run of stars that is not a whole path component to `*`.
///
/// `a**b` and `**.rs` mean the same as `a*b` and `*.rs`; only `**` standing
/// alone between separators (or braces and commas) recurses. Escaped stars
/// are left alone.
fn collapse_partial_double_stars(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains("**") {
        return Cow::Borrowed(pattern);
    }

    let is_boundary = |c: Option<char>| matches!(c, None | Some('/' | '{' | '}' | ','));
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                out.extend(&chars[i..(i + 2).min(chars.len())]);
                i += 2;
            }
            '*' => {
                let start = i;
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                let before = start.checked_sub(1).map(|j| chars[j]);
                let after = chars.get(i).copied();
                if i - start > 1 && is_boundary(before) && is_boundary(after) {
                    out.push_str("**");
                } else {
                    out.push('*');
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Cow::Owned(out)
}

/// Rewrite `/` to the platform separator.
///
/// Ignore files are written with `/`; relative paths are produced with the
/// native separator. On platforms where those agree this is a no-op.
pub fn normalize_separators(pattern: &str) -> Cow<'_, str> {
    if MAIN_SEPARATOR == '/' || !pattern.contains('/') {
        Cow::Borrowed(pattern)
    } else {
        Cow::Owned(pattern.replace('/', MAIN_SEPARATOR_STR))
    }
}

/// Locate the ignore file for a repository.
///
/// Looks for `<repo>/.gptignore` first. Only when that is absent is
/// `fallback_dir` called, and `<fallback_dir>/.gptignore` tried. Returns
/// `None` when neither exists.
pub fn resolve_ignore_file<F>(repo: &Path, fallback_dir: F) -> Result<Option<PathBuf>>
where
    F: FnOnce() -> Result<PathBuf>,
{
    let local = repo.join(IGNORE_FILE_NAME);
    if local.exists() {
        debug!("using repository ignore file {}", local.display());
        return Ok(Some(local));
    }

    let fallback = fallback_dir()?.join(IGNORE_FILE_NAME);
    if fallback.exists() {
        debug!("using fallback ignore file {}", fallback.display());
        Ok(Some(fallback))
    } else {
        debug!("no ignore file found, nothing will be ignored");
        Ok(None)
    }
}

/// Directory containing the running executable.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(RepotextError::ExecutablePath)?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}
