//! High-level API: flatten a repository into one output file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::RepotextError;
use crate::ignore::IgnoreList;
use crate::output::{OutputWriter, Preamble};
use crate::walker::{RepoWalker, WalkSummary};
use crate::Result;

/// Output file used when none is given.
pub const DEFAULT_OUTPUT: &str = "output.txt";

/// Options for a single run.
///
/// Everything the run depends on is carried here; nothing is read from the
/// process environment.
#[derive(Debug, Clone)]
pub struct ConcatOptions {
    /// Root of the tree to flatten
    pub repo_path: PathBuf,
    /// Ignore file to load (`None` = ignore nothing)
    pub ignore_file: Option<PathBuf>,
    /// Preamble file (`None` = built-in preamble)
    pub preamble_file: Option<PathBuf>,
    /// Destination, created or truncated
    pub output_path: PathBuf,
}

impl ConcatOptions {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            ignore_file: None,
            preamble_file: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
        }
    }

    /// Set the ignore file, usually from [`crate::resolve_ignore_file`].
    pub fn ignore_file(mut self, path: Option<PathBuf>) -> Self {
        self.ignore_file = path;
        self
    }

    pub fn preamble(mut self, path: impl Into<PathBuf>) -> Self {
        self.preamble_file = Some(path.into());
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatSummary {
    pub output_path: PathBuf,
    pub ignore_file: Option<PathBuf>,
    pub files_written: usize,
    pub files_ignored: usize,
}

/// Flatten a repository into the configured output file.
///
/// Steps run in order and the first failure stops the run:
/// 1. Load the ignore file, if any
/// 2. Create the output file
/// 3. Write the preamble
/// 4. Walk the repository, writing one record per accepted file
/// 5. Write the end marker
///
/// The output file is closed on every path. Bytes written before a failure
/// are left in place.
pub fn concat_repository(options: &ConcatOptions) -> Result<ConcatSummary> {
    let ignore = match &options.ignore_file {
        Some(path) => IgnoreList::load(path)?,
        None => IgnoreList::new(),
    };

    let file =
        File::create(&options.output_path).map_err(|source| RepotextError::OutputCreate {
            path: options.output_path.clone(),
            source,
        })?;

    let preamble = match &options.preamble_file {
        Some(path) => Preamble::from_file(path)?,
        None => Preamble::Default,
    };

    let (_, walk) = concat_to_writer(
        &options.repo_path,
        &ignore,
        &preamble,
        BufWriter::new(file),
    )?;

    info!(
        "wrote {} files to {} ({} ignored)",
        walk.files_written,
        options.output_path.display(),
        walk.files_ignored
    );

    Ok(ConcatSummary {
        output_path: options.output_path.clone(),
        ignore_file: options.ignore_file.clone(),
        files_written: walk.files_written,
        files_ignored: walk.files_ignored,
    })
}

/// Flatten a repository onto an arbitrary sink and return it when done.
pub fn concat_to_writer<W: Write>(
    repo: &Path,
    ignore: &IgnoreList,
    preamble: &Preamble,
    sink: W,
) -> Result<(W, WalkSummary)> {
    let mut out = OutputWriter::new(sink);
    out.write_preamble(preamble)?;
    let summary = RepoWalker::new(repo, ignore).walk_into(&mut out)?;
    Ok((out.finish()?, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{DEFAULT_PREAMBLE, END_MARKER};
    use std::fs;
    use tempfile::tempdir;

    fn sep() -> &'static str {
        std::path::MAIN_SEPARATOR_STR
    }

    #[test]
    fn test_scenario_with_ignored_directory() {
        let repo = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        fs::write(repo.path().join("a.txt"), "hello").unwrap();
        fs::create_dir(repo.path().join("b")).unwrap();
        fs::write(repo.path().join("b/secret.key"), "x").unwrap();
        fs::write(repo.path().join(".gptignore"), "b/*\n.gptignore\n").unwrap();

        let output = out_dir.path().join("output.txt");
        let options = ConcatOptions::new(repo.path())
            .ignore_file(Some(repo.path().join(".gptignore")))
            .output(&output);

        let summary = concat_repository(&options).unwrap();
        let text = fs::read_to_string(&output).unwrap();

        assert_eq!(text, format!("{DEFAULT_PREAMBLE}----\na.txt\nhello\n--END--"));
        assert_eq!(summary.files_written, 1);
        assert_eq!(summary.files_ignored, 2);
    }

    #[test]
    fn test_empty_repository() {
        let repo = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        let output = out_dir.path().join("out.txt");

        concat_repository(&ConcatOptions::new(repo.path()).output(&output)).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            format!("{DEFAULT_PREAMBLE}--END--")
        );
    }

    #[test]
    fn test_custom_preamble_and_nested_paths() {
        let repo = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        fs::create_dir_all(repo.path().join("src/bin")).unwrap();
        fs::write(repo.path().join("src/bin/tool.rs"), "fn main() {}\n").unwrap();
        let preamble = out_dir.path().join("preamble.txt");
        fs::write(&preamble, "Context follows.").unwrap();
        let output = out_dir.path().join("out.txt");

        concat_repository(
            &ConcatOptions::new(repo.path())
                .preamble(&preamble)
                .output(&output),
        )
        .unwrap();

        let expected = format!(
            "Context follows.\n----\nsrc{0}bin{0}tool.rs\nfn main() {{}}\n\n--END--",
            sep()
        );
        assert_eq!(fs::read_to_string(&output).unwrap(), expected);
    }

    #[test]
    fn test_output_is_identical_across_runs() {
        let repo = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        fs::create_dir_all(repo.path().join("z/y")).unwrap();
        fs::write(repo.path().join("z/y/x.txt"), "x").unwrap();
        fs::write(repo.path().join("m.txt"), "m").unwrap();
        fs::write(repo.path().join("a.txt"), "a").unwrap();

        let first = out_dir.path().join("first.txt");
        let second = out_dir.path().join("second.txt");
        concat_repository(&ConcatOptions::new(repo.path()).output(&first)).unwrap();
        concat_repository(&ConcatOptions::new(repo.path()).output(&second)).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_end_marker_only_at_end() {
        let repo = tempdir().unwrap();
        fs::write(repo.path().join("a.rs"), "fn a() {}").unwrap();
        fs::write(repo.path().join("b.rs"), "fn b() {}").unwrap();

        let (bytes, _) = concat_to_writer(
            repo.path(),
            &IgnoreList::new(),
            &Preamble::Custom(b"p".to_vec()),
            Vec::new(),
        )
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.ends_with(END_MARKER));
        assert_eq!(text.matches(END_MARKER).count(), 1);
    }

    #[test]
    fn test_unreadable_ignore_file_is_error() {
        let repo = tempdir().unwrap();
        let out_dir = tempdir().unwrap();

        let result = concat_repository(
            &ConcatOptions::new(repo.path())
                .ignore_file(Some(repo.path().join("absent")))
                .output(out_dir.path().join("out.txt")),
        );

        assert!(matches!(result, Err(RepotextError::IgnoreFileRead { .. })));
    }

    #[test]
    fn test_missing_preamble_leaves_created_output() {
        let repo = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        let output = out_dir.path().join("out.txt");

        let result = concat_repository(
            &ConcatOptions::new(repo.path())
                .preamble(out_dir.path().join("absent.txt"))
                .output(&output),
        );

        assert!(matches!(result, Err(RepotextError::PreambleRead { .. })));
        assert!(output.exists());
    }

    #[test]
    fn test_output_in_missing_directory_is_error() {
        let repo = tempdir().unwrap();
        let out_dir = tempdir().unwrap();

        let result = concat_repository(
            &ConcatOptions::new(repo.path()).output(out_dir.path().join("no/such/out.txt")),
        );

        assert!(matches!(result, Err(RepotextError::OutputCreate { .. })));
    }

    #[test]
    fn test_missing_repository_is_error() {
        let out_dir = tempdir().unwrap();

        let result = concat_repository(
            &ConcatOptions::new(out_dir.path().join("gone"))
                .output(out_dir.path().join("out.txt")),
        );

        assert!(matches!(result, Err(RepotextError::Walk(_))));
    }
}
