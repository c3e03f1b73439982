//! # repotext
//!
//! A CLI tool that flattens a repository into a single text file.
//!
//! ## Overview
//!
//! repotext is built on top of repotextlib. It walks the given directory,
//! drops files matching the patterns in `.gptignore`, and writes every other
//! file as a `----` / path / contents record, closing the output with
//! `--END--`.
//!
//! ## Usage
//!
//! ```bash
//! # Write ./output.txt with the built-in preamble
//! repotext path/to/repo
//!
//! # Custom preamble and destination
//! repotext path/to/repo -p prompt.txt -o context.txt
//!
//! # See which files were skipped
//! RUST_LOG=debug repotext path/to/repo
//! ```
//!
//! ## Ignore file lookup
//!
//! `<repo>/.gptignore` is used when present, otherwise `.gptignore` next to
//! the repotext binary. With neither, every file is included.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgMatches, Command};
use console::style;
use repotextlib::{
    concat_repository, executable_dir, resolve_ignore_file, ConcatOptions, ConcatSummary,
    DEFAULT_OUTPUT,
};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("repotext")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Concatenate a repository into a single text file")
        .arg(
            Arg::new("path")
                .help("Root of the repository to concatenate")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("preamble")
                .short('p')
                .long("preamble")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("File written verbatim before the repository contents"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .default_value(DEFAULT_OUTPUT)
                .value_parser(value_parser!(PathBuf))
                .help("Destination file (created or truncated)"),
        )
}

/// Build run options from matches
fn build_options(matches: &ArgMatches) -> anyhow::Result<ConcatOptions> {
    let repo = matches
        .get_one::<PathBuf>("path")
        .ok_or_else(|| anyhow!("missing repository path"))?;
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let ignore_file =
        resolve_ignore_file(repo, executable_dir).context("could not locate ignore file")?;

    let mut options = ConcatOptions::new(repo)
        .ignore_file(ignore_file)
        .output(output);
    if let Some(preamble) = matches.get_one::<PathBuf>("preamble") {
        options = options.preamble(preamble);
    }
    Ok(options)
}

fn run(matches: &ArgMatches) -> anyhow::Result<ConcatSummary> {
    let options = build_options(matches)?;
    let summary = concat_repository(&options)
        .with_context(|| format!("could not process '{}'", options.repo_path.display()))?;
    Ok(summary)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = match build_command().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            // --help and --version come through here too
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&matches) {
        Ok(summary) => {
            println!(
                "Repository contents written to {}.",
                style(summary.output_path.display()).bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e:#}", style("Error:").for_stderr().red().bold());
            ExitCode::FAILURE
        }
    }
}
