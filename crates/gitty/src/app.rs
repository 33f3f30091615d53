// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Subcommand execution

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use gitty_git::{BlockReader, DetailSource, GitCli, GitError, GitRepo, ReferenceSet};
use gitty_graph::{CommitGraph, GraphRow, Traversal};
use tracing::{debug, info};

use crate::config::{Command, Config, LogArgs, OutputFormat, ShowArgs};
use crate::render::{TextRenderer, detail_text};

/// Run the configured subcommand, writing to stdout
///
/// # Errors
///
/// Returns an error if the repository cannot be opened, git cannot be
/// started, or output cannot be written.
pub fn run(config: &Config) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match config.effective_command() {
        Command::Log(args) => {
            log(config, &args, &mut out)?;
        }
        Command::Show(args) => show(config, &args, &mut out)?,
    }
    Ok(())
}

/// Print the commit graph; returns the number of rows written
///
/// # Errors
///
/// Returns an error if the history cannot be opened or a row cannot be
/// written.
pub fn log<W: Write>(config: &Config, args: &LogArgs, out: &mut W) -> Result<usize> {
    let repo_path = config
        .repo_path()
        .context("Cannot determine the current directory")?;
    let renderer = TextRenderer::new(args.palette_size, args.color.enabled());

    let Some(input) = &args.input else {
        let repo = GitRepo::discover(&repo_path)
            .with_context(|| format!("Not inside a git repository: {}", repo_path.display()))?;
        let mut graph =
            CommitGraph::new(GitCli::new(repo.command_dir())).with_options(args.layout_options());
        if args.no_refs {
            graph = graph.without_references();
        }
        info!(repo = %repo.command_dir().display(), "Laying out history");
        let traversal = graph.traverse().context("Failed to start git rev-list")?;
        return print_traversal(traversal, args, &renderer, out);
    };

    let reader: Box<dyn BufRead> = if args.reads_stdin() {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(input)
            .with_context(|| format!("Failed to open {}", input.display()))?;
        Box::new(BufReader::new(file))
    };
    let references = if args.no_refs {
        ReferenceSet::new()
    } else {
        nearby_references(&repo_path)
    };
    let traversal = Traversal::new(BlockReader::new(reader), references, args.layout_options());
    print_traversal(traversal, args, &renderer, out)
}

/// Decorations from the repository around `path`, if there is one
fn nearby_references(path: &Path) -> ReferenceSet {
    match GitRepo::discover(path) {
        Ok(repo) => ReferenceSet::resolve(&GitCli::new(repo.command_dir())),
        Err(err) => {
            debug!(error = %err, "No repository to decorate captured history");
            ReferenceSet::new()
        }
    }
}

/// Print rows from a traversal, honouring `--limit` and `--format`
///
/// # Errors
///
/// Returns an error if a row cannot be serialized or written.
pub fn print_traversal<B, W>(
    mut traversal: Traversal<B>,
    args: &LogArgs,
    renderer: &TextRenderer,
    out: &mut W,
) -> Result<usize>
where
    B: Iterator<Item = Result<String, GitError>>,
    W: Write,
{
    let limit = args.limit.unwrap_or(usize::MAX);
    let written = write_rows(traversal.by_ref().take(limit), args.format, renderer, out)?;

    if traversal.is_finished() {
        let unreached = traversal.unreached();
        if !unreached.is_empty() {
            info!(
                count = unreached.len(),
                "History ends at parents that were never listed"
            );
        }
    } else {
        debug!(rows = written, "Stopped before the end of history");
    }
    Ok(written)
}

/// Write rows one per line, stopping quietly if the reader goes away
///
/// # Errors
///
/// Returns an error if a row cannot be serialized or written.
pub fn write_rows<I, W>(
    rows: I,
    format: OutputFormat,
    renderer: &TextRenderer,
    out: &mut W,
) -> Result<usize>
where
    I: Iterator<Item = GraphRow>,
    W: Write,
{
    let mut written = 0;
    for row in rows {
        let line = match format {
            OutputFormat::Text => renderer.render(&row),
            OutputFormat::Json => row.to_json_line()?,
        };
        if !still_open(writeln!(out, "{line}"))? {
            return Ok(written);
        }
        written += 1;
    }
    still_open(out.flush())?;
    Ok(written)
}

/// `Ok(false)` when the consumer closed the pipe (`gitty | head`)
fn still_open(result: io::Result<()>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            debug!("Output closed by reader");
            Ok(false)
        }
        Err(err) => Err(err).context("Failed to write output"),
    }
}

/// Print one commit's detail
///
/// # Errors
///
/// Returns an error if the repository or commit cannot be found.
pub fn show<W: Write>(config: &Config, args: &ShowArgs, out: &mut W) -> Result<()> {
    let repo_path = config
        .repo_path()
        .context("Cannot determine the current directory")?;
    let repo = GitRepo::discover(&repo_path)
        .with_context(|| format!("Not inside a git repository: {}", repo_path.display()))?;
    let detail = repo
        .commit_detail(&args.commit, args.parent.as_deref())
        .with_context(|| format!("Failed to load commit {}", args.commit))?;

    let text = match args.format {
        OutputFormat::Text => detail_text(&detail),
        OutputFormat::Json => format!("{}\n", serde_json::to_string(&detail)?),
    };
    still_open(out.write_all(text.as_bytes()))?;
    still_open(out.flush())?;
    Ok(())
}
