//! Configuration for the gitty command line
//!
//! This module provides the clap-derived configuration: repository location,
//! logging verbosity, and the options of the `log` and `show` subcommands.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use gitty_graph::{LaneAllocation, LayoutOptions};

use crate::render::PALETTE;

/// Gitty - streaming commit graph viewer
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "gitty")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Config {
    /// Subcommand to run (defaults to `log`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `log` subcommand
    #[command(flatten)]
    pub log: LogArgs,

    /// Path inside the repository to inspect
    ///
    /// Defaults to the current working directory. Parent directories are
    /// searched for the repository.
    #[arg(short = 'C', long, env = "GITTY_REPO", global = true)]
    pub repo: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with the rows.
    #[arg(short, long, default_value = "false", global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false", global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the commit graph, newest commits first
    Log(LogArgs),

    /// Show the full detail of one commit
    ///
    /// Example:
    ///   gitty show HEAD~2 --parent HEAD~5
    Show(ShowArgs),
}

/// Options of the `log` subcommand
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LogArgs {
    /// Stop after this many rows
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// How fresh lanes are chosen
    #[arg(long, value_enum, default_value_t = LanePolicy::Monotonic)]
    pub lanes: LanePolicy,

    /// Number of distinct lane colors
    #[arg(long, default_value_t = 8)]
    pub palette_size: u32,

    /// When to color the graph
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Read captured `git rev-list --parents --all --header --topo-order`
    /// output from a file (`-` for stdin) instead of running git
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Do not list references
    #[arg(long, default_value = "false")]
    pub no_refs: bool,
}

impl Default for LogArgs {
    fn default() -> Self {
        Self {
            limit: None,
            format: OutputFormat::Text,
            lanes: LanePolicy::Monotonic,
            palette_size: 8,
            color: ColorMode::Auto,
            input: None,
            no_refs: false,
        }
    }
}

impl LogArgs {
    /// Layout options selected on the command line
    #[must_use]
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions::default().with_lanes(self.lanes.into())
    }

    /// Whether `--input` names stdin
    #[must_use]
    pub fn reads_stdin(&self) -> bool {
        self.input.as_deref() == Some(Path::new("-"))
    }
}

/// Options of the `show` subcommand
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ShowArgs {
    /// Commit to show (SHA, branch, tag, `HEAD~2`, ...)
    pub commit: String,

    /// Diff against this commit instead of the first parent
    #[arg(long)]
    pub parent: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Row output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Graph glyphs followed by the commit summary
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Lane allocation policy as spelled on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanePolicy {
    /// Never reuse a lane
    #[default]
    Monotonic,
    /// Reuse lanes next to the parent most recently placed
    FollowParent,
}

impl From<LanePolicy> for LaneAllocation {
    fn from(policy: LanePolicy) -> Self {
        match policy {
            LanePolicy::Monotonic => Self::Monotonic,
            LanePolicy::FollowParent => Self::FollowParent,
        }
    }
}

/// When to emit ANSI colors
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color when stdout is a color-capable terminal, honoring `CLICOLOR`
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl ColorMode {
    /// Resolve against the actual output stream
    #[must_use]
    pub fn enabled(self) -> bool {
        match self {
            Self::Auto => console::colors_enabled(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl Config {
    /// The subcommand to run, `log` when none was given
    #[must_use]
    pub fn effective_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Log(self.log.clone()))
    }

    /// Get the repository path, using current directory as default
    ///
    /// Returns `None` if no path is specified and the current
    /// directory cannot be determined.
    #[must_use]
    pub fn repo_path(&self) -> Option<PathBuf> {
        self.repo.clone().or_else(|| std::env::current_dir().ok())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The repository path is specified but doesn't exist or isn't a directory
    /// - The palette size is zero or larger than the printer's palette
    /// - The `--input` file doesn't exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref repo) = self.repo {
            if !repo.exists() {
                return Err(ConfigError::RepoNotFound(repo.clone()));
            }
            if !repo.is_dir() {
                return Err(ConfigError::RepoNotDirectory(repo.clone()));
            }
        }

        if let Command::Log(log) = self.effective_command() {
            let max = PALETTE.len() as u32;
            if log.palette_size == 0 || log.palette_size > max {
                return Err(ConfigError::InvalidPaletteSize(log.palette_size, max));
            }
            if let Some(input) = log.input.as_ref().filter(|_| !log.reads_stdin()) {
                if !input.is_file() {
                    return Err(ConfigError::InputNotFound(input.clone()));
                }
            }
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Repository path not found
    #[error("Repository path not found: {0}")]
    RepoNotFound(PathBuf),

    /// Repository path is not a directory
    #[error("Repository path is not a directory: {0}")]
    RepoNotDirectory(PathBuf),

    /// Palette size out of range
    #[error("Palette size must be between 1 and {1}, got {0}")]
    InvalidPaletteSize(u32, u32),

    /// Input file not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("gitty").chain(args.iter().copied()))
            .expect("valid command line")
    }

    #[test]
    fn test_explicit_color_modes_ignore_terminal() {
        assert!(ColorMode::Always.enabled());
        assert!(!ColorMode::Never.enabled());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.command.is_none());
        assert!(config.repo.is_none());
        assert!(!config.verbose);
        assert!(!config.quiet);
        assert_eq!(config.log.palette_size, 8);
    }

    #[test]
    fn test_no_subcommand_means_log() {
        let config = parse(&[]);
        assert_eq!(config.effective_command_log(), LogArgs::default());
    }

    #[test]
    fn test_top_level_log_flags() {
        let config = parse(&["--limit", "20", "--lanes", "follow-parent", "--format", "json"]);
        let log = config.effective_command_log();
        assert_eq!(log.limit, Some(20));
        assert_eq!(log.lanes, LanePolicy::FollowParent);
        assert_eq!(log.format, OutputFormat::Json);
        assert_eq!(log.layout_options().lanes, LaneAllocation::FollowParent);
    }

    #[test]
    fn test_log_subcommand_flags() {
        let config = parse(&["log", "-n", "5", "--no-refs", "--input", "-", "-v", "-C", "/tmp"]);
        assert_eq!(config.repo, Some(PathBuf::from("/tmp")));
        assert!(config.verbose);
        let log = config.effective_command_log();
        assert_eq!(log.limit, Some(5));
        assert!(log.no_refs);
        assert!(log.reads_stdin());
    }

    #[test]
    fn test_show_subcommand() {
        let config = parse(&["show", "HEAD~1", "--parent", "HEAD~3"]);
        match config.effective_command() {
            Command::Show(show) => {
                assert_eq!(show.commit, "HEAD~1");
                assert_eq!(show.parent.as_deref(), Some("HEAD~3"));
                assert_eq!(show.format, OutputFormat::Text);
            }
            Command::Log(_) => panic!("Expected show"),
        }
    }

    #[test]
    fn test_show_requires_commit() {
        assert!(Config::try_parse_from(["gitty", "show"]).is_err());
    }

    #[test]
    fn test_unknown_lane_policy_rejected() {
        assert!(Config::try_parse_from(["gitty", "--lanes", "sideways"]).is_err());
    }

    #[test]
    fn test_log_level_default() {
        let config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_nonexistent_repo() {
        let config = Config {
            repo: Some(PathBuf::from("/nonexistent/path/12345")),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::RepoNotFound(_))));
    }

    #[test]
    fn test_validate_valid_repo() {
        let config = Config {
            repo: Some(std::env::temp_dir()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_palette_size() {
        for size in [0, PALETTE.len() as u32 + 1] {
            let config = Config {
                log: LogArgs {
                    palette_size: size,
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidPaletteSize(got, _)) if got == size
            ));
        }
    }

    #[test]
    fn test_validate_missing_input() {
        let config = parse(&["--input", "/nonexistent/rev-list.txt"]);
        assert!(matches!(config.validate(), Err(ConfigError::InputNotFound(_))));
        assert!(parse(&["--input", "-"]).validate().is_ok());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }

    impl Config {
        fn effective_command_log(&self) -> LogArgs {
            match self.effective_command() {
                Command::Log(log) => log,
                Command::Show(_) => panic!("Expected log"),
            }
        }
    }
}
