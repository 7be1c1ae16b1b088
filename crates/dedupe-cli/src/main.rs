#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_precision_loss)]

mod commands;
mod logging;

use clap::Parser;
use dedupe_core::{CompatibilityMode, Config, DedupeOptions};
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dedupe-dependencies")]
#[command(author, version, about = "Remove redundant copies of packages from node_modules", long_about = None)]
struct Cli {
    /// Project directory containing package.json (defaults to the current directory)
    #[arg(short, long, value_name = "PATH", env = "DEDUPE_PATH")]
    path: Option<PathBuf>,

    /// Also walk devDependencies, at every level of the tree
    #[arg(short = 'd', long)]
    include_dev_dependencies: bool,

    /// Report what would be removed without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Treat any earlier copy as covering later ones, ignoring declared ranges
    #[arg(long)]
    first_wins: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Emit logs on stderr as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> DedupeOptions {
        DedupeOptions {
            path: self.path.clone(),
            include_dev_dependencies: self.include_dev_dependencies,
            dry_run: self.dry_run,
            compatibility: if self.first_wins {
                CompatibilityMode::FirstWins
            } else {
                CompatibilityMode::DeclaredRange
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json_logs);

    logging::init(config.verbosity, config.json_logs);
    tracing::debug!("dedupe-dependencies {}", dedupe_core::VERSION);

    commands::dedupe::run(&config, &cli.options(), cli.json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_matches_core() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_version(), Some(dedupe_core::VERSION));
    }

    #[test]
    fn test_options_from_flags() {
        let cli = Cli::parse_from([
            "dedupe-dependencies",
            "-p",
            "app",
            "-d",
            "--dry-run",
            "--first-wins",
        ]);
        let options = cli.options();

        assert_eq!(options.path, Some(PathBuf::from("app")));
        assert!(options.include_dev_dependencies);
        assert!(options.dry_run);
        assert_eq!(options.compatibility, CompatibilityMode::FirstWins);
    }

    #[test]
    fn test_default_options() {
        let cli = Cli::parse_from(["dedupe-dependencies"]);
        let options = cli.options();

        assert!(!options.include_dev_dependencies);
        assert!(!options.dry_run);
        assert_eq!(options.compatibility, CompatibilityMode::DeclaredRange);
    }
}
