mod generate;
mod init;
mod showconfig;
mod version;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use eyre::Result;
use generate::GenerateCommand;
use init::InitCommand;
use mockery_config::{LoadOptions, LoadedConfig};
use showconfig::ShowConfigCommand;
use version::VersionCommand;

/// Extension trait for exiting on config errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for mockery_core::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "mockery")]
#[command(version)]
#[command(about = "Generate mocks for Go interfaces")]
pub(crate) struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            None => GenerateCommand.run(&self.global),
            Some(Commands::Showconfig(cmd)) => cmd.run(&self.global),
            Some(Commands::Version(cmd)) => cmd.run(),
            Some(Commands::Init(cmd)) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged config as YAML
    Showconfig(ShowConfigCommand),

    /// Print the mockery version
    Version(VersionCommand),

    /// Write a seed .mockery.yaml
    Init(InitCommand),
}

/// Options shared by generation and `showconfig`.
#[derive(Args, Debug, Default)]
pub(crate) struct GlobalArgs {
    /// Config file (defaults to $MOCKERY_CONFIG, then .mockery.yaml in this or a parent directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Go build tags, comma or space separated
    #[arg(long, global = true)]
    pub build_tags: Option<String>,

    /// Overwrite existing mock files
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = "true")]
    pub force_file_write: Option<bool>,
}

impl GlobalArgs {
    /// Loader inputs: process environment plus flag overrides.
    pub fn load_options(&self, cwd: &Path) -> LoadOptions {
        let mut options = LoadOptions::new(cwd).with_process_env();
        if let Some(path) = &self.config {
            options = options.with_config_path(path);
        }
        if let Some(level) = &self.log_level {
            options = options.with_override("log-level", level.as_str());
        }
        if let Some(tags) = &self.build_tags {
            options = options.with_override("build-tags", tags.as_str());
        }
        if let Some(force) = self.force_file_write {
            options = options.with_override("force-file-write", force);
        }
        options
    }

    /// Load the config and start logging at its `log-level`.
    pub fn load(&self, cwd: &Path) -> LoadedConfig {
        let loaded = mockery_config::load(&self.load_options(cwd)).unwrap_or_exit();
        crate::logging::init(loaded.root.config.log_level.as_deref());
        if let Some(path) = &loaded.path {
            tracing::debug!(path = %path.display(), "using config file");
        }
        loaded
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use mockery_config::Formatter;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(".mockery.yaml"),
            "log-level: debug\nforce-file-write: true\nformatter: noop\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "mockery",
            "--log-level",
            "error",
            "--build-tags",
            "integration e2e",
            "--force-file-write=false",
        ])
        .unwrap();
        let loaded = mockery_config::load(&cli.global.load_options(tmp.path())).unwrap();
        let config = &loaded.root.config;

        assert_eq!(config.log_level.as_deref(), Some("error"));
        assert_eq!(config.build_tags(), vec!["integration", "e2e"]);
        assert!(!config.force_file_write());
        assert_eq!(config.formatter(), Formatter::Noop);
        assert_eq!(loaded.path, Some(tmp.path().join(".mockery.yaml")));
    }

    #[test]
    fn test_bare_force_flag_means_true() {
        let cli = Cli::try_parse_from(["mockery", "--force-file-write"]).unwrap();
        assert_eq!(cli.global.force_file_write, Some(true));
        assert!(cli.command.is_none());
    }
}
