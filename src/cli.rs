use std::path::PathBuf;

mod build;
mod terminal;
mod tree;
mod validate;

use build::Build;
use clap::ArgAction;
use tree::Tree;
use validate::Validate;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the project root (containing reqdoc.toml and the tables)
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let quiet = matches!(&self.command, Some(Command::Validate(validate)) if validate.is_quiet());
        Self::setup_logging(log_level(self.verbose, quiet));

        self.command
            .unwrap_or_else(|| Command::Validate(Validate::default()))
            .run(self.root)
    }

    fn setup_logging(level: tracing::Level) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Check the requirement table against the structure (default)
    Validate(Validate),

    /// Validate, then write the document
    ///
    /// Nothing is written if validation reports any error.
    Build(Build),

    /// Show the document structure with requirement counts
    Tree(Tree),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Validate(command) => command.run(root)?,
            Self::Build(command) => command.run(root)?,
            Self::Tree(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// `--quiet` keeps load-time warnings out of the log as well.
const fn log_level(verbosity: u8, quiet: bool) -> tracing::Level {
    if quiet {
        return tracing::Level::ERROR;
    }
    match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}
