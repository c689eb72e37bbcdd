mod closest;
mod compare;
mod config_cmd;
mod inspect;
mod play;
mod record;
mod score;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dance_mimic::models::Stars;

use crate::config::Config;

pub use closest::ClosestCommand;
pub use compare::CompareCommand;
pub use inspect::InspectCommand;
pub use play::PlayCommand;
pub use record::RecordCommand;
pub use score::ScoreCommand;

#[derive(Parser)]
#[command(name = "dance-mimic")]
#[command(about = "Pose-sequence matching and scoring for dance mimicry", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "DANCE_MIMIC_CONFIG")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a pose sequence file
    Inspect(InspectCommand),

    /// Find the pose nearest a timestamp
    Closest(ClosestCommand),

    /// Distance between two poses
    Compare(CompareCommand),

    /// Score a recorded performance against a reference
    Score(ScoreCommand),

    /// Replay a performance in real time with live feedback
    Play(PlayCommand),

    /// Re-sample a pose sequence into a new dance folder
    Record(RecordCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_path = self.config.as_deref();

        match self.command {
            Commands::Inspect(cmd) => cmd.execute().await,
            Commands::Closest(cmd) => cmd.execute().await,
            Commands::Compare(cmd) => cmd.execute(&Config::load(config_path)?).await,
            Commands::Score(cmd) => cmd.execute(&Config::load(config_path)?).await,
            Commands::Play(cmd) => cmd.execute(&Config::load(config_path)?).await,
            Commands::Record(cmd) => cmd.execute(&Config::load(config_path)?).await,
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(config_path).await,
                ConfigSubcommands::Init { force } => {
                    config_cmd::init_config(config_path, force).await
                }
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Stars as filled and empty glyphs, colored by rating
pub(crate) fn format_stars(stars: Stars, color: bool) -> String {
    let text = stars.to_string();
    if !color {
        return text;
    }

    match stars.value() {
        3 => text.green().bold().to_string(),
        2 => text.yellow().bold().to_string(),
        1 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
