//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands::{self, AnalyzeOverrides, ViewOverrides};
use crate::config::NormalizationMode;
use crate::logging;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

/// A terminal equalizer that draws one bar-graph frame per line of FFT magnitudes on stdin
#[derive(Parser)]
#[command(name = "eqview")]
#[command(version)]
#[command(about = "Terminal equalizer for streamed FFT magnitudes")]
#[command(long_about = "Terminal equalizer for streamed FFT magnitudes.\n\nReads lines of comma-separated numbers from stdin and draws each line as a\nbar graph sized to the terminal. A blank line or end of input exits; q, Esc\nor Ctrl+C quit early.\n\nDEFAULT COMMAND:\n    If no command is specified, 'view' is used by default.\n    View options (--peak, --glyph, ...) can be used without saying 'view'.\n\nEXAMPLES:\n    # Visualize a live capture\n    $ parec --format=s16le --channels=2 --rate=44100 | eqview analyze | eqview\n\n    # Peak-relative bars drawn with glyphs\n    $ producer | eqview --peak --glyph\n\n    # Edit configuration file\n    $ eqview config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/eqview/eqview.toml\n    Logs:               ~/.local/state/eqview/eqview.log.*"
)]
struct Cli {
    #[command(flatten)]
    view: ViewArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
struct ViewArgs {
    /// Scale bars relative to the frame's highest value
    #[arg(long, conflicts_with = "minmax")]
    peak: bool,

    /// Scale bars across the frame's lowest-to-highest span
    #[arg(long)]
    minmax: bool,

    /// Draw filled cells with a glyph instead of highlighted blocks
    #[arg(long)]
    glyph: bool,

    /// Render producer status lines instead of skipping them
    #[arg(long)]
    no_status_filter: bool,

    /// Show a width/height/bars overlay
    #[arg(long)]
    stats: bool,
}

impl From<ViewArgs> for ViewOverrides {
    fn from(args: ViewArgs) -> Self {
        let normalization = if args.peak {
            Some(NormalizationMode::Peak)
        } else if args.minmax {
            Some(NormalizationMode::MinMax)
        } else {
            None
        };
        ViewOverrides {
            normalization,
            glyph: args.glyph,
            no_status_filter: args.no_status_filter,
            stats: args.stats,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
struct AnalyzeArgs {
    /// Samples per channel in each FFT window
    #[arg(long, value_name = "N")]
    fft_size: Option<usize>,

    /// Number of interleaved channels in the input
    #[arg(long, value_name = "N")]
    channels: Option<usize>,

    /// Channel to analyze (0-based)
    #[arg(long, value_name = "N")]
    channel: Option<usize>,

    /// Number of bands per output line
    #[arg(short, long, value_name = "N")]
    bands: Option<usize>,

    /// Input sample rate in Hz
    #[arg(long, value_name = "HZ")]
    sample_rate: Option<u32>,
}

impl From<AnalyzeArgs> for AnalyzeOverrides {
    fn from(args: AnalyzeArgs) -> Self {
        AnalyzeOverrides {
            fft_size: args.fft_size,
            channels: args.channels,
            channel: args.channel,
            bands: args.bands,
            sample_rate: args.sample_rate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Draw stdin frames as a live equalizer (default)
    ///
    /// One frame per line of comma-separated magnitudes. Exits on a blank line,
    /// end of input, q, Esc or Ctrl+C.
    #[command(visible_alias = "v")]
    View(ViewArgs),

    /// Turn raw s16le PCM on stdin into band-magnitude lines on stdout
    ///
    /// Output lines are in the format `view` reads, so the two can be piped together.
    #[command(visible_alias = "a")]
    Analyze(AnalyzeArgs),

    /// Open configuration file in your preferred editor
    ///
    /// Writes a default file first if none exists.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   eqview completions bash > eqview.bash
    ///   eqview completions zsh > _eqview
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't need logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "eqview", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    // Dropped when `run` returns, which flushes the log before `main` exits the process.
    let _log_guard = logging::init_logging()?;

    match cli.command {
        None => commands::handle_view(cli.view.into()).await?,
        Some(Commands::View(args)) => commands::handle_view(args.into()).await?,
        Some(Commands::Analyze(args)) => commands::handle_analyze(args.into())?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_takes_view_flags() {
        let cli = Cli::try_parse_from(["eqview", "--peak", "--glyph"]).unwrap();
        assert!(cli.command.is_none());
        let overrides: ViewOverrides = cli.view.into();
        assert_eq!(overrides.normalization, Some(NormalizationMode::Peak));
        assert!(overrides.glyph);
    }

    #[test]
    fn test_peak_and_minmax_conflict() {
        assert!(Cli::try_parse_from(["eqview", "--peak", "--minmax"]).is_err());
    }

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::try_parse_from(["eqview", "analyze", "-b", "16", "--channels", "1"]).unwrap();
        match cli.command {
            Some(Commands::Analyze(args)) => {
                let overrides: AnalyzeOverrides = args.into();
                assert_eq!(overrides.bands, Some(16));
                assert_eq!(overrides.channels, Some(1));
                assert_eq!(overrides.fft_size, None);
            }
            _ => panic!("expected analyze command"),
        }
    }
}
