use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

#[derive(Debug, ClapParser)]
#[command(
    name       = env!("CARGO_PKG_NAME"),
    version    = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VERGEN_GIT_DESCRIBE"), ", fsb ", env!("FSB_VERSION"), ", built ", env!("BUILD_TIMESTAMP"), ")"),
    about      = "Tools for locating and decoding audio streams embedded in FSB sound banks",
    long_about = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress spinners during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// YAML file with demuxer settings.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find the first decodable embedded stream and decode it to PCM audio.
    Decode(DecodeArgs),

    /// List embedded stream candidates without decoding.
    Info(InfoArgs),

    /// Write the raw bytes of embedded stream candidates to files.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Input container (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output path for decoded audio. Without it the stream is only checked.
    #[arg(long, value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Audio format for output.
    #[arg(long, value_enum, default_value_t = AudioFormat::Wav)]
    pub format: AudioFormat,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input container (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Print a YAML report instead of a table.
    #[arg(long)]
    pub yaml: bool,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Input container (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Base path for the extracted segments.
    #[arg(long, value_name = "PATH")]
    pub output_path: PathBuf,

    /// Write every candidate instead of only the first.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum AudioFormat {
    /// RIFF/WAVE, 24-bit PCM.
    Wav,
    /// Raw PCM format (24-bit little-endian).
    Pcm,
}

impl AudioFormat {
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Pcm => "pcm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fsbx",
            "decode",
            "bank.fsb",
            "--output-path",
            "out",
            "--format",
            "pcm",
            "--config",
            "demux.yaml",
            "--loglevel",
            "debug",
        ])
        .unwrap();

        assert!(matches!(cli.loglevel, LogLevel::Debug));
        assert_eq!(cli.config, Some(PathBuf::from("demux.yaml")));
        let Commands::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(args.format, AudioFormat::Pcm);
        assert_eq!(args.output_path, Some(PathBuf::from("out")));
    }

    #[test]
    fn extract_needs_output_path() {
        assert!(Cli::try_parse_from(["fsbx", "extract", "bank.fsb"]).is_err());
        assert!(Cli::try_parse_from(["fsbx", "extract", "-", "--output-path", "x", "--all"]).is_ok());
    }
}
