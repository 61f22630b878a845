use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelforge")]
#[command(author, version, about = "Compose and run ffmpeg commands from a media model")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe a media file and display its format and streams
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compose the ffmpeg passes that convert a file, optionally running them
    Compose {
        /// Source file
        #[arg(required = true)]
        input: PathBuf,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,

        /// Target format preset (mp3, mkv, png, ...); guessed from the
        /// output extension when omitted
        #[arg(short, long)]
        format: Option<String>,

        /// JSON file with format settings (codecs, bitrates, dimensions, passes)
        #[arg(long)]
        format_options: Option<PathBuf>,

        /// Extra option as NAME=VALUE; may be repeated
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Run the passes instead of printing them
        #[arg(long)]
        run: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compose() {
        let cli = Cli::try_parse_from([
            "reelforge", "compose", "in.mkv", "-o", "out.mp3", "-s", "threads=2", "--set", "strict=1",
        ])
        .unwrap();
        match cli.command {
            Commands::Compose {
                input,
                output,
                format,
                set,
                run,
                ..
            } => {
                assert_eq!(input, PathBuf::from("in.mkv"));
                assert_eq!(output, PathBuf::from("out.mp3"));
                assert!(format.is_none());
                assert_eq!(set, ["threads=2", "strict=1"]);
                assert!(!run);
            }
            _ => panic!("expected compose"),
        }
    }

    #[test]
    fn compose_requires_output() {
        assert!(Cli::try_parse_from(["reelforge", "compose", "in.mkv"]).is_err());
    }
}
