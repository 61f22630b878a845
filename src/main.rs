mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use reelforge::{Config, Format, FormatOptions, Media, OptionMap, Session, ToolRegistry, TracingObserver};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelforge=trace,rf_av=trace,rf_media=debug,rf_probe=debug,rf_core=debug".to_string()
        } else {
            "reelforge=info,rf_av=info,rf_media=warn,rf_probe=warn,rf_core=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Probe { file, json } => {
            let config = Config::load_or_default(cli.config.as_deref());
            probe_file(&Session::new(config)?, &file, json)
        }
        Commands::Compose {
            input,
            output,
            format,
            format_options,
            set,
            run,
        } => {
            let config = Config::load_or_default(cli.config.as_deref());
            let target = target_format(format.as_deref(), &output, format_options.as_deref())?;
            let options = caller_options(&output, &set)?;
            compose_file(&Session::new(config)?, &input, &target, &options, run)
        }
        Commands::CheckTools => {
            let config = Config::load_or_default(cli.config.as_deref());
            check_tools(&config)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open(session: &Session, file: &Path) -> Result<Media> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }
    Ok(session.open(file)?)
}

fn probe_file(session: &Session, file: &Path, json: bool) -> Result<()> {
    let media = open(session, file)?;

    if json {
        let streams: Vec<serde_json::Value> = media
            .streams()
            .iter()
            .map(|s| {
                serde_json::json!({
                    "index": s.index(),
                    "kind": s.kind(),
                    "codec": s.codec().map(|c| c.code()),
                    "profile": s.profile(),
                    "bitrate": s.bitrate(),
                    "duration": s.duration(),
                    "channels": s.channels(),
                    "frequency": s.frequency(),
                    "width": s.width(),
                    "height": s.height(),
                    "frame_rate": s.frame_rate(),
                    "tags": s.tags(),
                })
            })
            .collect();
        let value = serde_json::json!({
            "source": media.source(),
            "kind": media.kind(),
            "format": media.format().name(),
            "duration": media.duration(),
            "metadata": media.format().metadata(),
            "streams": streams,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("File: {}", media.source().display());
    println!("Format: {}", media.format());
    let secs = media.duration().round() as u64;
    println!("Duration: {:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60);

    println!("\nStreams: {}", media.streams().len());
    for stream in media.streams().iter() {
        print!("  [{}] {}", stream.index(), stream.kind());
        if let Some(codec) = stream.codec() {
            print!(" {}", codec.code());
        }
        if let (Some(w), Some(h)) = (stream.width(), stream.height()) {
            print!(" {w}x{h}");
        }
        if let Some(fps) = stream.frame_rate() {
            print!(" {fps:.3} fps");
        }
        if let Some(ch) = stream.channels() {
            print!(" {ch}ch");
        }
        if let Some(hz) = stream.frequency() {
            print!(" {hz} Hz");
        }
        if let Some(lang) = stream.tags().get("language") {
            print!(" ({lang})");
        }
        println!();
    }

    Ok(())
}

/// Resolve the target format from `--format`, or from the output extension.
fn target_format(name: Option<&str>, output: &Path, settings: Option<&Path>) -> Result<Format> {
    let name = match name {
        Some(n) => n.to_string(),
        None => output
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .with_context(|| format!("cannot guess a format for {:?}; pass --format", output))?,
    };
    let mut format = Format::preset(&name).with_context(|| format!("unknown format '{name}'"))?;

    if let Some(path) = settings {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read format options {:?}", path))?;
        let options: FormatOptions = serde_json::from_str(&raw)
            .with_context(|| format!("invalid format options in {:?}", path))?;
        format.apply_options(&options)?;
    }

    Ok(format)
}

fn caller_options(output: &Path, set: &[String]) -> Result<OptionMap> {
    let mut options = OptionMap::with_output(output);
    for pair in set {
        let Some((name, value)) = pair.split_once('=') else {
            anyhow::bail!("expected NAME=VALUE, got '{pair}'");
        };
        options.push(name.trim(), value);
    }
    Ok(options)
}

fn compose_file(session: &Session, input: &Path, format: &Format, options: &OptionMap, run: bool) -> Result<()> {
    let media = open(session, input)?;

    if !run {
        for command in session.compose(&media, format, options)? {
            println!("{}", command.command_line());
        }
        return Ok(());
    }

    session.save(&media, format, options, &mut TracingObserver)?;
    println!("Wrote {}", options.text("output").unwrap_or_default());
    Ok(())
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let registry = ToolRegistry::discover(&config.tools);
    let mut all_ok = true;

    for tool in registry.check_all() {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let raw = std::fs::read_to_string(p).with_context(|| format!("failed to read {:?}", p))?;
            let config = Config::from_json(&raw)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let show = |p: Option<&Path>| p.map_or_else(|| "PATH".to_string(), |p| p.display().to_string());
    println!("  ffmpeg: {}", show(config.tools.ffmpeg_path.as_deref()));
    println!("  ffprobe: {}", show(config.tools.ffprobe_path.as_deref()));
    println!("  Threads: {}", config.compose.threads);
    println!("  Forced formats: {}", config.compose.force_formats.len());

    for warning in config.validate() {
        println!("  warning: {warning}");
    }

    Ok(())
}
