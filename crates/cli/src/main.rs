//! `repeatables` CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Wire observability**: configure `tracing-subscriber` with an
//!    `EnvFilter` and either a human-readable or a JSON layer. All structured
//!    events emitted by the `annotations` crate flow through this layer to
//!    stderr, keeping stdout free for command output.
//! 2. **Load documents**: read the metadata document and annotation instance
//!    from disk. The library itself performs no I/O.
//! 3. **Dispatch**: run the selected subcommand and print its JSON report.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use annotations::ContainerMode;

/// Resolve repeatable annotation containers from declarative metadata.
#[derive(Debug, Parser)]
#[command(name = "repeatables", version, about, long_about = None)]
struct Cli {
    /// Format of diagnostic output written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a metadata document and print the configured chain.
    Check {
        /// Metadata document declaring annotation types and containers.
        #[arg(long, env = "REPEATABLES_METADATA")]
        metadata: PathBuf,
    },

    /// Resolve one annotation instance against the configured chain.
    Resolve {
        /// Metadata document declaring annotation types and containers.
        #[arg(long, env = "REPEATABLES_METADATA")]
        metadata: PathBuf,

        /// Annotation instance document to inspect.
        #[arg(long)]
        annotation: PathBuf,

        /// Overrides the base strategy configured in the metadata document.
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Standard,
    None,
}

impl From<ModeArg> for ContainerMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standard => ContainerMode::Standard,
            ModeArg::None => ContainerMode::None,
        }
    }
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let report = match cli.command {
        Command::Check { metadata } => {
            let document = commands::load_metadata(&metadata)?;
            serde_json::to_string_pretty(&commands::check(&document)?)?
        }
        Command::Resolve {
            metadata,
            annotation,
            mode,
        } => {
            let document = commands::load_metadata(&metadata)?;
            let instance = commands::load_json(&annotation)?;
            let report = commands::resolve(&document, &instance, mode.map(ContainerMode::from))?;
            serde_json::to_string_pretty(&report)?
        }
    };

    println!("{report}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command, LogFormat, ModeArg};

    #[test]
    fn parses_resolve_with_mode_override() {
        let cli = Cli::try_parse_from([
            "repeatables",
            "resolve",
            "--metadata",
            "meta.json",
            "--annotation",
            "tags.json",
            "--mode",
            "none",
        ])
        .expect("resolve arguments parse");

        assert_eq!(cli.log_format, LogFormat::Pretty);
        match cli.command {
            Command::Resolve {
                metadata,
                annotation,
                mode,
            } => {
                assert_eq!(metadata.to_str(), Some("meta.json"));
                assert_eq!(annotation.to_str(), Some("tags.json"));
                assert_eq!(mode, Some(ModeArg::None));
            }
            other => panic!("expected resolve, got {other:?}"),
        }
    }

    #[test]
    fn log_format_is_global() {
        let cli = Cli::try_parse_from([
            "repeatables",
            "check",
            "--metadata",
            "meta.json",
            "--log-format",
            "json",
        ])
        .expect("check arguments parse");

        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn resolve_requires_annotation() {
        let result = Cli::try_parse_from(["repeatables", "resolve", "--metadata", "meta.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_mode() {
        let result = Cli::try_parse_from([
            "repeatables",
            "resolve",
            "--metadata",
            "meta.json",
            "--annotation",
            "tags.json",
            "--mode",
            "explicit",
        ]);
        assert!(result.is_err());
    }
}
