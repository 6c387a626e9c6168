//! unraid-compose - unRAID Docker templates to docker-compose
//!
//! This is the main CLI entry point.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use unraid_compose::compose::config::{DEFAULT_COMPOSE_VERSION, DEFAULT_RESTART_POLICY};
use unraid_compose::compose::{ConvertOptions, EmitterConfig};
use unraid_compose::{ConversionResponse, Converter};

/// unraid-compose - convert unRAID templates to docker-compose
#[derive(Parser)]
#[command(name = "unraid-compose")]
#[command(version)]
#[command(about = "Convert unRAID Docker templates into docker-compose services", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert unRAID template XML files into one compose file
    Convert {
        /// Template files ("-" or none for stdin)
        files: Vec<PathBuf>,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print a {"yaml": ...} / {"error": ...} JSON object
        #[arg(long)]
        json: bool,
        /// Leave out the top-level version key
        #[arg(long)]
        no_version: bool,
        /// Restart policy for converted services
        #[arg(long, default_value = DEFAULT_RESTART_POLICY)]
        restart: String,
        /// Spaces per indentation level
        #[arg(long, default_value = "2")]
        indent: usize,
    },

    /// Add Uptime Kuma monitoring labels to a compose file
    Labels {
        /// Compose file ("-" for stdin)
        #[arg(short, long)]
        compose: PathBuf,
        /// JSON file with the monitor list ("-" for stdin)
        #[arg(short, long)]
        monitors: PathBuf,
        /// Service to label (defaults to the first service)
        #[arg(short, long)]
        service: Option<String>,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print a {"yaml": ...} / {"error": ...} JSON object
        #[arg(long)]
        json: bool,
        /// Spaces per indentation level
        #[arg(long, default_value = "2")]
        indent: usize,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the YAML
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            files,
            output,
            json,
            no_version,
            restart,
            indent,
        } => {
            let options = ConvertOptions {
                compose_version: (!no_version).then(|| DEFAULT_COMPOSE_VERSION.to_string()),
                restart,
            };
            let converter = Converter::new(options, emitter_config(indent));

            let files = if files.is_empty() {
                vec![PathBuf::from("-")]
            } else {
                files
            };
            let templates = files
                .iter()
                .map(|path| read_input(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let templates: Vec<&str> = templates.iter().map(String::as_str).collect();

            let response = converter.convert_many(&templates);
            respond(response, output.as_deref(), json)
        }

        Commands::Labels {
            compose,
            monitors,
            service,
            output,
            json,
            indent,
        } => {
            if is_stdin(&compose) && is_stdin(&monitors) {
                anyhow::bail!("only one of --compose and --monitors can be read from stdin");
            }

            let compose = read_input(&compose)?;
            let monitors = read_input(&monitors)?;
            let converter = Converter::new(ConvertOptions::default(), emitter_config(indent));

            let response = converter.add_monitoring_labels(&compose, &monitors, service.as_deref());
            respond(response, output.as_deref(), json)
        }
    }
}

fn emitter_config(indent: usize) -> EmitterConfig {
    EmitterConfig {
        indent: indent.max(1),
        ..EmitterConfig::default()
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if is_stdin(path) {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        return Ok(content);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn respond(
    response: ConversionResponse,
    output: Option<&Path>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let failed = response.is_error();

    let text = match (&response, json) {
        (_, true) => format!("{}\n", response.to_json()),
        (ConversionResponse::Yaml(yaml), false) => yaml.clone(),
        (ConversionResponse::Error(message), false) => {
            eprintln!("Error: {}", message);
            return Ok(ExitCode::FAILURE);
        }
    };

    match output {
        Some(path) if !failed => std::fs::write(path, &text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        _ => print!("{}", text),
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
