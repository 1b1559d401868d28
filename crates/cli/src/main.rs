//! proto-renderer CLI
//!
//! Command-line interface for rendering compiled protobuf descriptor sets
//! back into proto3 source.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use proto_renderer_common::{FileSummary, RenderOptions, Strategy};
use proto_renderer_generator::renderer_for;
use proto_renderer_parser::ProtobufParser;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "proto-renderer")]
#[command(version, about = "Render compiled protobuf FileDescriptorSets as proto3 source", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the last file of a FileDescriptorSet as proto3 source
    #[command(after_help = "EXAMPLES:\n  \
        # Render a self-contained set to stdout\n  \
        proto-renderer render --input greeter.pb\n\n  \
        # Set compiled without --include_imports\n  \
        proto-renderer render \\\n    \
        --input greeter.pb \\\n    \
        --strategy synthesizing \\\n    \
        --output greeter.proto")]
    Render {
        /// Path to the encoded FileDescriptorSet
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rendering strategy
        #[arg(short, long, value_enum, default_value_t = StrategyArg::Direct)]
        strategy: StrategyArg,

        /// Spaces per nesting level
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },

    /// Display the services, messages and enums of the target file
    #[command(after_help = "EXAMPLES:\n  \
        proto-renderer inspect --input greeter.pb\n\n  \
        # Machine-readable summary\n  \
        proto-renderer inspect --input greeter.pb --synthesize --json")]
    Inspect {
        /// Path to the encoded FileDescriptorSet
        #[arg(short, long)]
        input: PathBuf,

        /// Prepend synthesized well-known dependencies before loading
        #[arg(long)]
        synthesize: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Walk the file as given; the set must be self-contained
    Direct,
    /// Supply descriptor.proto, empty.proto and annotations.proto when missing
    Synthesizing,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Direct => Strategy::Direct,
            StrategyArg::Synthesizing => Strategy::Synthesizing,
        }
    }
}

impl std::fmt::Display for StrategyArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyArg::Direct => write!(f, "direct"),
            StrategyArg::Synthesizing => write!(f, "synthesizing"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            output,
            strategy,
            indent,
        } => {
            let options = RenderOptions {
                strategy: strategy.into(),
                indent_width: indent,
            };
            render_command(input.as_path(), output.as_deref(), &options)?;
        }
        Commands::Inspect {
            input,
            synthesize,
            json,
        } => {
            inspect_command(input.as_path(), synthesize, json, cli.verbose)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn render_command(input: &Path, output: Option<&Path>, options: &RenderOptions) -> Result<()> {
    // Progress goes to stderr so stdout carries only the rendered source.
    eprintln!("{} Rendering: {}", "→".cyan(), input.display());
    debug!(?options, "render options");

    let bytes = fs::read(input)
        .with_context(|| format!("Failed to read descriptor set {}", input.display()))?;

    let renderer = renderer_for(options);
    let source = renderer
        .render(&bytes)
        .context("Failed to render FileDescriptorSet")?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, &source)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} ({} bytes)",
                "✓".green(),
                path.display().to_string().yellow(),
                source.len()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&source)
                .context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

fn inspect_command(input: &Path, synthesize: bool, json: bool, verbose: bool) -> Result<()> {
    let parser = ProtobufParser::from_file(input, synthesize)
        .with_context(|| format!("Failed to load FileDescriptorSet {}", input.display()))?;
    let summary = parser
        .parse()
        .context("Failed to summarize FileDescriptorSet")?;

    if json {
        let out = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", out);
        return Ok(());
    }

    print_summary(&summary, verbose);
    Ok(())
}

fn print_summary(summary: &FileSummary, verbose: bool) {
    println!("{}", "File:".bold());
    println!("  Name: {}", summary.name.yellow());
    if !summary.package.is_empty() {
        println!("  Package: {}", summary.package.yellow());
    }
    println!("  Imports: {}", summary.imports.len());

    if verbose {
        for import in &summary.imports {
            println!("    {}", import);
        }
    }

    for service in &summary.services {
        println!("\n{} {}", "Service:".bold(), service.name.cyan());
        for method in &service.methods {
            let input = if method.client_streaming {
                format!("stream {}", method.input_type)
            } else {
                method.input_type.clone()
            };
            let output = if method.server_streaming {
                format!("stream {}", method.output_type)
            } else {
                method.output_type.clone()
            };
            println!("  • {} ({}) → ({})", method.name.cyan(), input, output);

            if let Some(http) = &method.http {
                match &http.body {
                    Some(body) => println!(
                        "    {} {} (body: {})",
                        http.verb.green(),
                        http.path,
                        body
                    ),
                    None => println!("    {} {}", http.verb.green(), http.path),
                }
            }
        }
    }

    println!("\n{} {}", "Messages:".bold(), summary.messages.len());
    if verbose {
        for message in &summary.messages {
            println!("  • {}", message);
        }
    }
    println!("{} {}", "Enums:".bold(), summary.enums.len());
    if verbose {
        for enum_name in &summary.enums {
            println!("  • {}", enum_name);
        }
    }
}
