//! Dictionary Convert CLI
//!
//! Loads a dictionary, resolves it and writes it back out as JSON or YAML,
//! or prints a message instance built by the configured message factory.
//! Building first means malformed input (conflicting identifiers, dangling
//! references) is rejected before anything is written.

use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use message_dictionary::{loader, writer, DictionaryConfig, DictionaryFormat};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dictionary-convert")]
#[command(about = "Resolve a message dictionary and re-emit it as JSON or YAML")]
struct Cli {
    /// Input dictionary (.json, .yaml or .yml)
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: json or yaml (defaults to the output extension, then config)
    #[arg(short, long)]
    format: Option<DictionaryFormat>,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,

    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Only check that the dictionary resolves
    #[arg(long)]
    check: bool,

    /// Print a new instance of this message (with default structures) instead of the dictionary
    #[arg(short, long)]
    message: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = DictionaryConfig::load_from(cli.config.as_deref())?;

    let graph = loader::build_from_path(&cli.input)?;
    info!(
        dictionary = graph.name(),
        fields = graph.fields().len(),
        messages = graph.messages().len(),
        nodes = graph.node_count(),
        "Dictionary resolved"
    );

    if cli.check {
        eprintln!(
            "✅ {} resolves: {} fields, {} messages, {} nodes",
            graph.name(),
            graph.fields().len(),
            graph.messages().len(),
            graph.node_count()
        );
        return Ok(());
    }

    if let Some(name) = &cli.message {
        let factory = cfg.factory.build_factory(Arc::new(graph))?;
        if factory.dictionary().message(name).is_none() {
            anyhow::bail!("Message '{}' is not declared in {}", name, factory.dictionary().name());
        }
        let message = factory.create_message(name);
        info!(message = %name, fields = message.field_count(), "Message created");
        println!("{}", serde_json::to_string_pretty(&message)?);
        return Ok(());
    }

    let format = match (cli.format, &cli.output) {
        (Some(format), _) => format,
        (None, Some(path)) => DictionaryFormat::from_path(path).unwrap_or(cfg.output.format),
        (None, None) => cfg.output.format,
    };
    let pretty = cfg.output.pretty && !cli.compact;

    match &cli.output {
        Some(path) => {
            writer::write_to_path(&graph, path, format, pretty)?;
            eprintln!("✅ Wrote {} to {:?}", graph.name(), path);
        }
        None => {
            let stdout = std::io::stdout();
            writer::write(&graph, stdout.lock(), format, pretty)?;
            println!();
        }
    }

    Ok(())
}
