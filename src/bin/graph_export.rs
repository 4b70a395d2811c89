use std::path::PathBuf;
use clap::Parser;
use message_dictionary::{loader, DictionaryConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dictionary-graph-export")]
#[command(about = "Export a resolved dictionary graph to DOT/SVG format")]
struct Cli {
    /// Input dictionary (.json, .yaml or .yml)
    input: PathBuf,

    /// Output file (defaults to <dictionary>.dot)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: dot or svg
    #[arg(short, long, default_value = "dot")]
    format: String,

    /// Report reference cycles
    #[arg(long)]
    cycles: bool,

    /// Fuzzy-search top-level names instead of exporting
    #[arg(long)]
    search: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = DictionaryConfig::load()?;

    println!("Loading dictionary from: {:?}", cli.input);
    let graph = loader::build_from_path(&cli.input)?;

    println!("Graph loaded: {} nodes ({} top-level fields, {} top-level messages)",
             graph.node_count(),
             graph.fields().len(),
             graph.messages().len());

    if let Some(query) = cli.search {
        for result in graph.search(&query, cfg.graph.search_limit) {
            let kind = if result.is_message { "message" } else { "field" };
            println!("  {:>4}  {} ({}{})", result.score, result.name, kind,
                     result.id.map(|id| format!(", id={}", id)).unwrap_or_default());
        }
        return Ok(());
    }

    if cli.cycles {
        let cycles = graph.reference_cycles();
        if cycles.is_empty() {
            println!("No reference cycles");
        }
        for cycle in cycles {
            let names: Vec<&str> = cycle.members.iter().map(|&id| graph.node(id).name()).collect();
            println!("  🔁 {}{}", names.join(" -> "),
                     if cycle.is_self_referential { " (self)" } else { "" });
        }
    }

    let dot_content = graph.to_dot();

    match cli.format.as_str() {
        "dot" => {
            let output_path = cli.output.unwrap_or_else(|| PathBuf::from(format!("{}.dot", graph.name())));
            std::fs::write(&output_path, &dot_content)?;
            println!("✅ Exported DOT to: {:?}", output_path);
        }
        "svg" => {
            let output_path = cli.output.unwrap_or_else(|| PathBuf::from(format!("{}.svg", graph.name())));

            // Write DOT to temp file, then convert to SVG
            let temp_dot = output_path.with_extension("temp.dot");
            std::fs::write(&temp_dot, &dot_content)?;

            // Use graphviz to convert DOT to SVG
            let output = std::process::Command::new("dot")
                .arg("-Tsvg")
                .arg(&temp_dot)
                .arg("-o")
                .arg(&output_path)
                .output()?;

            // Clean up temp file
            let _ = std::fs::remove_file(&temp_dot);

            if output.status.success() {
                println!("✅ Exported SVG to: {:?}", output_path);
            } else {
                eprintln!("❌ GraphViz conversion failed:");
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("❌ Invalid format. Use 'dot' or 'svg'");
            std::process::exit(1);
        }
    }

    Ok(())
}
