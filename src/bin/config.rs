//! Dictionary Config CLI
//!
//! View and manage dictionary tool configuration.

use clap::{Parser, Subcommand};
use message_dictionary::DictionaryConfig;

#[derive(Parser)]
#[command(name = "dictionary-config")]
#[command(about = "View and manage dictionary tool configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path (default: dictionary.toml)
        #[arg(short, long, default_value = "dictionary.toml")]
        output: String,
    },

    /// Validate configuration
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = DictionaryConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Dictionary Configuration\n");
                println!("Output:");
                println!("  Format: {:?}", cfg.output.format);
                println!("  Pretty: {}", cfg.output.pretty);

                println!("\nFactory:");
                println!("  Dictionary URI: {}", cfg.factory.dictionary_uri);
                println!("  Protocol: {:?}", cfg.factory.protocol);

                println!("\nGraph:");
                println!("  Search limit: {}", cfg.graph.search_limit);
            }
        }

        Commands::Init { output } => {
            let cfg = DictionaryConfig::default();
            cfg.save(&output)?;
            println!("✅ Created config file: {}", output);
        }

        Commands::Validate { config } => match DictionaryConfig::load_from(config.as_deref()) {
            Ok(cfg) => {
                println!("✅ Configuration is valid");
                println!("   Output format: {:?}", cfg.output.format);
                println!("   Dictionary URI: {}", cfg.factory.dictionary_uri);
            }
            Err(e) => {
                eprintln!("❌ Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
