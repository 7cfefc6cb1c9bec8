mod backend;
mod config;
mod generate_cmd;
mod serve_cmd;

#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::{CadenceConfig, Overrides};

#[derive(Parser)]
#[command(name = "cadence", about = "Constraint-driven weekly content calendar generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a cadence config file
    Init {
        /// Gemini API key to store in the config file
        #[arg(long)]
        api_key: Option<String>,
        /// Model name for the Gemini generator
        #[arg(long)]
        model: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate one week's calendar from an input JSON file
    Generate {
        /// Path to the input JSON (company, personas, keywords, weekNumber)
        input: PathBuf,
        /// Write the calendar JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also export the calendar as a spreadsheet (CSV)
        #[arg(long)]
        export: Option<PathBuf>,
        /// Seed for a reproducible plan
        #[arg(long)]
        seed: Option<u64>,
        /// Use the built-in template generator instead of Gemini
        #[arg(long)]
        offline: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to bind (overrides CADENCE_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides CADENCE_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Use the built-in template generator instead of Gemini
        #[arg(long)]
        offline: bool,
    },
}

/// Execute the `cadence init` command: write config file.
fn cmd_init(api_key: Option<String>, model: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let masked = api_key.as_deref().map(config::mask_secret);
    let cfg = config::ConfigFile {
        generator: config::GeneratorSection {
            api_key,
            model,
            base_delay_ms: None,
            pacing_ms: None,
        },
        server: config::ServerSection::default(),
    };

    let path = config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match masked {
        Some(key) => println!("  generator.api_key = {key}"),
        None => {
            println!("  generator.api_key not set");
            println!();
            println!("Set CADENCE_API_KEY or re-run with --api-key, or use --offline.");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            api_key,
            model,
            force,
        } => {
            cmd_init(api_key, model, force)?;
        }
        Commands::Generate {
            input,
            output,
            export,
            seed,
            offline,
        } => {
            let resolved = CadenceConfig::resolve(Overrides::default())?;
            let generator = backend::select(&resolved, offline)?;
            let opts = generate_cmd::GenerateOptions {
                input,
                output,
                export,
                seed,
            };
            generate_cmd::run_generate(&opts, generator.as_ref()).await?;
        }
        Commands::Serve {
            bind,
            port,
            offline,
        } => {
            let resolved = CadenceConfig::resolve(Overrides { bind, port })?;
            let generator = backend::select(&resolved, offline)?;
            serve_cmd::run_serve(generator, &resolved.bind, resolved.port).await?;
        }
    }

    Ok(())
}
