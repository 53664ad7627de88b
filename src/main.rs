use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use onebrc_shards::{Engine, EngineConfig};

#[derive(Debug, Parser)]
#[command(version, about = "Per-station min/mean/max temperatures", long_about = None)]
struct Cli {
    /// Measurements file, one `<station>;<temperature>` record per line
    #[arg(default_value = "./measurements.txt")]
    path: PathBuf,

    #[arg(short, long, default_value_t = num_cpus::get())]
    threads: usize,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let engine = Engine::new(EngineConfig::new(cli.threads))?;
    let result = engine
        .process_file(&cli.path)
        .with_context(|| format!("failed to aggregate {}", cli.path.display()))?;

    println!("{}", result);
    Ok(())
}
