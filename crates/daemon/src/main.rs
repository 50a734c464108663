use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::args::Args;
use cli::op::{Op, OpContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let ctx = OpContext::new(args.config_dir.clone(), args.profile());
    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG` takes precedence over `--log-level`
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}
