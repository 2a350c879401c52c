use anyhow::{Context, Result};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::env;
use thsr_presale::cli::{is_help_flag, print_help};
use thsr_presale::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() > 1 && is_help_flag(&args[1]) {
        print_help("thsr-presale");
        return Ok(());
    }

    let config = Config::from_env().context("Failed to load configuration")?;

    TermLogger::init(
        config.log_level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialise logging")?;

    let summary = thsr_presale::pipeline::run(&config)
        .await
        .context("Presale sync failed")?;

    println!("{}", summary);
    Ok(())
}
