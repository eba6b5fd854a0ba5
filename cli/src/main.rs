mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, regions, scan};
use tagscan_common::config::DEFAULT_REGION;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);
    print::banner(commands.no_banner, commands.quiet);

    match &commands.command {
        Commands::Scan(args) => {
            let cfg = args.to_config()?;
            cfg.validate()?;
            let provider = commands.provider(args.home_region())?;

            print::header("starting tag scan", commands.quiet);
            scan::scan(provider, &cfg, commands.quiet).await
        }
        Commands::Regions => {
            let provider = commands.provider(DEFAULT_REGION)?;
            regions::regions(provider, commands.quiet).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
