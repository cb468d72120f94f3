mod cli;
mod config;
mod logging;
mod report;
mod screen;

use std::process::ExitCode;

use cvmatch_logging::{cvm_error, cvm_info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = match cli::parse(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(cli::CliError::Help) => {
            println!("{}", cli::USAGE);
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => {
            eprintln!("cvmatch: {err}\n\n{}", cli::USAGE);
            return Ok(ExitCode::from(2));
        }
    };

    let (config, source) = config::load(cli.config.as_deref())?;
    logging::initialize(
        logging::LogDestination::from_config(config.log_to_file, cli.verbose),
        logging::level_for(cli.verbose),
    );
    cvm_info!("Config from {}, service at {}", source, config.base_url);

    match screen::run(cli.command, &config).await {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(err) => {
            cvm_error!("{:#}", err);
            Err(err)
        }
    }
}
