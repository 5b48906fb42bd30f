use std::process::ExitCode;

use clap::Parser;

use ipgeo::cli::{Cli, Commands};
use ipgeo::config::StaticConfig;
use ipgeo::errors::IpGeoError;
use ipgeo::runtime::modes;
use ipgeo::system::logging::init_logging;

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = StaticConfig::load(cli.config.as_deref());
    cli.apply_overrides(&mut config);

    let result = match cli.command {
        Some(Commands::GenerateConfig { ref output }) => {
            modes::cli::generate_config(output.as_deref())
        }
        Some(Commands::Lookup { ref ip, ref lang }) => {
            modes::cli::lookup(&config, ip, lang.as_deref()).await
        }
        None => {
            let _guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("{:#}", e);
                    return ExitCode::FAILURE;
                }
            };
            modes::run_server(config).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.chain().find_map(|cause| cause.downcast_ref::<IpGeoError>()) {
                Some(err) => eprintln!("{}", err.format_colored()),
                None => eprintln!("{:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
