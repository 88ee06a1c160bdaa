//! Car price predictor entry point

use car_price::cli::{cmd_form, cmd_info, cmd_interactive, cmd_predict, cmd_serve, Cli, Commands};
use car_price::data::CarQuery;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "car_price=info".into());
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = cli.resolve_config()?;

    match cli.command {
        Some(Commands::Serve { .. }) => {
            cmd_serve(config).await?;
        }
        Some(Commands::Predict {
            city,
            fuel_type,
            body_type,
            transmission_type,
            previous_owners,
            engine_displacement,
            kilometers_driven,
            year_of_manufacture,
        }) => {
            let query = CarQuery {
                city,
                fuel_type,
                body_type,
                transmission_type,
                seats: 5,
                engine_displacement,
                kilometers_driven,
                year_of_manufacture,
                previous_owners,
            };
            cmd_predict(&config, query)?;
        }
        Some(Commands::Info) => {
            cmd_info(&config)?;
        }
        Some(Commands::Form) => {
            cmd_form(&config)?;
        }
        None => {
            cmd_interactive(config).await?;
        }
    }

    Ok(())
}
