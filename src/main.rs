use clap::{Parser, Subcommand};
use swr::api::{SimulationArgs, run_http_server};

#[derive(Parser, Debug)]
#[command(
    name = "swr",
    about = "Historical safe withdrawal rate backtester for multi-asset portfolios"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the simulation HTTP API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[command(flatten)]
        defaults: SimulationArgs,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    match Cli::parse().command {
        Command::Serve { port, defaults } => {
            if let Err(e) = run_http_server(port, defaults).await {
                log::error!("Server error: {e}");
                std::process::exit(1);
            }
        }
    }
}
