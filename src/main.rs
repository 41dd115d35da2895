use budgetsim::api::{Cli, Command, run_http_server};
use budgetsim::services::Collaborators;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            let config = match args.service_config() {
                Ok(config) => config,
                Err(msg) => {
                    eprintln!("{msg}");
                    std::process::exit(2);
                }
            };
            let services = match Collaborators::new(config) {
                Ok(services) => services,
                Err(e) => {
                    eprintln!("Failed to build HTTP client: {e}");
                    std::process::exit(1);
                }
            };
            if let Err(e) = run_http_server(args.port, services).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter)
        .init();
}
