use std::process;
use clap::Parser;

use security_feed::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.run().await {
        tracing::error!(code = e.error_code(), "{}", e);
        eprintln!("Error: {}", e);
        if e.is_user_error() {
            eprintln!("Check the configuration file and command-line arguments.");
        }
        process::exit(1);
    }
}
