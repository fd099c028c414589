use clap::Parser;
use hyperfill::adapter::inbound::cli::{self, command::Cli, output};
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!(error = %e, kind = %e.kind(), "Command failed");
            output::error(&e.to_string());
            std::process::exit(1);
        }
    }
}
