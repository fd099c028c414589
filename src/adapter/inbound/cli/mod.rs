//! CLI module graph and command dispatch.

pub mod command;
pub mod config;
pub mod context;
pub mod order;
pub mod output;
pub mod paths;
pub mod report;
pub mod vault;
pub mod wallet;

use command::{Cli, Commands, ConfigCommand, OrderCommand, WalletCommand};
use output::OutputConfig;

use crate::error::Result;

/// Run a parsed command line.
///
/// Returns `Ok(false)` when the command ran but its flow failed; the
/// failure has already been printed.
///
/// # Errors
///
/// Returns an error if config loading, wiring or the session handshake fails.
pub async fn run(cli: Cli) -> Result<bool> {
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));
    output::apply_color(&cli.color);

    match cli.command {
        Commands::Snapshot(args) => vault::execute_snapshot(&args).await,
        Commands::Deposit(args) => vault::execute_deposit(&args).await,
        Commands::Withdraw(args) => vault::execute_withdraw(&args).await,
        Commands::Faucet(args) => vault::execute_faucet(&args).await,
        Commands::Order(OrderCommand::Place(args)) => order::execute_place(&args).await,
        Commands::Order(OrderCommand::Cancel(args)) => order::execute_cancel(&args).await,
        Commands::Order(OrderCommand::Depth(args)) => order::execute_depth(&args).await,
        Commands::Wallet(WalletCommand::Status(args)) => wallet::execute_status(&args).await,
        Commands::Wallet(WalletCommand::List(args)) => wallet::execute_list(&args).await,
        Commands::Wallet(WalletCommand::Watch(args)) => wallet::execute_watch(&args).await,
        Commands::Config(ConfigCommand::Show(args)) => config::execute_show(&args),
        Commands::Config(ConfigCommand::Validate(args)) => config::execute_validate(&args),
    }
}
