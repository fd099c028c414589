//! Command-line interface definitions.
//!
//! Defines the CLI structure for the hyperfill application using `clap`.
//! Every command that touches the ledger takes `--config` and `--provider`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::paths;
use crate::domain::order::{Restriction, Side};

/// Hyperfill vault and order-book client
#[derive(Parser, Debug)]
#[command(name = "hyperfill")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read the vault snapshot for the connected account
    Snapshot(SessionArgs),

    /// Deposit vault tokens
    Deposit(DepositArgs),

    /// Withdraw profits and shares from the vault
    Withdraw(SessionArgs),

    /// Mint test tokens from the faucet
    Faucet(FaucetArgs),

    /// Place, cancel and inspect limit orders
    #[command(subcommand)]
    Order(OrderCommand),

    /// Inspect wallet providers and the session
    #[command(subcommand)]
    Wallet(WalletCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `hyperfill order`.
#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Place a limit order on the configured market.
    Place(OrderPlaceArgs),
    /// Cancel a resting order.
    Cancel(OrderCancelArgs),
    /// Show order-book depth.
    Depth(DepthArgs),
}

/// Subcommands for `hyperfill wallet`.
#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    /// Connect and display the session.
    Status(SessionArgs),
    /// List configured providers and the wallets each one exposes.
    List(SessionArgs),
    /// Follow account changes until interrupted.
    Watch(WatchArgs),
}

/// Subcommands for `hyperfill config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show(SessionArgs),
    /// Validate a configuration file for correctness.
    Validate(SessionArgs),
}

/// Configuration path and provider selection shared by every command.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Wallet provider id; defaults to `wallet.default_provider`.
    #[arg(short, long)]
    pub provider: Option<String>,
}

/// Arguments for `deposit`.
#[derive(Parser, Debug)]
pub struct DepositArgs {
    /// Amount in token units (e.g. "50" or "12.5").
    pub amount: String,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// Arguments for `faucet`.
#[derive(Parser, Debug)]
pub struct FaucetArgs {
    /// Amount in token units; defaults to 1000.
    pub amount: Option<String>,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// Arguments for `order place`.
#[derive(Parser, Debug)]
pub struct OrderPlaceArgs {
    /// Order side: bid or ask.
    #[arg(long)]
    pub side: Side,

    /// Limit price in quote units.
    #[arg(long)]
    pub price: String,

    /// Size in lots; fractional input is truncated.
    #[arg(long)]
    pub size: String,

    /// Time-in-force: none, fok, ioc or post_only.
    #[arg(long, default_value = "none")]
    pub restriction: Restriction,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// Arguments for `order cancel`.
#[derive(Parser, Debug)]
pub struct OrderCancelArgs {
    /// Order id returned at placement.
    #[arg(long)]
    pub id: u64,

    /// Side the order rests on.
    #[arg(long)]
    pub side: Side,

    /// Price the order rests at.
    #[arg(long)]
    pub price: String,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// Arguments for `order depth`.
#[derive(Parser, Debug)]
pub struct DepthArgs {
    /// Price levels per side; defaults to 10.
    #[arg(long)]
    pub levels: Option<u32>,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// Arguments for `wallet watch`.
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Account poll interval in milliseconds.
    #[arg(long, default_value_t = 2_000)]
    pub interval_ms: u64,

    #[command(flatten)]
    pub session: SessionArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_name() {
        assert_eq!(Cli::command().get_name(), "hyperfill");
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["hyperfill", "withdraw", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Withdraw(_)));
    }

    #[test]
    fn deposit_takes_amount_and_provider() {
        let cli =
            Cli::try_parse_from(["hyperfill", "deposit", "50", "--provider", "petra"]).unwrap();
        let Commands::Deposit(args) = cli.command else {
            panic!("expected deposit");
        };
        assert_eq!(args.amount, "50");
        assert_eq!(args.session.provider.as_deref(), Some("petra"));
        assert!(args.session.config.ends_with("config.toml"));
    }

    #[test]
    fn faucet_amount_is_optional() {
        let cli = Cli::try_parse_from(["hyperfill", "faucet"]).unwrap();
        let Commands::Faucet(args) = cli.command else {
            panic!("expected faucet");
        };
        assert!(args.amount.is_none());
    }

    #[test]
    fn order_place_parses_side_and_restriction() {
        let cli = Cli::try_parse_from([
            "hyperfill",
            "order",
            "place",
            "--side",
            "bid",
            "--price",
            "12.34",
            "--size",
            "7",
            "--restriction",
            "ioc",
        ])
        .unwrap();
        let Commands::Order(OrderCommand::Place(args)) = cli.command else {
            panic!("expected order place");
        };
        assert_eq!(args.side, Side::Bid);
        assert_eq!(args.restriction, Restriction::ImmediateOrCancel);
        assert_eq!(args.price, "12.34");
    }

    #[test]
    fn order_place_restriction_defaults_to_none() {
        let cli = Cli::try_parse_from([
            "hyperfill", "order", "place", "--side", "ask", "--price", "1", "--size", "1",
        ])
        .unwrap();
        let Commands::Order(OrderCommand::Place(args)) = cli.command else {
            panic!("expected order place");
        };
        assert_eq!(args.restriction, Restriction::None);
    }

    #[test]
    fn unknown_side_is_rejected() {
        let result = Cli::try_parse_from([
            "hyperfill", "order", "place", "--side", "sideways", "--price", "1", "--size", "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn order_cancel_requires_id() {
        let result =
            Cli::try_parse_from(["hyperfill", "order", "cancel", "--side", "bid", "--price", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn config_validate_accepts_path() {
        let cli =
            Cli::try_parse_from(["hyperfill", "config", "validate", "-c", "/tmp/h.toml"]).unwrap();
        let Commands::Config(ConfigCommand::Validate(args)) = cli.command else {
            panic!("expected config validate");
        };
        assert_eq!(args.config, PathBuf::from("/tmp/h.toml"));
    }

    #[test]
    fn color_choice_parses() {
        let cli = Cli::try_parse_from(["hyperfill", "--color", "never", "snapshot"]).unwrap();
        assert!(matches!(cli.color, ColorChoice::Never));
    }
}
