//! Handlers for the `config` command group.

use std::path::Path;

use serde_json::json;

use super::command::SessionArgs;
use super::context::resolve_provider;
use super::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute `config show`.
pub fn execute_show(args: &SessionArgs) -> Result<bool> {
    let config = Config::load(&args.config)?;
    let provider = resolve_provider(&config, args.provider.as_deref()).ok();

    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "path": args.config.display().to_string(),
            "network": {
                "name": config.network.name,
                "node_url": config.network.node_url,
                "chain_id": config.network.chain_id,
            },
            "contracts": {
                "vault": format!("{}::{}", config.contracts.vault_address, config.contracts.vault_module),
                "token_type": config.contracts.token_type,
                "base_asset": config.contracts.base_asset,
                "orderbook": format!("{}::{}", config.contracts.orderbook_address, config.contracts.orderbook_module),
                "user_resource": config.contracts.user_resource_type(),
            },
            "market": {
                "owner": config.market.owner,
                "base_type": config.market.base_type,
                "quote_type": config.market.quote_type,
                "price_decimals": config.market.price_decimals,
            },
            "assets": {
                "token_decimals": config.assets.token_decimals,
                "base_decimals": config.assets.base_decimals,
                "share_price_decimals": config.assets.share_price_decimals,
            },
            "providers": config.wallet.providers.iter().map(|p| p.id.clone()).collect::<Vec<_>>(),
            "selected_provider": provider,
        }));
        return Ok(true);
    }

    output::section("Effective Configuration");
    output::field("Path", args.config.display());

    output::section("Network");
    output::field("Name", &config.network.name);
    output::field("Node", &config.network.node_url);
    output::field("Chain ID", config.network.chain_id);
    output::field(
        "Finality wait",
        format!(
            "{}ms (poll {}ms)",
            config.gateway.confirmation_timeout_ms, config.gateway.poll_interval_ms
        ),
    );

    output::section("Contracts");
    output::field(
        "Vault",
        format!("{}::{}", config.contracts.vault_address, config.contracts.vault_module),
    );
    output::field("Token", &config.contracts.token_type);
    output::field("Base asset", &config.contracts.base_asset);
    output::field(
        "Order book",
        format!(
            "{}::{}",
            config.contracts.orderbook_address, config.contracts.orderbook_module
        ),
    );
    output::field("User resource", config.contracts.user_resource_type());

    output::section("Market");
    output::field("Base", &config.market.base_type);
    output::field("Quote", &config.market.quote_type);
    output::field("Price scale", config.market.price_decimals);

    output::section("Wallet");
    if config.wallet.providers.is_empty() {
        output::warning("no providers configured");
    }
    for provider_config in &config.wallet.providers {
        let selected = provider.as_deref() == Some(provider_config.id.as_str());
        let marker = if selected { " (selected)" } else { "" };
        output::field(
            &format!("{}{marker}", provider_config.id),
            format!(
                "{} {}",
                provider_config.bridge_url,
                output::muted(provider_config.dialect)
            ),
        );
    }
    if let Some(wallet) = &config.wallet.default_wallet {
        output::field("Prefers", wallet);
    }

    Ok(true)
}

/// Execute `config validate`.
pub fn execute_validate(args: &SessionArgs) -> Result<bool> {
    let path: &Path = &args.config;
    if !output::is_json() {
        output::section("Config Validation");
        output::field("Path", path.display());
    }
    let config = Config::load(path)?;
    let warnings = lint(&config);

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "path": path.display().to_string(),
            "valid": true,
            "warnings": warnings,
        }));
        return Ok(true);
    }

    output::success("Config file is valid");
    if !warnings.is_empty() {
        output::section("Warnings");
        for warning in &warnings {
            output::warning(warning);
        }
    }
    output::hint(&format!(
        "run {}",
        output::highlight(format!("hyperfill config show -c {}", path.display()))
    ));
    Ok(true)
}

/// Non-fatal observations about a valid config.
fn lint(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.wallet.providers.is_empty() {
        warnings.push("no wallet providers configured; only reads will work".to_string());
    }
    if config.market.owner.trim().is_empty() {
        warnings.push("market.owner is empty; order commands will fail".to_string());
    }
    if config.gateway.poll_interval_ms >= config.gateway.confirmation_timeout_ms {
        warnings.push("poll interval is not shorter than the finality timeout".to_string());
    }
    warnings
}
