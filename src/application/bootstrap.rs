//! # Bootstrap
//!
//! Wires the pipeline components from an [`AppConfig`].
//!
//! Everything that can be checked before the first trade is checked here:
//! the node must answer for the configured chain, the HTTP client must
//! build, the router ABI must load and every account needs a signing
//! method. Any failure aborts the run before a single nonce is fetched.

use crate::application::services::scheduler::Scheduler;
use crate::application::services::trade_executor::{SwapRoute, TradeExecutor};
use crate::config::{AppConfig, ConfigError, RouteConfig};
use crate::domain::entities::account::Account;
use crate::infrastructure::aggregator::KrystalClient;
use crate::infrastructure::blockchain::{BlockchainError, ChainClient, EthereumClient, KeystoreDir};
use crate::infrastructure::encoding::{DirectRouter, EncodingError};
use crate::infrastructure::gas_pricing::{CachingGasPricer, MetamaskGasPricer};
use crate::infrastructure::http::{HttpClient, HttpError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Setup failures. All of them are fatal.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The node is unreachable or serves another chain.
    #[error("chain setup failed: {0}")]
    Chain(#[from] BlockchainError),

    /// The HTTP client could not be built.
    #[error("http setup failed: {0}")]
    Http(#[from] HttpError),

    /// The router ABI could not be loaded.
    #[error("router setup failed: {0}")]
    Encoding(#[from] EncodingError),
}

/// A fully wired run.
#[derive(Debug)]
pub struct App {
    /// Batch runner.
    pub scheduler: Scheduler,
    /// Accounts in configuration order.
    pub accounts: Vec<Account>,
}

/// Builds the run from configuration.
///
/// # Errors
///
/// Returns a [`BootstrapError`] if any component cannot be set up.
pub async fn build(config: &AppConfig) -> Result<App, BootstrapError> {
    config.validate()?;
    let accounts = config.to_accounts()?;

    let chain = EthereumClient::new(&config.node_rpc)?;
    chain.health_check(config.chain_id).await?;
    let chain: Arc<dyn ChainClient> = Arc::new(chain);

    let http = HttpClient::new(config.http_timeout_ms)?;
    let oracle = MetamaskGasPricer::new(&config.gas_price_endpoint, http.clone());
    let gas_pricer = Arc::new(CachingGasPricer::new(
        Arc::new(oracle),
        config.gas_price_ttl(),
    ));

    let route = build_route(&config.route, http)?;
    info!(
        chain_id = config.chain_id,
        route = route.kind(),
        accounts = accounts.len(),
        policy = %config.batch_policy,
        nonce_mode = %config.nonce_mode,
        "pipeline ready"
    );

    let executor = TradeExecutor::new(
        chain,
        gas_pricer,
        route,
        Arc::new(KeystoreDir::new(&config.keystore_dir)),
        config.to_trade_request(),
        config.receipt_poll_interval(),
    );

    let mut scheduler = Scheduler::new(Arc::new(executor), config.batch_policy);
    if let Some(start) = config.start_time {
        scheduler = scheduler.with_start_time(start);
    }

    Ok(App {
        scheduler,
        accounts,
    })
}

fn build_route(route: &RouteConfig, http: HttpClient) -> Result<SwapRoute, BootstrapError> {
    Ok(match route {
        RouteConfig::Router {
            address,
            wrapped_native,
            fee_tier,
            version,
            deadline_secs,
        } => SwapRoute::Direct(DirectRouter::new(
            *address,
            *wrapped_native,
            *fee_tier,
            *version,
            *deadline_secs,
        )?),
        RouteConfig::Aggregator {
            endpoint,
            platform_wallet,
            skip_balance_check,
        } => SwapRoute::Aggregator {
            quoter: Arc::new(KrystalClient::new(endpoint.as_str(), http)),
            platform_wallet: *platform_wallet,
            skip_balance_check: *skip_balance_check,
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::AccountConfig;
    use crate::domain::value_objects::enums::{BatchPolicy, NonceMode, RouterVersion};
    use crate::domain::value_objects::tokens::NATIVE_TOKEN;
    use crate::test_support::{KEY_ONE, addr, rpc_mock};
    use ethers::types::U256;
    use serde_json::json;
    use std::path::PathBuf;
    use wiremock::MockServer;

    fn config(node_rpc: String, route: RouteConfig) -> AppConfig {
        AppConfig {
            chain_id: 8453,
            node_rpc,
            gas_price_endpoint: "http://localhost:3000".into(),
            keystore_dir: PathBuf::from("keystore"),
            input_token: NATIVE_TOKEN,
            output_token: addr("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913"),
            slippage_bps: 50,
            gas_tip_multiplier: 1.0,
            gas_limit: 0,
            min_return_amount: None,
            start_time: None,
            nonce_mode: NonceMode::Latest,
            batch_policy: BatchPolicy::Strict,
            gas_price_ttl_ms: 1_000,
            pre_submission_timeout_secs: 30,
            confirmation_timeout_secs: 24,
            receipt_poll_interval_ms: 1_000,
            http_timeout_ms: 5_000,
            route,
            accounts: vec![AccountConfig {
                address: None,
                passphrase: None,
                amount: U256::from(1_000u64),
                recipient: None,
                max_gas_fee: None,
                min_return_amount: None,
                priv_key: Some(KEY_ONE.into()),
            }],
        }
    }

    fn router() -> RouteConfig {
        RouteConfig::Router {
            address: addr("0x2626664c2603336e57b271c5c0b26f421741e481"),
            wrapped_native: addr("0x4200000000000000000000000000000000000006"),
            fee_tier: 500,
            version: RouterVersion::V2,
            deadline_secs: 60,
        }
    }

    #[tokio::test]
    async fn wires_router_pipeline() {
        let server = MockServer::start().await;
        rpc_mock(&server, "eth_chainId", json!("0x2105")).await;

        let app = build(&config(server.uri(), router())).await.unwrap();
        assert_eq!(app.accounts.len(), 1);
        assert_eq!(app.scheduler.policy(), BatchPolicy::Strict);
    }

    #[tokio::test]
    async fn wires_aggregator_pipeline() {
        let server = MockServer::start().await;
        rpc_mock(&server, "eth_chainId", json!("0x2105")).await;
        let route = RouteConfig::Aggregator {
            endpoint: "http://localhost:4000/base/v2".into(),
            platform_wallet: addr("0x168e4c3ac8d89b00958b6be6400b066f0347ddc9"),
            skip_balance_check: true,
        };

        assert!(build(&config(server.uri(), route)).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_chain_is_fatal() {
        let server = MockServer::start().await;
        rpc_mock(&server, "eth_chainId", json!("0x1")).await;

        let err = build(&config(server.uri(), router())).await.unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::Chain(BlockchainError::ChainMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn invalid_config_fails_before_touching_the_node() {
        let server = MockServer::start().await;
        let mut invalid = config(server.uri(), router());
        invalid.slippage_bps = 20_000;

        let err = build(&invalid).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Config(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
