//! # Trade Executor
//!
//! Runs one account's swap from route resolution to receipt.
//!
//! Stages move strictly forward:
//!
//! ```text
//! Start → RouteResolved → NonceFetched → Encoded → GasPriced → Signed
//!       → Submitted → Confirmed | Reverted
//! ```
//!
//! Everything up to and including broadcast runs under the pre-submission
//! deadline. Waiting for the receipt has its own, separate deadline. No
//! step is retried; any failure ends the trade with the stage reached.

use crate::application::error::{TradeError, TradeResult};
use crate::application::outcome::TradeOutcome;
use crate::domain::entities::account::Account;
use crate::domain::entities::trade::{TradeRequest, TradeStage};
use crate::domain::value_objects::slippage::{apply_slippage, effective_min_return};
use crate::infrastructure::aggregator::{BuildTxRequest, RateRequest, SwapQuoter, best_rate};
use crate::infrastructure::blockchain::{
    ChainClient, GasEstimator, KeystoreDir, ReceiptWaiter, TxSigner, signer_for,
};
use crate::infrastructure::encoding::DirectRouter;
use crate::infrastructure::gas_pricing::GasPricer;
use crate::infrastructure::retry::PollError;
use chrono::Utc;
use ethers::types::{Address, H256, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// How the unsigned swap call is obtained.
#[derive(Debug, Clone)]
pub enum SwapRoute {
    /// Encode a router call locally.
    Direct(DirectRouter),
    /// Quote and build through an aggregator.
    Aggregator {
        /// Aggregator client.
        quoter: Arc<dyn SwapQuoter>,
        /// Integrator fee wallet.
        platform_wallet: Address,
        /// Ask the aggregator to skip its balance check.
        skip_balance_check: bool,
    },
}

impl SwapRoute {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Direct(_) => "router",
            Self::Aggregator { .. } => "aggregator",
        }
    }
}

/// Where a trade got to before it stopped.
#[derive(Debug, Clone, Copy)]
struct Progress {
    stage: TradeStage,
    tx_hash: Option<H256>,
}

impl Progress {
    fn advance(&mut self, stage: TradeStage) {
        debug!(from = %self.stage, to = %stage, "stage transition");
        self.stage = stage;
    }
}

/// What route resolution produced.
#[derive(Debug)]
struct ResolvedRoute {
    signer: Arc<dyn TxSigner>,
    sender: Address,
    recipient: Address,
    min_amount_out: U256,
    hint: Option<String>,
}

/// Executes trades for individual accounts.
///
/// Shared between all account tasks of a batch; holds no per-trade state.
#[derive(Debug)]
pub struct TradeExecutor {
    chain: Arc<dyn ChainClient>,
    gas_pricer: Arc<dyn GasPricer>,
    route: SwapRoute,
    keystore: Arc<KeystoreDir>,
    request: TradeRequest,
    receipts: ReceiptWaiter,
    gas_estimator: GasEstimator,
}

impl TradeExecutor {
    /// Creates an executor.
    #[must_use]
    pub fn new(
        chain: Arc<dyn ChainClient>,
        gas_pricer: Arc<dyn GasPricer>,
        route: SwapRoute,
        keystore: Arc<KeystoreDir>,
        request: TradeRequest,
        receipt_poll_interval: Duration,
    ) -> Self {
        let receipts = ReceiptWaiter::new(Arc::clone(&chain), receipt_poll_interval);
        Self {
            chain,
            gas_pricer,
            route,
            keystore,
            request,
            receipts,
            gas_estimator: GasEstimator::default(),
        }
    }

    /// Returns the trade parameters.
    #[must_use]
    pub fn request(&self) -> &TradeRequest {
        &self.request
    }

    /// Returns the route.
    #[must_use]
    pub fn route(&self) -> &SwapRoute {
        &self.route
    }

    /// Runs the full pipeline for one account.
    ///
    /// Never fails: every error is captured in the returned outcome.
    pub async fn execute(&self, account: &Account) -> TradeOutcome {
        let span = info_span!(
            "trade",
            account = %account.label(),
            route = self.route.kind(),
        );

        async {
            let mut progress = Progress {
                stage: TradeStage::Start,
                tx_hash: None,
            };
            let deadline = self.request.pre_submission_timeout;

            let submitted = timeout(deadline, self.submit(account, &mut progress)).await;
            let tx_hash = match submitted {
                Ok(Ok(tx_hash)) => tx_hash,
                Ok(Err(error)) => return Self::failed(progress, error),
                Err(_) => {
                    if progress.tx_hash.is_some() {
                        warn!(
                            tx_hash = ?progress.tx_hash,
                            "deadline hit during broadcast, transaction may be in the mempool"
                        );
                    }
                    return Self::failed(progress, TradeError::PreSubmissionTimeout(deadline));
                }
            };

            self.confirm(tx_hash).await
        }
        .instrument(span)
        .await
    }

    fn failed(progress: Progress, error: TradeError) -> TradeOutcome {
        error!(
            stage = %progress.stage,
            kind = error.kind(),
            error = %error,
            "trade failed"
        );
        TradeOutcome::Failed {
            stage: progress.stage,
            tx_hash: progress.tx_hash,
            error,
        }
    }

    /// Resolution through broadcast. Returns the broadcast hash.
    async fn submit(&self, account: &Account, progress: &mut Progress) -> TradeResult<H256> {
        let request = &self.request;
        let route = self.resolve_route(account).await?;
        progress.advance(TradeStage::RouteResolved);
        info!(
            sender = ?route.sender,
            recipient = ?route.recipient,
            amount_in = %account.input_amount(),
            min_amount_out = %route.min_amount_out,
            "route resolved"
        );

        let nonce = self.chain.get_nonce(route.sender, request.nonce_mode).await?;
        progress.advance(TradeStage::NonceFetched);
        debug!(nonce, mode = %request.nonce_mode, "nonce fetched");

        let call = match &self.route {
            SwapRoute::Direct(router) => router.build_call(
                route.sender,
                request.token_in,
                request.token_out,
                route.recipient,
                account.input_amount(),
                route.min_amount_out,
                unix_now(),
            )?,
            SwapRoute::Aggregator {
                quoter,
                platform_wallet,
                skip_balance_check,
            } => {
                quoter
                    .build_tx(&BuildTxRequest {
                        token_in: request.token_in,
                        token_out: request.token_out,
                        amount_in: account.input_amount(),
                        min_amount_out: route.min_amount_out,
                        platform_wallet: *platform_wallet,
                        user: route.sender,
                        hint: route.hint.clone().unwrap_or_default(),
                        nonce,
                        skip_balance_check: *skip_balance_check,
                    })
                    .await?
            }
        };
        progress.advance(TradeStage::Encoded);
        debug!(to = ?call.to, value = %call.value, data_len = call.data.len(), "swap call built");

        let gas_limit = match self.gas_estimator.override_limit(request.gas_limit_override) {
            Some(limit) => limit,
            None => {
                let estimate = self.chain.estimate_gas(&call).await?;
                self.gas_estimator.apply_buffer(estimate)
            }
        };
        let quote = self.gas_pricer.gas_price().await?;
        let fees = quote.fee_caps(gas_limit, account.max_gas_fee(), request.gas_tip_multiplier)?;
        if fees.tip_exceeds_cap() {
            warn!(
                max_fee = %fees.max_fee_per_gas,
                tip = %fees.max_priority_fee_per_gas,
                "priority fee exceeds fee cap"
            );
        }
        progress.advance(TradeStage::GasPriced);
        info!(
            gas_limit,
            max_fee_per_gas = %fees.max_fee_per_gas,
            max_priority_fee_per_gas = %fees.max_priority_fee_per_gas,
            max_cost = %fees.max_cost(gas_limit),
            "gas priced"
        );

        let tx = call.to_fee_market_tx(request.chain_id, nonce, gas_limit, &fees);
        let signed = route.signer.sign(tx, request.chain_id).await?;
        progress.tx_hash = Some(signed.hash());
        progress.advance(TradeStage::Signed);

        let tx_hash = match self.chain.send_raw_transaction(&signed).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                match signed.sender() {
                    Ok(sender) => error!(sender = ?sender, nonce, error = %e, "broadcast rejected"),
                    Err(recover) => {
                        error!(error = %e, recover_error = %recover, "broadcast rejected")
                    }
                }
                return Err(e.into());
            }
        };
        progress.tx_hash = Some(tx_hash);
        progress.advance(TradeStage::Submitted);
        info!(tx_hash = ?tx_hash, nonce, "transaction submitted");

        Ok(tx_hash)
    }

    /// Builds the signer and works out recipient and minimum output.
    async fn resolve_route(&self, account: &Account) -> TradeResult<ResolvedRoute> {
        let signer = signer_for(account.signing(), &self.keystore)?;
        let sender = signer.address();
        let recipient = account.effective_recipient(sender);
        let floor = self.request.min_return_floor(account);

        match &self.route {
            SwapRoute::Direct(_) => Ok(ResolvedRoute {
                signer,
                sender,
                recipient,
                min_amount_out: floor.unwrap_or_default(),
                hint: None,
            }),
            SwapRoute::Aggregator {
                quoter,
                platform_wallet,
                ..
            } => {
                if recipient != sender {
                    warn!(
                        recipient = ?recipient,
                        "aggregator routes pay the sender, recipient override ignored"
                    );
                }
                let rates = quoter
                    .get_rates(&RateRequest {
                        token_in: self.request.token_in,
                        token_out: self.request.token_out,
                        amount_in: account.input_amount(),
                        platform_wallet: *platform_wallet,
                        user: sender,
                    })
                    .await?;
                let (best, quoted) = best_rate(&rates)?;
                let with_slippage = apply_slippage(quoted, self.request.slippage_bps);
                let min_amount_out = effective_min_return(with_slippage, floor);
                debug!(
                    platform = %best.platform,
                    quoted = %quoted,
                    slippage_bps = self.request.slippage_bps,
                    "best rate selected"
                );

                Ok(ResolvedRoute {
                    signer,
                    sender,
                    recipient: sender,
                    min_amount_out,
                    hint: Some(best.hint.clone()),
                })
            }
        }
    }

    /// Waits for the receipt and classifies the result.
    async fn confirm(&self, tx_hash: H256) -> TradeOutcome {
        match self
            .receipts
            .wait(tx_hash, self.request.confirmation_timeout)
            .await
        {
            Ok(receipt) if receipt.success => {
                info!(tx_hash = ?tx_hash, block = receipt.block_number, "trade confirmed");
                TradeOutcome::Confirmed { tx_hash, receipt }
            }
            Ok(receipt) => {
                error!(tx_hash = ?tx_hash, block = receipt.block_number, "transaction reverted");
                TradeOutcome::Reverted { tx_hash, receipt }
            }
            Err(PollError::DeadlineExceeded { waited }) => {
                warn!(tx_hash = ?tx_hash, waited = ?waited, "receipt not observed in time");
                TradeOutcome::Unconfirmed {
                    tx_hash,
                    error: TradeError::ConfirmationTimeout { tx_hash, waited },
                }
            }
            Err(PollError::Aborted(e)) => Self::failed(
                Progress {
                    stage: TradeStage::Submitted,
                    tx_hash: Some(tx_hash),
                },
                e.into(),
            ),
        }
    }
}

fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::account::SigningMethod;
    use crate::domain::value_objects::enums::{NonceMode, RouterVersion};
    use crate::domain::value_objects::tokens::NATIVE_TOKEN;
    use crate::infrastructure::encoding::{ExactInputSingle, SwapEncoder};
    use crate::test_support::{
        KEY_ONE, KEY_ONE_ADDRESS, MOCK_AGGREGATOR_ROUTER, MockChain, MockGasPricer, MockQuoter,
        addr,
    };
    use ethers::abi::{ParamType, Token, decode};

    const ROUTER: &str = "0x2626664c2603336E57B271c5C0b26F421741e481";
    const WETH: &str = "0x4200000000000000000000000000000000000006";
    const TOKEN_X: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
    const AMOUNT: u64 = 3_000_000_000_000_000;

    struct Harness {
        chain: Arc<MockChain>,
        pricer: Arc<MockGasPricer>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                chain: Arc::new(MockChain::new()),
                pricer: Arc::new(MockGasPricer::new(30.0, 1.5)),
            }
        }

        fn executor(&self, route: SwapRoute, request: TradeRequest) -> TradeExecutor {
            TradeExecutor::new(
                self.chain.clone(),
                self.pricer.clone(),
                route,
                Arc::new(KeystoreDir::new("/nonexistent")),
                request,
                Duration::from_secs(1),
            )
        }
    }

    fn direct_route() -> SwapRoute {
        SwapRoute::Direct(
            DirectRouter::new(addr(ROUTER), addr(WETH), 500, RouterVersion::V2, 60).unwrap(),
        )
    }

    fn aggregator_route(quoter: &Arc<MockQuoter>) -> SwapRoute {
        SwapRoute::Aggregator {
            quoter: quoter.clone(),
            platform_wallet: Address::repeat_byte(0x55),
            skip_balance_check: false,
        }
    }

    fn native_to_x() -> TradeRequest {
        TradeRequest::new(8453, NATIVE_TOKEN, addr(TOKEN_X))
    }

    fn account() -> Account {
        Account::new(0, SigningMethod::RawKey(KEY_ONE.to_string()), U256::from(AMOUNT))
    }

    fn decode_v2(data: &[u8]) -> Vec<Token> {
        let tuple = ParamType::Tuple(vec![
            ParamType::Address,
            ParamType::Address,
            ParamType::Uint(24),
            ParamType::Address,
            ParamType::Uint(256),
            ParamType::Uint(256),
            ParamType::Uint(160),
        ]);
        match decode(&[tuple], &data[4..]).unwrap().pop() {
            Some(Token::Tuple(fields)) => fields,
            other => unreachable!("unexpected decode result {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn direct_native_swap_end_to_end() {
        let harness = Harness::new();
        harness.chain.set_nonce(addr(KEY_ONE_ADDRESS), 7);
        let executor = harness.executor(direct_route(), native_to_x().with_gas_tip_multiplier(2.0));

        let outcome = executor.execute(&account()).await;
        assert!(outcome.is_success(), "{outcome}");

        let sent = harness.chain.sent();
        assert_eq!(sent.len(), 1);
        let tx = &sent[0];
        assert_eq!(tx.to(), Some(addr(ROUTER)));
        assert_eq!(tx.value(), U256::from(AMOUNT));
        assert_eq!(tx.nonce(), U256::from(7));
        assert_eq!(tx.chain_id(), 8453);
        assert_eq!(tx.sender().unwrap(), addr(KEY_ONE_ADDRESS));
        // 150_000 estimate plus 20%
        assert_eq!(tx.gas_limit(), U256::from(180_000));
        assert_eq!(tx.fee_caps().max_fee_per_gas, U256::from(30_000_000_000u64));
        assert_eq!(tx.fee_caps().max_priority_fee_per_gas, U256::from(3_000_000_000u64));

        let fields = decode_v2(&tx.data());
        assert_eq!(fields[0], Token::Address(addr(WETH)));
        assert_eq!(fields[1], Token::Address(addr(TOKEN_X)));
        assert_eq!(fields[2], Token::Uint(U256::from(500)));
        assert_eq!(fields[3], Token::Address(addr(KEY_ONE_ADDRESS)));
        assert_eq!(fields[4], Token::Uint(U256::from(AMOUNT)));

        let expected = SwapEncoder::new(RouterVersion::V2)
            .encode(&ExactInputSingle {
                token_in: addr(WETH),
                token_out: addr(TOKEN_X),
                fee: 500,
                recipient: addr(KEY_ONE_ADDRESS),
                amount_in: U256::from(AMOUNT),
                amount_out_minimum: U256::zero(),
                deadline: None,
            })
            .unwrap();
        assert_eq!(tx.data(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn aggregator_without_rates_fails_before_nonce() {
        let harness = Harness::new();
        let quoter = Arc::new(MockQuoter::with_amounts(&[]));
        let executor = harness.executor(aggregator_route(&quoter), native_to_x());

        let outcome = executor.execute(&account()).await;
        match outcome {
            TradeOutcome::Failed { stage, tx_hash, error } => {
                assert_eq!(stage, TradeStage::Start);
                assert_eq!(tx_hash, None);
                assert!(matches!(error, TradeError::NoRoute(_)));
            }
            other => unreachable!("unexpected outcome {other}"),
        }
        assert_eq!(harness.chain.nonce_calls(), 0);
        assert!(harness.chain.sent().is_empty());
        assert!(quoter.builds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn aggregator_applies_slippage_and_passes_nonce() {
        let harness = Harness::new();
        harness.chain.set_nonce(addr(KEY_ONE_ADDRESS), 12);
        let quoter = Arc::new(MockQuoter::with_amounts(&["1000000", "990000"]));
        let executor = harness.executor(
            aggregator_route(&quoter),
            native_to_x().with_slippage_bps(50),
        );

        let outcome = executor.execute(&account()).await;
        assert!(outcome.is_success(), "{outcome}");

        let builds = quoter.builds();
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].nonce, 12);
        assert_eq!(builds[0].hint, "hint-0");
        assert_eq!(builds[0].min_amount_out, U256::from(995_000u64));
        assert_eq!(harness.chain.sent()[0].to(), Some(addr(MOCK_AGGREGATOR_ROUTER)));
    }

    #[tokio::test(start_paused = true)]
    async fn account_floor_beats_weaker_slippage_minimum() {
        let harness = Harness::new();
        let quoter = Arc::new(MockQuoter::with_amounts(&["1000000"]));
        let executor = harness.executor(
            aggregator_route(&quoter),
            native_to_x().with_slippage_bps(500),
        );
        let strict = account().with_min_return_amount(U256::from(980_000u64));

        executor.execute(&strict).await;
        assert_eq!(quoter.builds()[0].min_amount_out, U256::from(980_000u64));

        let lenient = account().with_min_return_amount(U256::from(10u64));
        executor.execute(&lenient).await;
        assert_eq!(quoter.builds()[1].min_amount_out, U256::from(950_000u64));
    }

    #[tokio::test(start_paused = true)]
    async fn override_is_clamped_and_budget_caps_fee() {
        let harness = Harness::new();
        let executor = harness.executor(
            direct_route(),
            native_to_x().with_gas_limit_override(u64::MAX),
        );
        let budget = U256::from(100_000_000_000_000u64);
        let account = account().with_max_gas_fee(budget);

        let outcome = executor.execute(&account).await;
        assert!(outcome.is_success());
        assert_eq!(harness.chain.estimate_calls(), 0);

        let tx = &harness.chain.sent()[0];
        assert_eq!(tx.gas_limit(), U256::from(20_000_000u64));
        assert_eq!(tx.fee_caps().max_fee_per_gas, budget / U256::from(20_000_000u64));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_nonce_mode_is_used() {
        let harness = Harness::new();
        let executor = harness.executor(
            direct_route(),
            native_to_x().with_nonce_mode(NonceMode::Pending),
        );
        executor.execute(&account()).await;
        assert_eq!(
            harness.chain.nonce_requests(),
            vec![(addr(KEY_ONE_ADDRESS), NonceMode::Pending)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_receipt_is_reported() {
        let harness = Harness::new();
        harness.chain.set_receipt_status(false);
        let executor = harness.executor(direct_route(), native_to_x());

        let outcome = executor.execute(&account()).await;
        assert!(matches!(outcome, TradeOutcome::Reverted { .. }));
        assert!(matches!(outcome.error(), Some(TradeError::Reverted(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_receipt_is_unconfirmed() {
        let harness = Harness::new();
        harness.chain.set_receipt_misses(u32::MAX);
        let executor = harness.executor(direct_route(), native_to_x());

        let outcome = executor.execute(&account()).await;
        match outcome {
            TradeOutcome::Unconfirmed { tx_hash, error } => {
                assert_eq!(Some(tx_hash), harness.chain.sent().first().map(|tx| tx.hash()));
                assert!(matches!(error, TradeError::ConfirmationTimeout { .. }));
            }
            other => unreachable!("unexpected outcome {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_broadcast_keeps_hash() {
        let harness = Harness::new();
        harness.chain.fail_submission();
        let executor = harness.executor(direct_route(), native_to_x());

        let outcome = executor.execute(&account()).await;
        match outcome {
            TradeOutcome::Failed { stage, tx_hash, error } => {
                assert_eq!(stage, TradeStage::Signed);
                assert!(tx_hash.is_some());
                assert!(matches!(error, TradeError::Submission(_)));
            }
            other => unreachable!("unexpected outcome {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn estimation_failure_is_terminal() {
        let harness = Harness::new();
        harness.chain.fail_estimate();
        let executor = harness.executor(direct_route(), native_to_x());

        let outcome = executor.execute(&account()).await;
        assert!(matches!(
            outcome,
            TradeOutcome::Failed {
                stage: TradeStage::Encoded,
                error: TradeError::Estimation(_),
                ..
            }
        ));
        assert!(harness.chain.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_key_fails_only_at_start() {
        let harness = Harness::new();
        let executor = harness.executor(direct_route(), native_to_x());
        let bad = Account::new(0, SigningMethod::RawKey("zz".into()), U256::one());

        let outcome = executor.execute(&bad).await;
        assert!(matches!(
            outcome,
            TradeOutcome::Failed {
                stage: TradeStage::Start,
                error: TradeError::Key(_),
                ..
            }
        ));
        assert_eq!(harness.chain.nonce_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_broadcast_hits_pre_submission_deadline() {
        let harness = Harness::new();
        harness.chain.set_send_delay(Duration::from_secs(60));
        let executor = harness.executor(direct_route(), native_to_x());

        let outcome = executor.execute(&account()).await;
        match outcome {
            TradeOutcome::Failed { stage, tx_hash, error } => {
                assert_eq!(stage, TradeStage::Signed);
                assert!(tx_hash.is_some());
                assert!(matches!(error, TradeError::PreSubmissionTimeout(_)));
            }
            other => unreachable!("unexpected outcome {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn gas_price_failure_is_terminal() {
        let harness = Harness::new();
        harness.pricer.set_failing(true);
        let executor = harness.executor(direct_route(), native_to_x());

        let outcome = executor.execute(&account()).await;
        assert!(matches!(
            outcome,
            TradeOutcome::Failed {
                error: TradeError::GasPrice(_),
                ..
            }
        ));
    }
}
