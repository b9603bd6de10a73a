//! In-memory doubles for the chain, fee oracle and aggregator, plus key
//! fixtures shared by unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::domain::entities::gas_quote::GasQuote;
use crate::domain::entities::transaction::{SignedTransaction, UnsignedCall};
use crate::domain::value_objects::enums::NonceMode;
use crate::infrastructure::aggregator::{
    AggregatorError, AggregatorResult, BuildTxRequest, Rate, RateRequest, SwapQuoter, TxObject,
};
use crate::infrastructure::blockchain::{BlockchainError, BlockchainResult, ChainClient, TxReceipt};
use crate::infrastructure::gas_pricing::{GasPriceError, GasPriceResult, GasPricer};
use crate::infrastructure::http::HttpError;
use async_trait::async_trait;
use ethers::signers::LocalWallet;
use ethers::types::{Address, Bytes, H256, U256};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Private key `1`.
pub const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
/// Address of [`KEY_ONE`].
pub const KEY_ONE_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";
/// Private key `2`.
pub const KEY_TWO: &str = "0000000000000000000000000000000000000000000000000000000000000002";
/// Address of [`KEY_TWO`].
pub const KEY_TWO_ADDRESS: &str = "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF";
/// Private key `3`.
pub const KEY_THREE: &str = "0000000000000000000000000000000000000000000000000000000000000003";
/// Address of [`KEY_THREE`].
pub const KEY_THREE_ADDRESS: &str = "0x6813Eb9362372EEF6200f3b1dbC3f819671cBA69";

/// Parses a fixture address.
pub fn addr(hex: &str) -> Address {
    hex.parse().unwrap()
}

/// Writes an encrypted keystore for `key_hex` into `dir`.
///
/// With `address_in_json` the file gets a random name and an `address`
/// field; otherwise it gets a geth-style `UTC--...--<address>` name and
/// no address field.
pub fn write_keystore(dir: &Path, key_hex: &str, passphrase: &str, address_in_json: bool) -> Address {
    let key = ethers::utils::hex::decode(key_hex).unwrap();
    let mut rng = ethers::core::rand::thread_rng();
    let (wallet, name) =
        LocalWallet::encrypt_keystore(dir, &mut rng, key, passphrase, None).unwrap();
    let address = ethers::signers::Signer::address(&wallet);
    let path = dir.join(&name);

    let mut json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let object = json.as_object_mut().unwrap();
    if address_in_json {
        object.insert("address".into(), format!("{:x}", address).into());
        std::fs::write(&path, json.to_string()).unwrap();
    } else {
        object.remove("address");
        std::fs::remove_file(&path).unwrap();
        let geth_name = format!("UTC--2024-05-01T10-00-00.000000000Z--{:x}", address);
        std::fs::write(dir.join(geth_name), json.to_string()).unwrap();
    }
    address
}

/// Answers a JSON-RPC call with a fixed result, echoing the request id.
pub struct RpcResult(pub Value);

impl Respond for RpcResult {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": body.get("id").cloned().unwrap_or(json!(1)),
            "result": self.0,
        }))
    }
}

/// Mounts a JSON-RPC answer for `rpc_method`.
pub async fn rpc_mock(server: &MockServer, rpc_method: &str, result: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(RpcResult(result))
        .mount(server)
        .await;
}

#[derive(Debug, Default)]
struct ChainState {
    nonces: HashMap<Address, u64>,
    failing_nonce: HashSet<Address>,
    nonce_requests: Vec<(Address, NonceMode)>,
    estimate: Option<u64>,
    estimate_calls: u32,
    fail_submission: bool,
    send_delay: Option<Duration>,
    sent: Vec<SignedTransaction>,
    receipt_misses: u32,
    receipt_calls: u32,
    receipt_success: bool,
    fail_receipts: bool,
}

/// Scriptable in-memory chain.
///
/// Defaults: nonce 0 for every address, gas estimate 150 000, receipts
/// available immediately with success status.
#[derive(Debug)]
pub struct MockChain {
    state: Mutex<ChainState>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    /// Creates a chain with default behaviour.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChainState {
                estimate: Some(150_000),
                receipt_success: true,
                ..ChainState::default()
            }),
        }
    }

    /// Sets the next nonce of `address`.
    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.state.lock().nonces.insert(address, nonce);
    }

    /// Makes nonce lookups for `address` fail.
    pub fn fail_nonce_for(&self, address: Address) {
        self.state.lock().failing_nonce.insert(address);
    }

    /// Makes gas estimation fail.
    pub fn fail_estimate(&self) {
        self.state.lock().estimate = None;
    }

    /// Makes every broadcast fail.
    pub fn fail_submission(&self) {
        self.state.lock().fail_submission = true;
    }

    /// Delays every broadcast.
    pub fn set_send_delay(&self, delay: Duration) {
        self.state.lock().send_delay = Some(delay);
    }

    /// Number of "not found" answers before receipts appear.
    pub fn set_receipt_misses(&self, misses: u32) {
        self.state.lock().receipt_misses = misses;
    }

    /// Sets the status flag of returned receipts.
    pub fn set_receipt_status(&self, success: bool) {
        self.state.lock().receipt_success = success;
    }

    /// Makes receipt lookups fail.
    pub fn fail_receipts(&self) {
        self.state.lock().fail_receipts = true;
    }

    /// Number of nonce lookups.
    pub fn nonce_calls(&self) -> usize {
        self.state.lock().nonce_requests.len()
    }

    /// Nonce lookups in call order.
    pub fn nonce_requests(&self) -> Vec<(Address, NonceMode)> {
        self.state.lock().nonce_requests.clone()
    }

    /// Number of gas estimations.
    pub fn estimate_calls(&self) -> u32 {
        self.state.lock().estimate_calls
    }

    /// Number of receipt lookups.
    pub fn receipt_calls(&self) -> u32 {
        self.state.lock().receipt_calls
    }

    /// Successfully broadcast transactions.
    pub fn sent(&self) -> Vec<SignedTransaction> {
        self.state.lock().sent.clone()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_nonce(&self, address: Address, mode: NonceMode) -> BlockchainResult<u64> {
        let mut state = self.state.lock();
        state.nonce_requests.push((address, mode));
        if state.failing_nonce.contains(&address) {
            return Err(BlockchainError::nonce("connection reset"));
        }
        Ok(state.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn estimate_gas(&self, _call: &UnsignedCall) -> BlockchainResult<u64> {
        let mut state = self.state.lock();
        state.estimate_calls += 1;
        state
            .estimate
            .ok_or_else(|| BlockchainError::gas_estimation("execution reverted"))
    }

    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> BlockchainResult<H256> {
        let delay = self.state.lock().send_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if state.fail_submission {
            return Err(BlockchainError::submission("insufficient funds for gas * price + value"));
        }
        state.sent.push(tx.clone());
        Ok(tx.hash())
    }

    async fn get_transaction_receipt(&self, tx_hash: H256) -> BlockchainResult<Option<TxReceipt>> {
        let mut state = self.state.lock();
        state.receipt_calls += 1;
        if state.fail_receipts {
            return Err(BlockchainError::receipt("internal error"));
        }
        if state.receipt_calls <= state.receipt_misses {
            return Ok(None);
        }
        Ok(Some(TxReceipt {
            tx_hash,
            block_number: 1_000,
            gas_used: 120_000,
            effective_gas_price: 30_000_000_000,
            success: state.receipt_success,
        }))
    }

    async fn health_check(&self, _expected_chain_id: u64) -> BlockchainResult<()> {
        Ok(())
    }
}

#[derive(Debug)]
struct PricerState {
    max_fee: f64,
    tip: f64,
    failing: bool,
    calls: u32,
}

/// Fee oracle returning a fixed quote.
#[derive(Debug)]
pub struct MockGasPricer {
    state: Mutex<PricerState>,
}

impl MockGasPricer {
    /// Creates a pricer quoting `max_fee` and `tip` gwei.
    pub fn new(max_fee: f64, tip: f64) -> Self {
        Self {
            state: Mutex::new(PricerState {
                max_fee,
                tip,
                failing: false,
                calls: 0,
            }),
        }
    }

    /// Changes the quote.
    pub fn set_quote(&self, max_fee: f64, tip: f64) {
        let mut state = self.state.lock();
        state.max_fee = max_fee;
        state.tip = tip;
    }

    /// Makes fetches fail.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    /// Number of fetches.
    pub fn calls(&self) -> u32 {
        self.state.lock().calls
    }
}

#[async_trait]
impl GasPricer for MockGasPricer {
    async fn gas_price(&self) -> GasPriceResult<GasQuote> {
        let mut state = self.state.lock();
        state.calls += 1;
        if state.failing {
            return Err(GasPriceError::Http(HttpError::status(503, "unavailable")));
        }
        Ok(GasQuote::new(state.max_fee, state.tip))
    }
}

/// Aggregator router address used by [`MockQuoter`].
pub const MOCK_AGGREGATOR_ROUTER: &str = "0x70270c228c5b4279d1578799926873aa72446ccd";

#[derive(Debug, Default)]
struct QuoterState {
    rate_calls: u32,
    builds: Vec<BuildTxRequest>,
}

/// Aggregator returning canned rates.
#[derive(Debug)]
pub struct MockQuoter {
    amounts: Vec<String>,
    state: Mutex<QuoterState>,
}

impl MockQuoter {
    /// Creates a quoter whose rates quote the given output amounts.
    pub fn with_amounts(amounts: &[&str]) -> Self {
        Self {
            amounts: amounts.iter().map(|a| (*a).to_string()).collect(),
            state: Mutex::new(QuoterState::default()),
        }
    }

    /// Number of rate queries.
    pub fn rate_calls(&self) -> u32 {
        self.state.lock().rate_calls
    }

    /// Build requests in call order.
    pub fn builds(&self) -> Vec<BuildTxRequest> {
        self.state.lock().builds.clone()
    }
}

#[async_trait]
impl SwapQuoter for MockQuoter {
    async fn get_rates(&self, request: &RateRequest) -> AggregatorResult<Vec<Rate>> {
        self.state.lock().rate_calls += 1;
        if self.amounts.is_empty() {
            return Err(AggregatorError::NoRoute {
                token_in: request.token_in,
                token_out: request.token_out,
            });
        }
        Ok(self
            .amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| Rate {
                amount: amount.clone(),
                rate: String::new(),
                price_impact: 0,
                platform: format!("platform-{i}"),
                hint: format!("hint-{i}"),
                estimated_gas: 180_000,
                tx_object: TxObject::default(),
            })
            .collect())
    }

    async fn build_tx(&self, request: &BuildTxRequest) -> AggregatorResult<UnsignedCall> {
        self.state.lock().builds.push(request.clone());
        Ok(UnsignedCall {
            from: request.user,
            to: addr(MOCK_AGGREGATOR_ROUTER),
            value: if crate::domain::value_objects::tokens::is_native(&request.token_in) {
                request.amount_in
            } else {
                U256::zero()
            },
            data: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        })
    }
}
