//! Charms SDK Integration for FundMe
//!
//! Bridges Charms SDK types with the FundMe validation logic.
//!
//! ```text
//! Fund (by anyone):
//!   REFS: [Price feed charm]   <- Not consumed, just referenced
//!   IN:   [FundMe state charm]
//!   OUT:  [FundMe state charm (contribution recorded)]
//!
//! Withdraw / CheaperWithdraw (by owner):
//!   IN:   [FundMe state charm, coins locked to the owner's key]
//!   OUT:  [FundMe state charm (ledger reset), coins to the owner's key]
//! ```
//!
//! The coins sitting on the state UTXO are the contract's balance, on top
//! of a fixed carrier amount. Keys are x-only taproot keys: a coin input
//! whose script is `OP_1 <key>` proves that key signed the transaction.

use charms_data::{App, Data, NativeOutput, Transaction};
use crate::{require_backed, validate, validate_initialize, FundMeContext, FundMeState};
use fundme_common::{
    events::EventLog,
    math::sats_to_native,
    oracle::PriceFeed,
    types::{Address, Amount, AppId, FundMeAction, PriceReading},
};

/// Satoshis on the state UTXO that are not part of the balance
pub const STATE_CARRIER_SATS: u64 = 546;
use fundme_price_feed::charms::read_feed_state_from_refs;

// ============ Operation Codes ============

/// Operation codes for FundMe actions (encoded in witness)
pub mod op {
    /// Initialize contract (first-time creation)
    pub const INITIALIZE: u8 = 0x00;
    /// Contribute native value
    pub const FUND: u8 = 0x10;
    /// Owner withdrawal, storage walk
    pub const WITHDRAW: u8 = 0x20;
    /// Owner withdrawal, working-copy walk
    pub const CHEAPER_WITHDRAW: u8 = 0x21;
}

// ============ Witness Structures ============

/// Witness data for FundMe operations
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct FundMeWitness {
    /// Operation type (see `op` module)
    pub op: u8,
    /// Owner address (for Initialize)
    pub owner: Option<Address>,
    /// Price feed app id (for Initialize)
    pub price_feed: Option<AppId>,
    /// Signer of the spell
    pub signer: Option<Address>,
    /// Contributed value (for Fund)
    pub amount: Option<Amount>,
}

impl FundMeWitness {
    /// Create witness for contract initialization
    pub fn initialize(owner: Address, price_feed: AppId) -> Self {
        Self {
            op: op::INITIALIZE,
            owner: Some(owner),
            price_feed: Some(price_feed),
            ..Self::default()
        }
    }

    /// Create witness for a contribution
    pub fn fund(signer: Address, amount: Amount) -> Self {
        Self {
            op: op::FUND,
            signer: Some(signer),
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Create witness for a storage-walk withdrawal
    pub fn withdraw(signer: Address) -> Self {
        Self {
            op: op::WITHDRAW,
            signer: Some(signer),
            ..Self::default()
        }
    }

    /// Create witness for a working-copy withdrawal
    pub fn cheaper_withdraw(signer: Address) -> Self {
        Self {
            op: op::CHEAPER_WITHDRAW,
            ..Self::withdraw(signer)
        }
    }
}

// ============ Main Validation Function ============

/// Validates a FundMe operation within a Charms transaction.
///
/// # Arguments
/// * `app` - The FundMe app definition
/// * `tx` - The transaction being validated
/// * `_x` - Public inputs (unused)
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn validate_fundme_operation(app: &App, tx: &Transaction, _x: &Data, w: &Data) -> bool {
    // 1. Parse witness to get operation
    let witness = match parse_witness(w) {
        Some(w) => w,
        None => return false,
    };

    // 2. Convert to internal action type
    let action = match witness_to_action(&witness) {
        Some(a) => a,
        None => return false,
    };

    // 3. Initialize has no input state
    if let FundMeAction::Initialize { owner, price_feed } = &action {
        let (output_state, value) = match extract_output_state(app, tx) {
            Some(s) => s,
            None => return false,
        };
        return validate_initialize(&output_state, owner, price_feed).is_ok()
            && require_backed(&output_state, value).is_ok();
    }

    // 4. For other operations, extract both input and output states
    let ((state, value_in), (new_state, value_out)) = match extract_fundme_states(app, tx) {
        Some(s) => s,
        None => return false,
    };

    // 5. The claimed signer must have unlocked a coin input
    let signer = match witness.signer {
        Some(s) => s,
        None => return false,
    };
    let authorized = authorized_keys(tx);

    // 6. Price from the referenced feed; fund fails without it
    let feed_state = read_feed_state_from_refs(tx, state.price_feed());
    let price = read_price(feed_state.as_ref());
    let block_height = feed_state.map(|f| f.latest_timestamp).unwrap_or(0);

    // 7. Coins leaving to the signer's key (withdrawal payout)
    let paid_to_signer = paid_to(tx, &signer);

    let mut ctx = FundMeContext {
        state,
        new_state,
        signer,
        authorized,
        price,
        value_in,
        value_out,
        paid_to_signer,
        block_height,
        events: EventLog::new(),
    };

    validate(&mut ctx, &action).is_ok()
}

// ============ Parsing Functions ============

/// Parse witness data into FundMeWitness
fn parse_witness(w: &Data) -> Option<FundMeWitness> {
    w.value::<FundMeWitness>().ok()
}

/// Convert witness to internal action type
fn witness_to_action(w: &FundMeWitness) -> Option<FundMeAction> {
    match w.op {
        op::INITIALIZE => Some(FundMeAction::Initialize {
            owner: w.owner?,
            price_feed: w.price_feed?,
        }),
        op::FUND => Some(FundMeAction::Fund { amount: w.amount? }),
        op::WITHDRAW => Some(FundMeAction::Withdraw),
        op::CHEAPER_WITHDRAW => Some(FundMeAction::CheaperWithdraw),
        _ => None,
    }
}

/// Latest reading of a referenced feed, if it has published one
fn read_price<F: PriceFeed>(feed: Option<&F>) -> Option<PriceReading> {
    feed.and_then(|f| f.latest_price().ok())
}

// ============ Coin Flows ============

/// Key of an `OP_1 <32-byte key>` (taproot) script
fn taproot_key(dest: &[u8]) -> Option<Address> {
    match dest {
        [0x51, 0x20, key @ ..] => Address::try_from(key).ok(),
        _ => None,
    }
}

/// Native balance carried by a state UTXO of `sats`
fn held_value(sats: u64) -> Option<Amount> {
    sats.checked_sub(STATE_CARRIER_SATS).map(sats_to_native)
}

/// Keys that unlocked at least one coin input
fn authorized_keys(tx: &Transaction) -> Vec<Address> {
    tx.coin_ins
        .as_ref()
        .map(|ins| ins.iter().filter_map(|o| taproot_key(&o.dest)).collect())
        .unwrap_or_default()
}

/// Native value of all coin outputs locked to `key`
fn paid_to(tx: &Transaction, key: &Address) -> Amount {
    tx.coin_outs
        .as_ref()
        .map(|outs| {
            outs.iter()
                .filter(|o| taproot_key(&o.dest).as_ref() == Some(key))
                .fold(0u128, |acc, o| acc.saturating_add(sats_to_native(o.amount)))
        })
        .unwrap_or(0)
}

/// Balance held by the coin at `index`
fn coin_value(coins: Option<&[NativeOutput]>, index: usize) -> Option<Amount> {
    coins.and_then(|c| c.get(index)).and_then(|o| held_value(o.amount))
}

// ============ State Extraction ============

/// Extract the output contract state and the value it holds
fn extract_output_state(app: &App, tx: &Transaction) -> Option<(FundMeState, Amount)> {
    let (index, state) = tx.outs.iter().enumerate().find_map(|(i, charms)| {
        charms
            .get(app)
            .and_then(|data| data.value::<FundMeState>().ok())
            .map(|s| (i, s))
    })?;
    let value = coin_value(tx.coin_outs.as_deref(), index)?;
    Some((state, value))
}

/// Extract contract states and held values from inputs and outputs
fn extract_fundme_states(
    app: &App,
    tx: &Transaction,
) -> Option<((FundMeState, Amount), (FundMeState, Amount))> {
    let (index, input_state) = tx.ins.iter().enumerate().find_map(|(i, (_, charms))| {
        charms
            .get(app)
            .and_then(|data| data.value::<FundMeState>().ok())
            .map(|s| (i, s))
    })?;
    let value_in = coin_value(tx.coin_ins.as_deref(), index)?;

    let output = extract_output_state(app, tx)?;

    Some(((input_state, value_in), output))
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use fundme_common::constants::native::ONE;
    use fundme_price_feed::MockFeedState;
    use std::collections::BTreeMap;

    const OWNER: Address = [1u8; 32];
    const FUNDER: Address = [2u8; 32];

    fn taproot(key: &Address) -> Vec<u8> {
        let mut dest = vec![0x51, 0x20];
        dest.extend_from_slice(key);
        dest
    }

    fn coin(amount: u64, dest: Vec<u8>) -> NativeOutput {
        NativeOutput { amount, dest }
    }

    fn create_coin_tx(coin_ins: Vec<NativeOutput>, coin_outs: Vec<NativeOutput>) -> Transaction {
        Transaction {
            ins: Vec::new(),
            refs: Vec::new(),
            outs: Vec::new(),
            coin_ins: Some(coin_ins),
            coin_outs: Some(coin_outs),
            prev_txs: BTreeMap::new(),
            app_public_inputs: BTreeMap::new(),
        }
    }

    #[test]
    fn test_witness_serialization() {
        let witness = FundMeWitness::fund(FUNDER, 25_000_000_000_000_000);
        let data = Data::from(&witness);
        let parsed = parse_witness(&data).unwrap();

        assert_eq!(parsed.op, op::FUND);
        assert_eq!(parsed.amount, Some(25_000_000_000_000_000));
    }

    #[test]
    fn test_witness_to_action() {
        let action = witness_to_action(&FundMeWitness::cheaper_withdraw(OWNER)).unwrap();
        assert_eq!(action, FundMeAction::CheaperWithdraw);

        let action = witness_to_action(&FundMeWitness::withdraw(OWNER)).unwrap();
        assert_eq!(action, FundMeAction::Withdraw);

        let action = witness_to_action(&FundMeWitness::initialize(OWNER, [9u8; 32])).unwrap();
        assert_eq!(action, FundMeAction::Initialize { owner: OWNER, price_feed: [9u8; 32] });
    }

    #[test]
    fn test_incomplete_witness_rejected() {
        let witness = FundMeWitness { op: op::FUND, ..FundMeWitness::default() };
        assert!(witness_to_action(&witness).is_none());

        let witness = FundMeWitness { op: 0xFF, ..FundMeWitness::default() };
        assert!(witness_to_action(&witness).is_none());
    }

    #[test]
    fn test_read_price() {
        let feed = MockFeedState::development([3u8; 32], [4u8; 32], 1);
        assert_eq!(
            read_price(Some(&feed)),
            Some(PriceReading::new(2_000 * 10i128.pow(18), 18))
        );
        assert_eq!(read_price::<MockFeedState>(None), None);
    }

    #[test]
    fn test_taproot_key() {
        assert_eq!(taproot_key(&taproot(&OWNER)), Some(OWNER));
        // P2WPKH script is not a key we can attribute
        assert_eq!(taproot_key(&[0x00, 0x14, 1, 2, 3]), None);
        assert_eq!(taproot_key(&[0x51, 0x20, 1, 2]), None);
    }

    #[test]
    fn test_held_value_excludes_carrier() {
        assert_eq!(held_value(STATE_CARRIER_SATS), Some(0));
        assert_eq!(held_value(STATE_CARRIER_SATS + 100_000_000), Some(ONE));
        assert_eq!(held_value(STATE_CARRIER_SATS - 1), None);
    }

    #[test]
    fn test_coin_flows() {
        let tx = create_coin_tx(
            vec![coin(1_000, vec![0xAA]), coin(200_000_000, taproot(&OWNER))],
            vec![
                coin(150_000_000, taproot(&OWNER)),
                coin(50_000_000, taproot(&OWNER)),
                coin(10_000, taproot(&FUNDER)),
            ],
        );

        assert_eq!(authorized_keys(&tx), vec![OWNER]);
        assert_eq!(paid_to(&tx, &OWNER), 2 * ONE);
        assert_eq!(paid_to(&tx, &[7u8; 32]), 0);
    }
}
