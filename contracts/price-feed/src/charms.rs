//! Charms SDK Integration for the Mock Price Feed
//!
//! Bridges Charms SDK types with the feed validation logic.
//!
//! ```text
//! UpdateAnswer (by operator):
//!   IN:  [Feed state charm]
//!   OUT: [Feed state charm (new round)]
//!
//! FundMe reading the price:
//!   REFS: [Feed state charm]  <- Not consumed, just referenced
//!   IN:   [FundMe state charm]
//!   OUT:  [FundMe state charm (updated ledger)]
//! ```

use charms_data::{App, Data, Transaction};
use crate::{validate, validate_initialize, FeedContext, MockFeedState};
use fundme_common::{
    events::EventLog,
    types::{Address, AppId, PriceFeedAction, RoundId},
};

// ============ Operation Codes ============

/// Operation codes for feed actions (encoded in witness)
pub mod op {
    /// Initialize feed (first-time creation)
    pub const INITIALIZE: u8 = 0x00;
    /// Publish a new answer (operator only)
    pub const UPDATE_ANSWER: u8 = 0x30;
    /// Overwrite a round (operator only)
    pub const UPDATE_ROUND_DATA: u8 = 0x31;
    /// Set new operator (admin only)
    pub const SET_OPERATOR: u8 = 0x32;
}

// ============ Witness Structures ============

/// Witness data for feed operations
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct FeedWitness {
    /// Operation type (see `op` module)
    pub op: u8,
    /// Admin address (for Initialize)
    pub admin: Option<Address>,
    /// Operator address (for Initialize or SetOperator)
    pub operator: Option<Address>,
    /// Signer of the spell
    pub signer: Option<Address>,
    /// Decimals (for Initialize)
    pub decimals: Option<u8>,
    /// Answer (for Initialize, UpdateAnswer, UpdateRoundData)
    pub answer: Option<i128>,
    /// Round id (for UpdateRoundData)
    pub round_id: Option<RoundId>,
    /// Round timestamp (for UpdateRoundData)
    pub timestamp: Option<u64>,
    /// Round start (for UpdateRoundData)
    pub started_at: Option<u64>,
}

impl FeedWitness {
    /// Create witness for feed initialization
    pub fn initialize(admin: Address, operator: Address, decimals: u8, initial_answer: i128) -> Self {
        Self {
            op: op::INITIALIZE,
            admin: Some(admin),
            operator: Some(operator),
            decimals: Some(decimals),
            answer: Some(initial_answer),
            ..Self::default()
        }
    }

    /// Create witness for a new answer
    pub fn update_answer(signer: Address, answer: i128) -> Self {
        Self {
            op: op::UPDATE_ANSWER,
            signer: Some(signer),
            answer: Some(answer),
            ..Self::default()
        }
    }

    /// Create witness for a round overwrite
    pub fn update_round_data(
        signer: Address,
        round_id: RoundId,
        answer: i128,
        timestamp: u64,
        started_at: u64,
    ) -> Self {
        Self {
            op: op::UPDATE_ROUND_DATA,
            signer: Some(signer),
            answer: Some(answer),
            round_id: Some(round_id),
            timestamp: Some(timestamp),
            started_at: Some(started_at),
            ..Self::default()
        }
    }

    /// Create witness for setting new operator
    pub fn set_operator(signer: Address, operator: Address) -> Self {
        Self {
            op: op::SET_OPERATOR,
            signer: Some(signer),
            operator: Some(operator),
            ..Self::default()
        }
    }
}

// ============ Main Validation Function ============

/// Validates a feed operation within a Charms transaction.
///
/// # Arguments
/// * `app` - The price feed app definition
/// * `tx` - The transaction being validated
/// * `_x` - Public inputs (the feed exports data, doesn't read)
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn validate_feed_operation(app: &App, tx: &Transaction, _x: &Data, w: &Data) -> bool {
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
    if let PriceFeedAction::Initialize {
        admin,
        operator,
        decimals,
        initial_answer,
    } = &action
    {
        let output_state = match extract_output_state(app, tx) {
            Some(s) => s,
            None => return false,
        };
        return validate_initialize(&output_state, admin, operator, *decimals, *initial_answer)
            .is_ok();
    }

    // 4. For other operations, extract both input and output states
    let (state, new_state) = match extract_feed_states(app, tx) {
        Some(s) => s,
        None => return false,
    };

    // 5. Signer comes from the witness; the Charms runtime checks the
    //    spending signature on the feed UTXO
    let signer = match witness.signer {
        Some(s) => s,
        None => return false,
    };

    // 6. Updates are stamped with the new state's timestamp
    let block_height = new_state.latest_timestamp;

    let mut ctx = FeedContext {
        state,
        new_state,
        signer,
        block_height,
        events: EventLog::new(),
    };

    validate(&mut ctx, &action).is_ok()
}

// ============ Parsing Functions ============

/// Parse witness data into FeedWitness
fn parse_witness(w: &Data) -> Option<FeedWitness> {
    w.value::<FeedWitness>().ok()
}

/// Convert witness to internal action type
fn witness_to_action(w: &FeedWitness) -> Option<PriceFeedAction> {
    match w.op {
        op::INITIALIZE => Some(PriceFeedAction::Initialize {
            admin: w.admin?,
            operator: w.operator?,
            decimals: w.decimals?,
            initial_answer: w.answer?,
        }),
        op::UPDATE_ANSWER => Some(PriceFeedAction::UpdateAnswer { answer: w.answer? }),
        op::UPDATE_ROUND_DATA => Some(PriceFeedAction::UpdateRoundData {
            round_id: w.round_id?,
            answer: w.answer?,
            timestamp: w.timestamp?,
            started_at: w.started_at?,
        }),
        op::SET_OPERATOR => Some(PriceFeedAction::SetOperator {
            operator: w.operator?,
        }),
        _ => None,
    }
}

// ============ State Extraction ============

/// Extract only the output feed state (for Initialize)
fn extract_output_state(app: &App, tx: &Transaction) -> Option<MockFeedState> {
    tx.outs
        .iter()
        .find_map(|charms| charms.get(app).and_then(|data| data.value::<MockFeedState>().ok()))
}

/// Extract feed states from transaction inputs and outputs
fn extract_feed_states(app: &App, tx: &Transaction) -> Option<(MockFeedState, MockFeedState)> {
    let input_state = tx
        .ins
        .iter()
        .find_map(|(_, charms)| charms.get(app).and_then(|data| data.value::<MockFeedState>().ok()))?;

    let output_state = extract_output_state(app, tx)?;

    Some((input_state, output_state))
}

// ============ Feed Reading (for other apps) ============

/// Read the feed state referenced by a transaction
///
/// Used by the fund contract: the feed charm sits in the reference
/// inputs and is matched by app identity.
pub fn read_feed_state_from_refs(tx: &Transaction, feed_id: &AppId) -> Option<MockFeedState> {
    for (_, charms) in tx.refs.iter() {
        for (charm_app, data) in charms.iter() {
            if charm_app.identity.0 == *feed_id {
                if let Ok(state) = data.value::<MockFeedState>() {
                    return Some(state);
                }
            }
        }
    }
    None
}

// ============ Tests ============
