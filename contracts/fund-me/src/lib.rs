//! FundMe Contract
//!
//! Accepts native-currency contributions worth at least a minimum USD
//! value, tracks every funder's cumulative contribution, and lets a single
//! owner withdraw the whole balance, resetting the ledger.
//!
//! ## Operations
//!
//! - **fund**: any caller, value-bearing, checked against the price feed
//! - **withdraw**: owner only, walks the funder list from storage
//! - **cheaper_withdraw**: owner only, walks a working copy of the list
//!
//! Both withdrawals share one reset routine and leave identical state;
//! they only differ in the [`AccessCost`] they report.
//!
//! ## Execution Model
//!
//! Every operation takes `&mut self` and either completes or returns an
//! error with the state untouched. The contract never calls the price
//! feed or moves value on its own: the feed and the transfer capability
//! are passed in by the caller for the duration of one operation.
//!
//! ## Charms Integration
//!
//! When compiled with the `charms` feature, this crate provides a Charms
//! app entry point via the `charms` module.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

#[cfg(feature = "charms")]
pub mod charms;
pub mod ledger;


use fundme_common::{
    access_control::Owned,
    check,
    constants::funding,
    errors::{FundMeError, FundMeResult},
    events::{EventLog, FundMeEvent},
    math::{get_conversion_rate, meets_minimum},
    oracle::{FixedPrice, PriceFeed},
    transfer::NativeTransfer,
    types::{AccessCost, Address, Amount, AppId, FundMeAction, PriceReading, WithdrawReceipt, WithdrawStrategy},
    validation::require_nonzero_address,
};

pub use ledger::Ledger;

// ============ Configuration ============

/// Deploy-time parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FundMeConfig {
    /// Minimum contribution in USD with 18 decimals
    pub minimum_usd: Amount,
}

impl Default for FundMeConfig {
    fn default() -> Self {
        Self {
            minimum_usd: funding::MINIMUM_USD,
        }
    }
}

// ============ Contract State ============

/// Everything the contract persists
///
/// Owner, price feed and minimum are fixed at creation; only the ledger
/// and the balance change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FundMeState {
    owner: Address,
    price_feed: AppId,
    minimum_usd: Amount,
    ledger: Ledger,
    balance: Amount,
}

// No Default: owner and price feed are always nonzero.

impl FundMeState {
    /// Create an empty contract state
    pub fn new(owner: Address, price_feed: AppId, config: FundMeConfig) -> FundMeResult<Self> {
        require_nonzero_address(&owner, "owner is zero address")?;
        require_nonzero_address(&price_feed, "price feed is zero address")?;

        Ok(Self {
            owner,
            price_feed,
            minimum_usd: config.minimum_usd,
            ledger: Ledger::new(),
            balance: 0,
        })
    }

    pub fn price_feed(&self) -> &AppId {
        &self.price_feed
    }

    pub fn minimum_usd(&self) -> Amount {
        self.minimum_usd
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Contributions sum to the held balance
    pub fn is_consistent(&self) -> bool {
        self.ledger.total().map(|t| t == self.balance).unwrap_or(false)
    }
}

impl Owned for FundMeState {
    fn owner(&self) -> &Address {
        &self.owner
    }
}

// ============ Contract ============

/// A FundMe contract instance: its state plus the events it emitted
#[derive(Debug, Clone)]
pub struct FundMe {
    state: FundMeState,
    events: EventLog,
}

impl FundMe {
    /// Deploy with the default $50 minimum
    pub fn new(owner: Address, price_feed: AppId, block_height: u64) -> FundMeResult<Self> {
        Self::with_config(owner, price_feed, FundMeConfig::default(), block_height)
    }

    /// Deploy with explicit parameters
    pub fn with_config(
        owner: Address,
        price_feed: AppId,
        config: FundMeConfig,
        block_height: u64,
    ) -> FundMeResult<Self> {
        let state = FundMeState::new(owner, price_feed, config)?;
        let mut events = EventLog::new();
        events.emit(FundMeEvent::Initialized {
            owner,
            price_feed,
            block_height,
        });
        Ok(Self { state, events })
    }

    /// Resume an instance from persisted state
    pub fn from_state(state: FundMeState) -> Self {
        Self {
            state,
            events: EventLog::new(),
        }
    }

    // ============ Funding ============

    /// Contribute `amount` as `caller`.
    ///
    /// The USD value of `amount` at the feed's current rate must reach the
    /// minimum. Returns that USD value (18 decimals).
    ///
    /// # Errors
    /// - `OracleUnavailable` / `OracleMalformed` if the feed cannot be used
    /// - `InsufficientValue` if the contribution is worth too little
    /// - `Overflow` if a total would not fit
    pub fn fund<F: PriceFeed + ?Sized>(
        &mut self,
        caller: Address,
        amount: Amount,
        feed: &F,
        block_height: u64,
    ) -> FundMeResult<Amount> {
        // 1. Convert at the current rate
        let reading = feed.latest_price()?;
        let usd_value = get_conversion_rate(amount, reading)?;

        // 2. Enforce the minimum
        let minimum = self.state.minimum_usd;
        check!(
            meets_minimum(usd_value, minimum),
            FundMeError::InsufficientValue { usd_value, minimum }
        );

        // 3. Stage the new balance before touching the ledger
        let new_balance = self
            .state
            .balance
            .checked_add(amount)
            .ok_or(FundMeError::Overflow)?;

        // 4. Record the contribution
        let total_funded = self.state.ledger.record(caller, amount)?;
        self.state.balance = new_balance;

        // 5. Emit event
        self.events.emit(FundMeEvent::Funded {
            funder: caller,
            amount,
            total_funded,
            usd_value,
            block_height,
        });

        Ok(usd_value)
    }

    // ============ Withdrawal ============

    /// Owner withdraws everything, walking the funder list in storage
    pub fn withdraw<T: NativeTransfer + ?Sized>(
        &mut self,
        caller: Address,
        transfer: &mut T,
        block_height: u64,
    ) -> FundMeResult<WithdrawReceipt> {
        self.reset_and_pay(caller, WithdrawStrategy::Direct, transfer, block_height)
    }

    /// Owner withdraws everything, walking a working copy of the funder list
    pub fn cheaper_withdraw<T: NativeTransfer + ?Sized>(
        &mut self,
        caller: Address,
        transfer: &mut T,
        block_height: u64,
    ) -> FundMeResult<WithdrawReceipt> {
        self.reset_and_pay(caller, WithdrawStrategy::WorkingCopy, transfer, block_height)
    }

    /// Shared withdrawal routine.
    ///
    /// The reset is staged on a copy of the ledger and committed only once
    /// the payout went through, so a failed transfer leaves no trace.
    fn reset_and_pay<T: NativeTransfer + ?Sized>(
        &mut self,
        caller: Address,
        strategy: WithdrawStrategy,
        transfer: &mut T,
        block_height: u64,
    ) -> FundMeResult<WithdrawReceipt> {
        // 1. Owner only
        self.state.ensure_owner(&caller)?;

        // 2. Stage the reset
        let mut staged = self.state.ledger.clone();
        let (cost, funders_cleared) = staged.reset(strategy);

        // 3. Pay out the whole balance
        let amount = self.state.balance;
        transfer.send(&self.state.owner, amount)?;

        // 4. Commit
        self.state.ledger = staged;
        self.state.balance = 0;

        self.events.emit(FundMeEvent::Withdrawn {
            owner: self.state.owner,
            amount,
            funders_cleared,
            strategy,
            block_height,
        });

        Ok(WithdrawReceipt {
            amount,
            funders_cleared,
            strategy,
            cost,
        })
    }

    // ============ Queries ============

    /// Cumulative amount funded by `funder` since the last withdrawal
    pub fn address_to_amount_funded(&self, funder: &Address) -> Amount {
        self.state.ledger.amount_funded(funder)
    }

    /// Funder of the `index`-th funding event since the last withdrawal
    pub fn funder(&self, index: usize) -> FundMeResult<Address> {
        self.state.ledger.funder(index)
    }

    pub fn funders(&self) -> &[Address] {
        self.state.ledger.funders()
    }

    pub fn funder_count(&self) -> usize {
        self.state.ledger.len()
    }

    pub fn owner(&self) -> &Address {
        self.state.owner()
    }

    pub fn price_feed(&self) -> &AppId {
        self.state.price_feed()
    }

    pub fn minimum_usd(&self) -> Amount {
        self.state.minimum_usd()
    }

    pub fn balance(&self) -> Amount {
        self.state.balance
    }

    pub fn state(&self) -> &FundMeState {
        &self.state
    }

    pub fn into_state(self) -> FundMeState {
        self.state
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Hand over collected events, leaving the log empty
    pub fn take_events(&mut self) -> EventLog {
        core::mem::take(&mut self.events)
    }
}

// ============ Spell Payouts ============

/// Coins a spell sends to one key
///
/// A spell moves value by creating outputs; the contract only checks that
/// the outputs locked to the recipient carry at least what it pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpellPayout {
    pub recipient: Address,
    pub amount: Amount,
}

impl NativeTransfer for SpellPayout {
    fn send(&mut self, to: &Address, amount: Amount) -> FundMeResult<()> {
        if *to != self.recipient || amount > self.amount {
            return Err(FundMeError::TransferFailed { to: *to, amount });
        }
        self.amount -= amount;
        Ok(())
    }
}

// ============ Validation Context ============

/// Context for validating a FundMe state transition
pub struct FundMeContext {
    /// Current contract state
    pub state: FundMeState,
    /// Proposed contract state
    pub new_state: FundMeState,
    /// Address the action is performed as
    pub signer: Address,
    /// Keys that unlocked at least one coin input
    pub authorized: Vec<Address>,
    /// Price read from the referenced feed, if any
    pub price: Option<PriceReading>,
    /// Native value held with the input state
    pub value_in: Amount,
    /// Native value held with the output state
    pub value_out: Amount,
    /// Native value sent to outputs locked to the signer
    pub paid_to_signer: Amount,
    /// Current block height
    pub block_height: u64,
    /// Event log
    pub events: EventLog,
}

// ============ Validation Functions ============

/// Main validation entry point
///
/// Replays `action` on the current state and requires the proposed state
/// to match the result exactly. The coins held with both states must equal
/// their recorded balances, so every ledger entry is backed by value.
pub fn validate(ctx: &mut FundMeContext, action: &FundMeAction) -> FundMeResult<()> {
    if let FundMeAction::Initialize { .. } = action {
        // Initialize has no input state; see validate_initialize
        return Ok(());
    }

    // 1. The signer must have unlocked an input
    check!(
        ctx.authorized.contains(&ctx.signer),
        FundMeError::MissingSignature { signer: ctx.signer }
    );

    // 2. The input state must be backed
    require_backed(&ctx.state, ctx.value_in)?;

    // 3. Replay
    let mut contract = FundMe::from_state(ctx.state.clone());
    match action {
        FundMeAction::Initialize { .. } => {}
        FundMeAction::Fund { amount } => {
            let feed = ctx.price.map(FixedPrice);
            contract.fund(ctx.signer, *amount, &feed, ctx.block_height)?;
        }
        FundMeAction::Withdraw | FundMeAction::CheaperWithdraw => {
            let mut payout = SpellPayout {
                recipient: ctx.signer,
                amount: ctx.paid_to_signer,
            };
            match action.withdraw_strategy() {
                Some(WithdrawStrategy::WorkingCopy) => {
                    contract.cheaper_withdraw(ctx.signer, &mut payout, ctx.block_height)?
                }
                _ => contract.withdraw(ctx.signer, &mut payout, ctx.block_height)?,
            };
        }
    }

    // 4. The proposed state must be the replayed one, and backed
    check!(
        *contract.state() == ctx.new_state,
        FundMeError::InvalidStateTransition
    );
    require_backed(&ctx.new_state, ctx.value_out)?;

    for event in contract.take_events().into_events() {
        ctx.events.emit(event);
    }
    Ok(())
}

/// Require `value` held with `state` to equal its recorded balance
pub fn require_backed(state: &FundMeState, value: Amount) -> FundMeResult<()> {
    check!(
        value == state.balance,
        FundMeError::ValueMismatch {
            expected: state.balance,
            actual: value,
        }
    );
    Ok(())
}

/// Validate a freshly created contract state
pub fn validate_initialize(
    output: &FundMeState,
    owner: &Address,
    price_feed: &AppId,
) -> FundMeResult<()> {
    let expected = FundMeState::new(*owner, *price_feed, FundMeConfig {
        minimum_usd: output.minimum_usd,
    })?;
    check!(*output == expected, FundMeError::InvalidStateTransition);
    check!(
        output.minimum_usd >= funding::MINIMUM_USD,
        FundMeError::InvalidStateTransition
    );
    Ok(())
}

/// Storage cost of a withdrawal without performing it
pub fn estimate_withdraw_cost(state: &FundMeState, strategy: WithdrawStrategy) -> AccessCost {
    let mut ledger = state.ledger.clone();
    ledger.reset(strategy).0
}

// ============ Tests ============
