//! Mock Price Feed Contract
//!
//! A V3-aggregator style price feed with a fixed, operator-controlled
//! answer. Development networks point the fund contract at this feed
//! instead of a live aggregator.
//!
//! ## Reference Input Pattern (UTXO Model)
//!
//! The feed charm is used as a **reference input** by the fund contract:
//! - Not consumed when read
//! - Only the operator can spend and update the feed charm
//! - Every update starts a new round; old rounds stay queryable

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};

// Charms SDK integration (conditional compilation)
#[cfg(feature = "charms")]
pub mod charms;
use serde::{Deserialize, Serialize};

use fundme_common::{
    access_control::{only_admin, only_operator},
    check,
    constants::{feed, network},
    errors::{FundMeError, FundMeResult},
    events::{EventLog, FundMeEvent},
    oracle::PriceFeed,
    types::{Address, PriceFeedAction, PriceReading, RoundData, RoundId},
    validation::require_nonzero_address,
};

// ============ Feed State ============

/// Mock aggregator state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct MockFeedState {
    /// Admin (can change operator)
    pub admin: Address,
    /// Authorized operator (can publish answers)
    pub operator: Address,
    /// Fractional digits of every answer
    pub decimals: u8,
    /// Most recent answer
    pub latest_answer: i128,
    /// Block height of the most recent answer
    pub latest_timestamp: u64,
    /// Most recent round id (0 = no answer yet)
    pub latest_round: RoundId,
    /// Round history
    pub rounds: BTreeMap<RoundId, RoundData>,
}

impl MockFeedState {
    /// Create a feed and publish its first answer as round 1
    pub fn new(
        admin: Address,
        operator: Address,
        decimals: u8,
        initial_answer: i128,
        block_height: u64,
    ) -> Self {
        let mut state = Self {
            admin,
            operator,
            decimals,
            latest_answer: 0,
            latest_timestamp: 0,
            latest_round: 0,
            rounds: BTreeMap::new(),
        };
        state.update_answer(initial_answer, block_height);
        state
    }

    /// Development defaults: 8 decimals, $2,000
    pub fn development(admin: Address, operator: Address, block_height: u64) -> Self {
        Self::new(admin, operator, feed::DECIMALS, feed::INITIAL_ANSWER, block_height)
    }

    /// Publish `answer` as the next round
    pub fn update_answer(&mut self, answer: i128, timestamp: u64) -> RoundId {
        let round_id = self.latest_round.saturating_add(1);
        self.latest_answer = answer;
        self.latest_timestamp = timestamp;
        self.latest_round = round_id;
        self.rounds.insert(
            round_id,
            RoundData {
                round_id,
                answer,
                started_at: timestamp,
                updated_at: timestamp,
                answered_in_round: round_id,
            },
        );
        round_id
    }

    /// Overwrite a specific round and make it the latest one
    pub fn update_round_data(
        &mut self,
        round_id: RoundId,
        answer: i128,
        timestamp: u64,
        started_at: u64,
    ) -> FundMeResult<()> {
        check!(round_id != 0, FundMeError::RoundNotFound { round_id });

        self.latest_round = round_id;
        self.latest_answer = answer;
        self.latest_timestamp = timestamp;
        self.rounds.insert(
            round_id,
            RoundData {
                round_id,
                answer,
                started_at,
                updated_at: timestamp,
                answered_in_round: round_id,
            },
        );
        Ok(())
    }

    /// Data of the latest round
    pub fn latest_round_data(&self) -> FundMeResult<RoundData> {
        self.get_round_data(self.latest_round)
    }

    /// Data of a given round
    pub fn get_round_data(&self, round_id: RoundId) -> FundMeResult<RoundData> {
        self.rounds
            .get(&round_id)
            .copied()
            .ok_or(FundMeError::RoundNotFound { round_id })
    }

    pub fn description(&self) -> &'static str {
        feed::DESCRIPTION
    }

    pub fn version(&self) -> u64 {
        feed::VERSION
    }
}

impl PriceFeed for MockFeedState {
    fn latest_price(&self) -> FundMeResult<PriceReading> {
        if self.latest_round == 0 {
            return Err(FundMeError::OracleUnavailable);
        }
        Ok(PriceReading::new(self.latest_answer, self.decimals))
    }
}

// ============ Validation Context ============

/// Context for validating feed operations
pub struct FeedContext {
    /// Current feed state
    pub state: MockFeedState,
    /// Updated feed state
    pub new_state: MockFeedState,
    /// Signer address
    pub signer: Address,
    /// Current block height
    pub block_height: u64,
    /// Event log
    pub events: EventLog,
}

// ============ Validation Functions ============

/// Main validation entry point
pub fn validate(ctx: &mut FeedContext, action: &PriceFeedAction) -> FundMeResult<()> {
    match action {
        PriceFeedAction::Initialize { .. } => {
            // Initialize has no input state; see validate_initialize
            Ok(())
        }
        PriceFeedAction::UpdateAnswer { answer } => validate_update_answer(ctx, *answer),
        PriceFeedAction::UpdateRoundData {
            round_id,
            answer,
            timestamp,
            started_at,
        } => validate_update_round_data(ctx, *round_id, *answer, *timestamp, *started_at),
        PriceFeedAction::SetOperator { operator } => validate_set_operator(ctx, operator),
    }
}

/// Validate a freshly created feed against its initialization parameters
pub fn validate_initialize(
    output: &MockFeedState,
    admin: &Address,
    operator: &Address,
    decimals: u8,
    initial_answer: i128,
) -> FundMeResult<()> {
    // Mock feeds only exist on development networks
    check!(network::IS_DEVELOPMENT, FundMeError::InvalidStateTransition);
    require_nonzero_address(admin, "feed admin is zero address")?;
    require_nonzero_address(operator, "feed operator is zero address")?;

    let expected = MockFeedState::new(
        *admin,
        *operator,
        decimals,
        initial_answer,
        output.latest_timestamp,
    );
    check!(*output == expected, FundMeError::InvalidStateTransition);
    Ok(())
}

/// Validate publishing a new answer
fn validate_update_answer(ctx: &mut FeedContext, answer: i128) -> FundMeResult<()> {
    // 1. Only operator can publish
    only_operator(&ctx.state.operator, &ctx.signer)?;

    // 2. New state must be the old state plus one round
    let mut expected = ctx.state.clone();
    let round_id = expected.update_answer(answer, ctx.block_height);
    check!(ctx.new_state == expected, FundMeError::InvalidStateTransition);

    // 3. Emit events
    ctx.events.emit(FundMeEvent::NewRound {
        round_id,
        started_by: ctx.signer,
        started_at: ctx.block_height,
        block_height: ctx.block_height,
    });
    ctx.events.emit(FundMeEvent::AnswerUpdated {
        current: answer,
        round_id,
        updated_at: ctx.block_height,
        block_height: ctx.block_height,
    });

    Ok(())
}

/// Validate overwriting a round
fn validate_update_round_data(
    ctx: &mut FeedContext,
    round_id: RoundId,
    answer: i128,
    timestamp: u64,
    started_at: u64,
) -> FundMeResult<()> {
    only_operator(&ctx.state.operator, &ctx.signer)?;

    let mut expected = ctx.state.clone();
    expected.update_round_data(round_id, answer, timestamp, started_at)?;
    check!(ctx.new_state == expected, FundMeError::InvalidStateTransition);

    ctx.events.emit(FundMeEvent::AnswerUpdated {
        current: answer,
        round_id,
        updated_at: timestamp,
        block_height: ctx.block_height,
    });

    Ok(())
}

/// Validate operator change
fn validate_set_operator(ctx: &mut FeedContext, new_operator: &Address) -> FundMeResult<()> {
    // 1. Only admin can change operator
    only_admin(&ctx.state.admin, &ctx.signer)?;

    // 2. New operator must be real and different
    require_nonzero_address(new_operator, "feed operator is zero address")?;
    check!(
        *new_operator != ctx.state.operator,
        FundMeError::InvalidStateTransition
    );

    // 3. Nothing but the operator may change
    let mut expected = ctx.state.clone();
    expected.operator = *new_operator;
    check!(ctx.new_state == expected, FundMeError::InvalidStateTransition);

    // 4. Emit event
    ctx.events.emit(FundMeEvent::FeedOperatorChanged {
        old_operator: ctx.state.operator,
        new_operator: *new_operator,
        block_height: ctx.block_height,
    });

    Ok(())
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use fundme_common::events::EventType;

    const ADMIN: Address = [1u8; 32];
    const OPERATOR: Address = [2u8; 32];

    fn create_test_context() -> FeedContext {
        let state = MockFeedState::development(ADMIN, OPERATOR, 100);
        FeedContext {
            new_state: state.clone(),
            state,
            signer: OPERATOR,
            block_height: 101,
            events: EventLog::new(),
        }
    }

    #[test]
    fn test_development_defaults() {
        let state = MockFeedState::development(ADMIN, OPERATOR, 100);

        assert_eq!(state.decimals, 18);
        assert_eq!(state.latest_answer, 2_000 * 10i128.pow(18));
        assert_eq!(state.latest_round, 1);
        assert_eq!(state.latest_price().unwrap(), PriceReading::new(feed::INITIAL_ANSWER, 18));
        assert_eq!(state.version(), 0);
    }

    #[test]
    fn test_update_answer_starts_new_round() {
        let mut state = MockFeedState::development(ADMIN, OPERATOR, 100);
        let round = state.update_answer(2_500_00000000, 110);

        assert_eq!(round, 2);
        let latest = state.latest_round_data().unwrap();
        assert_eq!(latest.answer, 2_500_00000000);
        assert_eq!(latest.updated_at, 110);
        assert_eq!(state.get_round_data(1).unwrap().answer, feed::INITIAL_ANSWER);
    }

    #[test]
    fn test_update_round_data() {
        let mut state = MockFeedState::development(ADMIN, OPERATOR, 100);
        state.update_round_data(7, 1_999_00000000, 120, 115).unwrap();

        assert_eq!(state.latest_round, 7);
        let round = state.get_round_data(7).unwrap();
        assert_eq!(round.started_at, 115);
        assert_eq!(round.updated_at, 120);
        assert!(matches!(state.get_round_data(5), Err(FundMeError::RoundNotFound { round_id: 5 })));
        assert!(state.update_round_data(0, 1, 1, 1).is_err());
    }

    #[test]
    fn test_empty_feed_is_unavailable() {
        let mut state = MockFeedState::development(ADMIN, OPERATOR, 100);
        state.latest_round = 0;
        assert_eq!(state.latest_price(), Err(FundMeError::OracleUnavailable));
    }

    #[test]
    fn test_validate_update_answer() {
        let mut ctx = create_test_context();
        ctx.new_state.update_answer(2_100_00000000, ctx.block_height);

        let action = PriceFeedAction::UpdateAnswer { answer: 2_100_00000000 };
        let result = validate(&mut ctx, &action);

        assert!(result.is_ok(), "Should succeed: {:?}", result);
        assert_eq!(ctx.events.len(), 2);
        assert_eq!(ctx.events.filter_by_type(EventType::AnswerUpdated).len(), 1);
    }

    #[test]
    fn test_validate_update_answer_unauthorized() {
        let mut ctx = create_test_context();
        ctx.signer = [99u8; 32];
        ctx.new_state.update_answer(2_100_00000000, ctx.block_height);

        let action = PriceFeedAction::UpdateAnswer { answer: 2_100_00000000 };
        let result = validate(&mut ctx, &action);

        assert!(matches!(result, Err(FundMeError::Unauthorized { .. })));
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn test_validate_update_answer_wrong_output() {
        let mut ctx = create_test_context();
        ctx.new_state.update_answer(3_000_00000000, ctx.block_height);

        let action = PriceFeedAction::UpdateAnswer { answer: 2_100_00000000 };
        let result = validate(&mut ctx, &action);

        assert_eq!(result, Err(FundMeError::InvalidStateTransition));
    }

    #[test]
    fn test_validate_update_round_data() {
        let mut ctx = create_test_context();
        ctx.new_state.update_round_data(4, 1_900_00000000, 130, 125).unwrap();

        let action = PriceFeedAction::UpdateRoundData {
            round_id: 4,
            answer: 1_900_00000000,
            timestamp: 130,
            started_at: 125,
        };

        assert!(validate(&mut ctx, &action).is_ok());
    }

    #[test]
    fn test_set_operator() {
        let mut ctx = create_test_context();
        ctx.signer = ADMIN;
        let new_operator = [3u8; 32];
        ctx.new_state.operator = new_operator;

        let action = PriceFeedAction::SetOperator { operator: new_operator };
        assert!(validate(&mut ctx, &action).is_ok());
        assert_eq!(ctx.events.filter_by_type(EventType::FeedOperatorChanged).len(), 1);
    }

    #[test]
    fn test_set_operator_requires_admin() {
        let mut ctx = create_test_context();
        let new_operator = [3u8; 32];
        ctx.new_state.operator = new_operator;

        let action = PriceFeedAction::SetOperator { operator: new_operator };
        assert_eq!(validate(&mut ctx, &action), Err(FundMeError::AdminOnly));
    }

    #[test]
    #[cfg(not(feature = "mainnet"))]
    fn test_validate_initialize() {
        let state = MockFeedState::new(ADMIN, OPERATOR, 8, 2_000_00000000, 50);
        assert!(validate_initialize(&state, &ADMIN, &OPERATOR, 8, 2_000_00000000).is_ok());
        assert_eq!(
            validate_initialize(&state, &ADMIN, &OPERATOR, 18, 2_000_00000000),
            Err(FundMeError::InvalidStateTransition)
        );
        assert!(matches!(
            validate_initialize(&state, &[0u8; 32], &OPERATOR, 8, 2_000_00000000),
            Err(FundMeError::InvalidAddress { .. })
        ));
    }

    #[test]
    #[cfg(feature = "mainnet")]
    fn test_mock_feed_rejected_on_mainnet() {
        let state = MockFeedState::new(ADMIN, OPERATOR, 8, 2_000_00000000, 50);
        assert_eq!(
            validate_initialize(&state, &ADMIN, &OPERATOR, 8, 2_000_00000000),
            Err(FundMeError::InvalidStateTransition)
        );
    }

    #[test]
    fn test_state_cbor_round_trip() {
        let state = MockFeedState::development(ADMIN, OPERATOR, 100);

        let mut bytes = Vec::new();
        ciborium::into_writer(&state, &mut bytes).unwrap();
        let restored: MockFeedState = ciborium::from_reader(bytes.as_slice()).unwrap();

        assert_eq!(state, restored);
    }
}
