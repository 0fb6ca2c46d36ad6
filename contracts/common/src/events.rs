//! Protocol Events for FundMe
//!
//! Events are emitted during contract execution and can be indexed
//! off-chain for building UIs, analytics, and notifications.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, Amount, AppId, RoundId, WithdrawStrategy};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Ledger Events (0x01 - 0x1F)
    Initialized = 0x01,
    Funded = 0x02,
    Withdrawn = 0x03,

    // Price Feed Events (0x60 - 0x7F)
    AnswerUpdated = 0x60,
    NewRound = 0x61,
    FeedOperatorChanged = 0x62,
}

/// Main event enum containing all possible protocol events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum FundMeEvent {
    // ============ Ledger Events ============

    /// Emitted when the fund contract is created
    Initialized {
        owner: Address,
        price_feed: AppId,
        block_height: u64,
    },

    /// Emitted on every accepted contribution
    Funded {
        funder: Address,
        amount: Amount,
        total_funded: Amount,
        usd_value: Amount,
        block_height: u64,
    },

    /// Emitted when the owner drains the contract
    Withdrawn {
        owner: Address,
        amount: Amount,
        funders_cleared: u64,
        strategy: WithdrawStrategy,
        block_height: u64,
    },

    // ============ Price Feed Events ============

    /// Emitted when the feed publishes an answer
    AnswerUpdated {
        current: i128,
        round_id: RoundId,
        updated_at: u64,
        block_height: u64,
    },

    /// Emitted when a new round starts
    NewRound {
        round_id: RoundId,
        started_by: Address,
        started_at: u64,
        block_height: u64,
    },

    /// Emitted when feed operator changes
    FeedOperatorChanged {
        old_operator: Address,
        new_operator: Address,
        block_height: u64,
    },
}

impl FundMeEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Initialized { .. } => EventType::Initialized,
            Self::Funded { .. } => EventType::Funded,
            Self::Withdrawn { .. } => EventType::Withdrawn,
            Self::AnswerUpdated { .. } => EventType::AnswerUpdated,
            Self::NewRound { .. } => EventType::NewRound,
            Self::FeedOperatorChanged { .. } => EventType::FeedOperatorChanged,
        }
    }

    /// Get the block height when event occurred
    pub fn block_height(&self) -> u64 {
        match self {
            Self::Initialized { block_height, .. } => *block_height,
            Self::Funded { block_height, .. } => *block_height,
            Self::Withdrawn { block_height, .. } => *block_height,
            Self::AnswerUpdated { block_height, .. } => *block_height,
            Self::NewRound { block_height, .. } => *block_height,
            Self::FeedOperatorChanged { block_height, .. } => *block_height,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting multiple events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<FundMeEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: FundMeEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[FundMeEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<FundMeEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&FundMeEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
