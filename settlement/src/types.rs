//! Core types for the settlement engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Participant identifier (player id, diner id, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create new participant ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Net balance of one participant, in integer units
///
/// Negative = owes money into the pool, positive = is owed money,
/// zero = already settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Participant
    pub id: ParticipantId,

    /// Signed net amount
    pub net: i64,
}

impl Balance {
    /// Create new balance
    pub fn new(id: impl Into<ParticipantId>, net: i64) -> Self {
        Self { id: id.into(), net }
    }

    /// Check if net debtor
    pub fn is_debtor(&self) -> bool {
        self.net < 0
    }

    /// Check if net creditor
    pub fn is_creditor(&self) -> bool {
        self.net > 0
    }

    /// Check if already settled
    pub fn is_settled(&self) -> bool {
        self.net == 0
    }
}

/// Pairwise payment produced by the solver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    /// Participant who pays
    pub debtor: ParticipantId,

    /// Participant who receives
    pub creditor: ParticipantId,

    /// Amount transferred (always positive)
    pub amount: i64,
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} pays {} {}", self.debtor, self.creditor, self.amount)
    }
}

/// What the balances were derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementKind {
    /// Chip counts of a single table
    Poker,
    /// Food expenses split between diners
    Food,
    /// Chip counts aggregated over several tables
    Union,
    /// Caller-provided net balances
    Direct,
}

impl std::fmt::Display for SettlementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SettlementKind::Poker => "poker",
            SettlementKind::Food => "food",
            SettlementKind::Union => "union",
            SettlementKind::Direct => "direct",
        };
        f.write_str(name)
    }
}

/// Search counters reported with a solution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Balances left after discarding zeros
    pub nonzero_balances: usize,

    /// Search states visited (memo hits excluded)
    pub nodes_explored: u64,

    /// Distinct states cached
    pub memo_entries: usize,
}

/// Result of one settlement run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Plan ID
    pub plan_id: Uuid,

    /// Source of the balances
    pub kind: SettlementKind,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// Payments to execute
    pub transactions: Vec<Transaction>,

    /// Participants in the request
    pub participant_count: usize,

    /// Participants that started with a zero balance
    pub settled_count: usize,

    /// Sum of all transaction amounts
    pub total_transferred: i64,

    /// Search counters
    pub stats: SolveStats,
}

impl SettlementPlan {
    /// Number of payments in the plan
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Check if nothing needs to move
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Summary statistics for a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementStats {
    /// Participants with a nonzero balance
    pub active_participants: usize,

    /// Payments in the plan
    pub transaction_count: usize,

    /// Total amount moved
    pub total_transferred: i64,

    /// Payments a naive chain settlement would need (active - 1)
    pub naive_transaction_count: usize,

    /// Payments saved compared to the naive chain
    pub transactions_saved: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_sign_predicates() {
        assert!(Balance::new("A", -50).is_debtor());
        assert!(Balance::new("B", 75).is_creditor());
        assert!(Balance::new("C", 0).is_settled());
    }

    #[test]
    fn test_transaction_display() {
        let tx = Transaction {
            debtor: ParticipantId::new("A"),
            creditor: ParticipantId::new("C"),
            amount: 50,
        };
        assert_eq!(tx.to_string(), "A pays C 50");
    }

    #[test]
    fn test_participant_id_serializes_as_string() {
        let balance = Balance::new("yuval", -200);
        let json = serde_json::to_string(&balance).unwrap();
        assert_eq!(json, r#"{"id":"yuval","net":-200}"#);
    }
}
