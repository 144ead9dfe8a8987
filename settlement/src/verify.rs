//! Settlement verification
//!
//! Replays a list of transactions against the original balances and checks
//! that every participant ends at exactly zero.

use crate::{types::*, Error, Result};
use std::collections::{BTreeMap, HashMap};

/// Apply `transactions` to `balances` and return what is left per participant
///
/// A debtor's net rises by the amount paid, a creditor's net falls by the
/// amount received.
pub fn residual_balances(
    balances: &[Balance],
    transactions: &[Transaction],
) -> Result<BTreeMap<ParticipantId, i64>> {
    let mut residual: BTreeMap<ParticipantId, i64> = balances
        .iter()
        .map(|b| (b.id.clone(), b.net))
        .collect();

    for tx in transactions {
        let debtor = residual.get_mut(&tx.debtor).ok_or_else(|| {
            Error::InvariantViolation(format!("unknown debtor {}", tx.debtor))
        })?;
        *debtor = debtor
            .checked_add(tx.amount)
            .ok_or_else(|| Error::AmountOverflow(format!("applying {}", tx)))?;

        let creditor = residual.get_mut(&tx.creditor).ok_or_else(|| {
            Error::InvariantViolation(format!("unknown creditor {}", tx.creditor))
        })?;
        *creditor = creditor
            .checked_sub(tx.amount)
            .ok_or_else(|| Error::AmountOverflow(format!("applying {}", tx)))?;
    }

    Ok(residual)
}

/// Check that `transactions` fully and legally settle `balances`
pub fn verify_settlement(balances: &[Balance], transactions: &[Transaction]) -> Result<()> {
    let original: HashMap<&ParticipantId, i64> =
        balances.iter().map(|b| (&b.id, b.net)).collect();

    for tx in transactions {
        if tx.debtor == tx.creditor {
            return Err(Error::InvariantViolation(format!(
                "self payment by {}",
                tx.debtor
            )));
        }

        if tx.amount <= 0 {
            return Err(Error::InvariantViolation(format!(
                "non-positive amount in {}",
                tx
            )));
        }

        // A participant who started as a creditor never pays, and vice versa
        if original.get(&tx.debtor).is_some_and(|&net| net >= 0) {
            return Err(Error::InvariantViolation(format!(
                "{} pays but did not start in debt",
                tx.debtor
            )));
        }
        if original.get(&tx.creditor).is_some_and(|&net| net <= 0) {
            return Err(Error::InvariantViolation(format!(
                "{} receives but was not owed",
                tx.creditor
            )));
        }
    }

    let residual = residual_balances(balances, transactions)?;
    if let Some((id, left)) = residual.iter().find(|(_, &net)| net != 0) {
        return Err(Error::InvariantViolation(format!(
            "{} left with nonzero balance {}",
            id, left
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(debtor: &str, creditor: &str, amount: i64) -> Transaction {
        Transaction {
            debtor: ParticipantId::new(debtor),
            creditor: ParticipantId::new(creditor),
            amount,
        }
    }

    fn balances() -> Vec<Balance> {
        vec![
            Balance::new("Alice", -50),
            Balance::new("Bob", -25),
            Balance::new("Charlie", 75),
        ]
    }

    #[test]
    fn test_valid_settlement_accepted() {
        let plan = vec![tx("Alice", "Charlie", 50), tx("Bob", "Charlie", 25)];
        assert!(verify_settlement(&balances(), &plan).is_ok());
    }

    #[test]
    fn test_shortfall_rejected() {
        let plan = vec![tx("Alice", "Charlie", 50)];
        let err = verify_settlement(&balances(), &plan).unwrap_err();
        assert!(err.to_string().contains("Bob left with nonzero balance -25"));
    }

    #[test]
    fn test_reversed_direction_rejected() {
        let plan = vec![tx("Charlie", "Alice", 50), tx("Bob", "Charlie", 25)];
        assert!(matches!(
            verify_settlement(&balances(), &plan),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_self_payment_rejected() {
        let plan = vec![tx("Alice", "Alice", 50)];
        assert!(verify_settlement(&balances(), &plan).is_err());
    }

    #[test]
    fn test_unknown_participant_rejected() {
        let plan = vec![tx("Mallory", "Charlie", 75)];
        assert!(residual_balances(&balances(), &plan).is_err());
    }

    #[test]
    fn test_residuals() {
        let plan = vec![tx("Alice", "Charlie", 30)];
        let residual = residual_balances(&balances(), &plan).unwrap();
        assert_eq!(residual[&ParticipantId::new("Alice")], -20);
        assert_eq!(residual[&ParticipantId::new("Charlie")], 45);
        assert_eq!(residual[&ParticipantId::new("Bob")], -25);
    }
}
