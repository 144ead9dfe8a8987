//! Food expense settlement
//!
//! Each expense has one payer who covered the whole bill and a list of
//! sub-orders naming who ate what. A participant's net is what they paid
//! minus what they ordered, so someone who ate more than they paid ends up
//! a debtor.

use crate::{types::*, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One diner's share of an expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubOrder {
    /// Diner
    pub participant: ParticipantId,

    /// Amount owed for this order
    pub amount: i64,
}

/// A bill paid by one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodExpense {
    /// Who paid the bill
    pub payer: ParticipantId,

    /// Total paid
    pub total: i64,

    /// Who owes what
    pub sub_orders: Vec<SubOrder>,
}

impl FoodExpense {
    /// Sum of all sub-orders
    pub fn ordered_total(&self) -> Result<i64> {
        self.sub_orders.iter().try_fold(0i64, |acc, order| {
            acc.checked_add(order.amount)
                .ok_or_else(|| Error::AmountOverflow(format!("sub-orders paid by {}", self.payer)))
        })
    }

    /// Check if sub-orders account for the full bill
    pub fn is_balanced(&self) -> Result<bool> {
        Ok(self.ordered_total()? == self.total)
    }
}

#[derive(Debug, Default)]
struct Tally {
    paid: i64,
    owed: i64,
}

fn tally<'a>(
    order: &mut Vec<ParticipantId>,
    tallies: &'a mut HashMap<ParticipantId, Tally>,
    id: &ParticipantId,
) -> &'a mut Tally {
    if !tallies.contains_key(id) {
        order.push(id.clone());
    }
    tallies.entry(id.clone()).or_default()
}

/// Net balances across all expenses, in first-appearance order
pub fn food_balances(expenses: &[FoodExpense]) -> Result<Vec<Balance>> {
    let mut order: Vec<ParticipantId> = Vec::new();
    let mut tallies: HashMap<ParticipantId, Tally> = HashMap::new();

    for expense in expenses {
        if expense.total < 0 {
            return Err(Error::InvalidInput(format!(
                "expense paid by {} has negative total {}",
                expense.payer, expense.total
            )));
        }

        let ordered = expense.ordered_total()?;
        if ordered != expense.total {
            tracing::warn!(
                "Expense paid by {}: sub-orders sum to {} but total is {}",
                expense.payer,
                ordered,
                expense.total
            );
        }

        let payer = tally(&mut order, &mut tallies, &expense.payer);
        payer.paid = payer
            .paid
            .checked_add(expense.total)
            .ok_or_else(|| Error::AmountOverflow(format!("payments of {}", expense.payer)))?;

        for sub in &expense.sub_orders {
            if sub.amount < 0 {
                return Err(Error::InvalidInput(format!(
                    "sub-order of {} has negative amount {}",
                    sub.participant, sub.amount
                )));
            }

            let diner = tally(&mut order, &mut tallies, &sub.participant);
            diner.owed = diner
                .owed
                .checked_add(sub.amount)
                .ok_or_else(|| Error::AmountOverflow(format!("orders of {}", sub.participant)))?;
        }
    }

    order
        .into_iter()
        .map(|id| {
            let Tally { paid, owed } = tallies.remove(&id).unwrap_or_default();
            let net = paid
                .checked_sub(owed)
                .ok_or_else(|| Error::AmountOverflow(format!("net of {}", id)))?;
            Ok(Balance::new(id, net))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(participant: &str, amount: i64) -> SubOrder {
        SubOrder {
            participant: ParticipantId::new(participant),
            amount,
        }
    }

    #[test]
    fn test_payer_is_creditor() {
        let expenses = vec![FoodExpense {
            payer: ParticipantId::new("A"),
            total: 900,
            sub_orders: vec![order("B", 150), order("C", 600), order("D", 150)],
        }];

        let balances = food_balances(&expenses).unwrap();
        assert_eq!(
            balances,
            vec![
                Balance::new("A", 900),
                Balance::new("B", -150),
                Balance::new("C", -600),
                Balance::new("D", -150),
            ]
        );
    }

    #[test]
    fn test_payer_who_also_ate() {
        let expenses = vec![
            FoodExpense {
                payer: ParticipantId::new("Alice"),
                total: 100,
                sub_orders: vec![order("Alice", 40), order("Bob", 60)],
            },
            FoodExpense {
                payer: ParticipantId::new("Bob"),
                total: 30,
                sub_orders: vec![order("Alice", 30)],
            },
        ];

        let balances = food_balances(&expenses).unwrap();
        assert_eq!(
            balances,
            vec![Balance::new("Alice", 30), Balance::new("Bob", -30)]
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        let expenses = vec![FoodExpense {
            payer: ParticipantId::new("A"),
            total: 10,
            sub_orders: vec![order("B", -10)],
        }];
        assert!(matches!(
            food_balances(&expenses),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unbalanced_expense_detected() {
        let expense = FoodExpense {
            payer: ParticipantId::new("A"),
            total: 100,
            sub_orders: vec![order("B", 90)],
        };
        assert!(!expense.is_balanced().unwrap());

        let balances = food_balances(&[expense]).unwrap();
        let total: i64 = balances.iter().map(|b| b.net).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_ordered_total_overflow_rejected() {
        let expense = FoodExpense {
            payer: ParticipantId::new("A"),
            total: 0,
            sub_orders: vec![order("B", i64::MAX), order("C", i64::MAX)],
        };
        assert!(matches!(
            expense.ordered_total(),
            Err(Error::AmountOverflow(_))
        ));
        assert!(matches!(
            food_balances(&[expense]),
            Err(Error::AmountOverflow(_))
        ));
    }
}
