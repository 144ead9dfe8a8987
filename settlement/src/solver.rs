//! Minimum transaction count settlement
//!
//! Finds the smallest set of pairwise payments that brings every net
//! balance to zero (optimal account balancing).
//!
//! # Algorithm
//!
//! 1. Discard settled (zero) balances
//! 2. Take the first nonzero entry of the state vector
//! 3. Pair it with every later entry of opposite sign, moving
//!    `min(|a|, |b|)` between them so at least one becomes zero
//! 4. Recurse on the resulting state and keep the cheapest branch
//! 5. Memoize each state by its full contents
//!
//! Every zero-sum group of `m` balances settles in `m - 1` payments, so the
//! search reaches `n - k` payments for the finest zero-sum partition into
//! `k` groups, which is the lower bound.
//!
//! # Example
//!
//! ```text
//! Net balances:
//!   A: -50   B: -25   C: +50   D: +25
//!
//! Pairing A with C zeroes both, leaving B/D:
//!   A pays C: 50
//!   B pays D: 25
//!
//! Pairing A with D first would need 3 payments.
//! ```

use crate::{types::*, verify::verify_settlement, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, warn};

/// Solver limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum nonzero balances accepted for exhaustive search
    pub max_participants: usize,

    /// Maximum search states visited before giving up (None = unbounded)
    pub node_budget: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_participants: 20,
            node_budget: Some(5_000_000),
        }
    }
}

/// Payment between two positions of the search vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    debtor: usize,
    creditor: usize,
    amount: i64,
}

/// Cheapest path from a state, `None` if no all-zero state is reachable
type Outcome = Option<Vec<Edge>>;

/// Per-call search state
struct Search {
    memo: HashMap<Vec<i64>, Outcome>,
    explored: u64,
    budget: Option<u64>,
}

impl Search {
    fn new(budget: Option<u64>) -> Self {
        Self {
            memo: HashMap::new(),
            explored: 0,
            budget,
        }
    }

    /// Settle `state`, reusing cached results for identical states
    fn settle(&mut self, state: &[i64]) -> Result<Outcome> {
        if let Some(cached) = self.memo.get(state) {
            return Ok(cached.clone());
        }

        self.explored += 1;
        if let Some(budget) = self.budget {
            if self.explored > budget {
                return Err(Error::SearchBudgetExceeded {
                    explored: self.explored,
                });
            }
        }

        let outcome = match state.iter().position(|&amount| amount != 0) {
            None => Some(Vec::new()),
            Some(start) => self.best_pairing(state, start)?,
        };

        self.memo.insert(state.to_vec(), outcome.clone());
        Ok(outcome)
    }

    /// Try every opposite-sign partner for `state[start]`
    fn best_pairing(&mut self, state: &[i64], start: usize) -> Result<Outcome> {
        let head = state[start];
        let mut best: Outcome = None;

        for j in (start + 1)..state.len() {
            let other = state[j];
            // Same-sign entries can never cancel
            if other == 0 || (head < 0) == (other < 0) {
                continue;
            }

            // Opposite signs: the smaller magnitude always fits in i64
            let payment = i64::try_from(head.unsigned_abs().min(other.unsigned_abs()))
                .map_err(|_| Error::AmountOverflow(format!("payment between {head} and {other}")))?;
            let remainder = head + other;

            let mut next = state.to_vec();
            if head.unsigned_abs() > other.unsigned_abs() {
                next[start] = remainder;
                next[j] = 0;
            } else {
                next[start] = 0;
                next[j] = remainder;
            }

            let Some(rest) = self.settle(&next)? else {
                continue;
            };

            // Strict comparison keeps the lowest `j` among ties
            if best.as_ref().map_or(true, |path| rest.len() + 1 < path.len()) {
                let edge = if head < 0 {
                    Edge {
                        debtor: start,
                        creditor: j,
                        amount: payment,
                    }
                } else {
                    Edge {
                        debtor: j,
                        creditor: start,
                        amount: payment,
                    }
                };

                let mut path = Vec::with_capacity(rest.len() + 1);
                path.push(edge);
                path.extend(rest);
                best = Some(path);
            }
        }

        Ok(best)
    }
}

/// Settlement solver
///
/// Pure function of its input: every call builds its own search state and
/// memo table, so one solver can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct SettlementSolver {
    config: SolverConfig,
}

impl SettlementSolver {
    /// Create new solver
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solver limits
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Compute a minimum-cardinality list of payments settling `balances`
    pub fn solve(&self, balances: &[Balance]) -> Result<Vec<Transaction>> {
        self.solve_with_stats(balances).map(|(transactions, _)| transactions)
    }

    /// Same as [`solve`](Self::solve), also returning search counters
    pub fn solve_with_stats(&self, balances: &[Balance]) -> Result<(Vec<Transaction>, SolveStats)> {
        ensure_unique(balances.iter().map(|b| &b.id))?;

        let active: Vec<&Balance> = balances.iter().filter(|b| !b.is_settled()).collect();

        if active.is_empty() {
            debug!("All {} balances already settled", balances.len());
            return Ok((Vec::new(), SolveStats::default()));
        }

        if let [only] = active.as_slice() {
            warn!("Cannot settle single leftover balance {} ({})", only.id, only.net);
            return Err(Error::SingleLeftover {
                id: only.id.clone(),
                net: only.net,
            });
        }

        let total = net_total(balances)?;
        if total != 0 {
            warn!("Rejecting unbalanced input: balances sum to {}", total);
            return Err(Error::UnbalancedInput { total });
        }

        if active.len() > self.config.max_participants {
            warn!(
                "Rejecting {} nonzero balances (max {})",
                active.len(),
                self.config.max_participants
            );
            return Err(Error::TooManyParticipants {
                count: active.len(),
                max: self.config.max_participants,
            });
        }

        let amounts: Vec<i64> = active.iter().map(|b| b.net).collect();
        let mut search = Search::new(self.config.node_budget);

        let path = match search.settle(&amounts)? {
            Some(path) => path,
            None => {
                error!(
                    "Search exhausted without settling {} balanced entries",
                    amounts.len()
                );
                return Err(Error::Unsolvable);
            }
        };

        let transactions: Vec<Transaction> = path
            .into_iter()
            .filter(|edge| edge.amount != 0)
            .map(|edge| Transaction {
                debtor: active[edge.debtor].id.clone(),
                creditor: active[edge.creditor].id.clone(),
                amount: edge.amount,
            })
            .collect();

        verify_settlement(balances, &transactions)?;

        let stats = SolveStats {
            nonzero_balances: active.len(),
            nodes_explored: search.explored,
            memo_entries: search.memo.len(),
        };

        debug!(
            "Settled {} balances with {} transactions ({} states explored)",
            stats.nonzero_balances,
            transactions.len(),
            stats.nodes_explored
        );

        Ok((transactions, stats))
    }
}

/// Solve with default limits
pub fn solve(balances: &[Balance]) -> Result<Vec<Transaction>> {
    SettlementSolver::default().solve(balances)
}

/// Checked sum of all net balances
pub fn net_total(balances: &[Balance]) -> Result<i64> {
    balances.iter().try_fold(0i64, |acc, b| {
        acc.checked_add(b.net)
            .ok_or_else(|| Error::AmountOverflow(format!("summing balance of {}", b.id)))
    })
}

/// Reject the first participant id that appears twice
pub(crate) fn ensure_unique<'a>(ids: impl IntoIterator<Item = &'a ParticipantId>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::DuplicateParticipant(id.clone()));
        }
    }
    Ok(())
}
