//! Main settlement engine
//!
//! Orchestrates the caller adapters (poker, union, food) and the solver,
//! and packages the result as a [`SettlementPlan`].

use crate::{
    config::Config,
    food::{food_balances, FoodExpense},
    poker::{aggregate_union, collect_leftovers, poker_balances, PlayerResult},
    solver::SettlementSolver,
    types::*,
    Error, Result,
};
use chrono::Utc;
use uuid::Uuid;

/// Settlement engine
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    /// Solver
    solver: SettlementSolver,

    /// Configuration
    config: Config,
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let solver = SettlementSolver::new(config.solver.clone());

        Ok(Self { solver, config })
    }

    /// Engine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Settle caller-provided net balances
    pub fn settle_balances(&self, balances: &[Balance]) -> Result<SettlementPlan> {
        self.settle(SettlementKind::Direct, balances)
    }

    /// Settle a single poker table
    pub fn settle_poker(&self, players: &[PlayerResult]) -> Result<SettlementPlan> {
        let balances = poker_balances(players, &self.config.poker)?;
        self.settle(SettlementKind::Poker, &balances)
    }

    /// Pool chip remainders, hand them to `winner`, then settle the table
    pub fn settle_poker_with_leftovers(
        &self,
        players: &[PlayerResult],
        winner: &ParticipantId,
    ) -> Result<SettlementPlan> {
        let counts: Vec<(ParticipantId, i64)> = players
            .iter()
            .map(|p| (p.id.clone(), p.final_chips))
            .collect();

        let pool = collect_leftovers(&counts, &self.config.poker.leftover)?;
        let awarded = pool.award(winner)?;

        tracing::info!("Leftover pool of {} chips awarded to {}", pool.total, winner);

        let adjusted: Vec<PlayerResult> = players
            .iter()
            .zip(awarded)
            .map(|(player, (_, chips))| PlayerResult::new(player.id.clone(), player.buy_ins, chips))
            .collect();

        self.settle_poker(&adjusted)
    }

    /// Settle several tables as one union
    pub fn settle_union(&self, tables: &[Vec<PlayerResult>]) -> Result<SettlementPlan> {
        let merged = aggregate_union(tables)?;
        tracing::info!(
            "Union of {} tables: {} distinct players",
            tables.len(),
            merged.len()
        );

        let balances = poker_balances(&merged, &self.config.poker)?;
        self.settle(SettlementKind::Union, &balances)
    }

    /// Settle shared food expenses
    pub fn settle_food(&self, expenses: &[FoodExpense]) -> Result<SettlementPlan> {
        let balances = food_balances(expenses)?;
        self.settle(SettlementKind::Food, &balances)
    }

    fn settle(&self, kind: SettlementKind, balances: &[Balance]) -> Result<SettlementPlan> {
        tracing::info!(
            "Starting {} settlement for {} participants",
            kind,
            balances.len()
        );

        let (transactions, stats) = match self.solver.solve_with_stats(balances) {
            Ok(solution) => solution,
            Err(e) => {
                tracing::warn!("{} settlement rejected: {}", kind, e);
                return Err(e);
            }
        };

        let total_transferred = transactions.iter().try_fold(0i64, |acc, tx| {
            acc.checked_add(tx.amount)
                .ok_or_else(|| Error::AmountOverflow(format!("{} settlement total", kind)))
        })?;
        let plan = SettlementPlan {
            plan_id: Uuid::new_v4(),
            kind,
            created_at: Utc::now(),
            transactions,
            participant_count: balances.len(),
            settled_count: balances.iter().filter(|b| b.is_settled()).count(),
            total_transferred,
            stats,
        };

        tracing::info!(
            "Settlement {} complete: {} transactions, {} transferred",
            plan.plan_id,
            plan.transaction_count(),
            plan.total_transferred
        );

        Ok(plan)
    }

    /// Summary statistics for a plan
    pub fn stats(&self, plan: &SettlementPlan) -> SettlementStats {
        let active_participants = plan.participant_count - plan.settled_count;
        let naive_transaction_count = active_participants.saturating_sub(1);

        SettlementStats {
            active_participants,
            transaction_count: plan.transaction_count(),
            total_transferred: plan.total_transferred,
            naive_transaction_count,
            transactions_saved: naive_transaction_count.saturating_sub(plan.transaction_count()),
        }
    }
}
