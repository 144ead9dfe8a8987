//! Poker chip settlement
//!
//! Turns end-of-game chip counts into net balances:
//!
//! ```text
//! net = final_chips - buy_ins * chips_per_buy_in
//! ```
//!
//! Also covers cross-table unions (several tables settled as one) and the
//! leftover pool: chip remainders below the smallest denomination are
//! pooled and awarded to one player before the table is settled.

use crate::{money::ChipRate, solver::ensure_unique, types::*, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One player's result at a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    /// Player
    pub id: ParticipantId,

    /// Number of buy-ins taken
    pub buy_ins: u32,

    /// Chips held at the end of the game
    pub final_chips: i64,
}

impl PlayerResult {
    /// Create new player result
    pub fn new(id: impl Into<ParticipantId>, buy_ins: u32, final_chips: i64) -> Self {
        Self {
            id: id.into(),
            buy_ins,
            final_chips,
        }
    }
}

/// Leftover pool rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeftoverConfig {
    /// Smallest chip denomination paid out; remainders go to the pool
    pub denomination: i64,

    /// Smallest remainder that enters its owner into the draw
    pub min_contribution: i64,
}

impl Default for LeftoverConfig {
    fn default() -> Self {
        Self {
            denomination: 50,
            min_contribution: 10,
        }
    }
}

/// Poker settlement configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PokerConfig {
    /// Chips handed out per buy-in
    pub chips_per_buy_in: i64,

    /// Conversion used when displaying results
    pub chip_rate: ChipRate,

    /// Leftover pool rules
    pub leftover: LeftoverConfig,
}

impl Default for PokerConfig {
    fn default() -> Self {
        Self {
            chips_per_buy_in: 100,
            chip_rate: ChipRate::default(),
            leftover: LeftoverConfig::default(),
        }
    }
}

/// Net chip balances for a single table
pub fn poker_balances(players: &[PlayerResult], config: &PokerConfig) -> Result<Vec<Balance>> {
    if config.chips_per_buy_in <= 0 {
        return Err(Error::InvalidInput(format!(
            "chips_per_buy_in must be positive, got {}",
            config.chips_per_buy_in
        )));
    }

    ensure_unique(players.iter().map(|player| &player.id))?;

    players
        .iter()
        .map(|player| {
            if player.final_chips < 0 {
                return Err(Error::InvalidInput(format!(
                    "{} has negative chip count {}",
                    player.id, player.final_chips
                )));
            }

            let invested = i64::from(player.buy_ins)
                .checked_mul(config.chips_per_buy_in)
                .ok_or_else(|| Error::AmountOverflow(format!("buy-ins of {}", player.id)))?;
            let net = player
                .final_chips
                .checked_sub(invested)
                .ok_or_else(|| Error::AmountOverflow(format!("net of {}", player.id)))?;

            Ok(Balance::new(player.id.clone(), net))
        })
        .collect()
}

/// Merge several tables into one result per player
///
/// Buy-ins and final chips are summed; players keep the order of their first
/// appearance.
pub fn aggregate_union(tables: &[Vec<PlayerResult>]) -> Result<Vec<PlayerResult>> {
    let mut merged: Vec<PlayerResult> = Vec::new();
    let mut index: HashMap<ParticipantId, usize> = HashMap::new();

    for player in tables.iter().flatten() {
        match index.get(&player.id) {
            Some(&i) => {
                let entry = &mut merged[i];
                entry.buy_ins = entry
                    .buy_ins
                    .checked_add(player.buy_ins)
                    .ok_or_else(|| Error::AmountOverflow(format!("buy-ins of {}", player.id)))?;
                entry.final_chips = entry
                    .final_chips
                    .checked_add(player.final_chips)
                    .ok_or_else(|| Error::AmountOverflow(format!("chips of {}", player.id)))?;
            }
            None => {
                index.insert(player.id.clone(), merged.len());
                merged.push(player.clone());
            }
        }
    }

    Ok(merged)
}

/// A player's remainder entered into the draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftoverEntry {
    /// Player
    pub id: ParticipantId,

    /// Chips given to the pool
    pub remainder: i64,
}

/// Pooled chip remainders of one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftoverPool {
    /// Total chips in the pool
    pub total: i64,

    /// Players whose remainder enters them into the draw
    pub participants: Vec<LeftoverEntry>,

    /// Players who give a small remainder without entering the draw
    pub donors: Vec<LeftoverEntry>,

    /// Chip counts after removing each remainder
    pub adjusted: Vec<(ParticipantId, i64)>,
}

impl LeftoverPool {
    /// Check if a player is in the draw
    pub fn is_participant(&self, id: &ParticipantId) -> bool {
        self.participants.iter().any(|entry| &entry.id == id)
    }

    /// Hand the whole pool to `winner`, returning the final chip counts
    pub fn award(&self, winner: &ParticipantId) -> Result<Vec<(ParticipantId, i64)>> {
        if self.total == 0 {
            return Ok(self.adjusted.clone());
        }

        if !self.is_participant(winner) {
            return Err(Error::Leftover(format!(
                "{} is not in the leftover draw",
                winner
            )));
        }

        self.adjusted
            .iter()
            .map(|(id, chips)| {
                if id == winner {
                    chips
                        .checked_add(self.total)
                        .map(|won| (id.clone(), won))
                        .ok_or_else(|| Error::AmountOverflow(format!("leftovers of {}", id)))
                } else {
                    Ok((id.clone(), *chips))
                }
            })
            .collect()
    }
}

/// Split each chip count into a payable part and a pooled remainder
pub fn collect_leftovers(
    counts: &[(ParticipantId, i64)],
    config: &LeftoverConfig,
) -> Result<LeftoverPool> {
    if config.denomination <= 0 {
        return Err(Error::Config(format!(
            "leftover denomination must be positive, got {}",
            config.denomination
        )));
    }

    ensure_unique(counts.iter().map(|(id, _)| id))?;

    let mut pool = LeftoverPool::default();

    for (id, chips) in counts {
        if *chips < 0 {
            return Err(Error::InvalidInput(format!(
                "{} has negative chip count {}",
                id, chips
            )));
        }

        let remainder = chips % config.denomination;
        pool.adjusted.push((id.clone(), chips - remainder));

        if remainder == 0 {
            continue;
        }

        pool.total = pool
            .total
            .checked_add(remainder)
            .ok_or_else(|| Error::AmountOverflow("leftover pool".to_string()))?;
        let entry = LeftoverEntry {
            id: id.clone(),
            remainder,
        };
        if remainder >= config.min_contribution {
            pool.participants.push(entry);
        } else {
            pool.donors.push(entry);
        }
    }

    tracing::debug!(
        "Leftover pool: {} chips, {} in draw, {} donors",
        pool.total,
        pool.participants.len(),
        pool.donors.len()
    );

    Ok(pool)
}
