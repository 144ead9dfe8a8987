//! Settlement command line tool
//!
//! Usage: `settle <request.json> [config.toml]`
//!
//! Reads a settlement request, prints the plan as JSON on stdout.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use settlement::{
    food::FoodExpense,
    money::{chips_to_display, units_to_display, DisplayTransaction},
    poker::PlayerResult,
    Balance, Config, ParticipantId, SettlementEngine, SettlementPlan, SettlementStats,
};

/// Settlement request read from disk
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Request {
    /// Net balances already in minor currency units
    Direct {
        balances: Vec<Balance>,
    },
    Poker {
        players: Vec<PlayerResult>,
        #[serde(default)]
        leftover_winner: Option<ParticipantId>,
    },
    Union {
        tables: Vec<Vec<PlayerResult>>,
    },
    Food {
        expenses: Vec<FoodExpense>,
    },
}

#[derive(Debug, Serialize)]
struct Response {
    plan: SettlementPlan,
    display: Vec<DisplayTransaction>,
    stats: SettlementStats,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for the plan
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let request_path = args
        .next()
        .context("usage: settle <request.json> [config.toml]")?;

    let config = match args.next() {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        None => Config::from_env().context("loading config from environment")?,
    };

    tracing::info!("Starting {}", config.service_name);

    let raw = std::fs::read_to_string(&request_path)
        .with_context(|| format!("reading {}", request_path))?;
    let request: Request = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", request_path))?;

    let engine = SettlementEngine::new(config)?;
    let chip_rate = engine.config().poker.chip_rate;

    let (plan, display) = match request {
        Request::Direct { balances } => {
            let plan = engine.settle_balances(&balances)?;
            let display = units_to_display(&plan.transactions, engine.config().food.scale);
            (plan, display)
        }
        Request::Poker {
            players,
            leftover_winner,
        } => {
            let plan = match leftover_winner {
                Some(winner) => engine.settle_poker_with_leftovers(&players, &winner)?,
                None => engine.settle_poker(&players)?,
            };
            let display = chips_to_display(&plan.transactions, chip_rate)?;
            (plan, display)
        }
        Request::Union { tables } => {
            let plan = engine.settle_union(&tables)?;
            let display = chips_to_display(&plan.transactions, chip_rate)?;
            (plan, display)
        }
        Request::Food { expenses } => {
            let plan = engine.settle_food(&expenses)?;
            let display = units_to_display(&plan.transactions, engine.config().food.scale);
            (plan, display)
        }
    };

    let stats = engine.stats(&plan);
    let response = Response {
        plan,
        display,
        stats,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
