//! Bonanza Settlement Engine
//!
//! Computes the minimum number of pairwise payments that settles a game
//! night: poker chip results, food expenses and cross-table unions.
//!
//! # Architecture
//!
//! 1. **Adapters**: Turn chip counts or expenses into net balances
//! 2. **Solver**: Memoized exhaustive search for a minimum-cardinality plan
//! 3. **Verification**: Replay the plan and check every balance reaches zero
//! 4. **Display**: Convert integer units back to currency for the caller
//!
//! # Invariants
//!
//! - Money conservation: Σ(net) == 0, otherwise the input is rejected
//! - Sign respect: debtors only pay, creditors only receive
//! - Minimality: no plan with fewer transactions exists
//!
//! # Example
//!
//! ```
//! use settlement::{solve, Balance};
//!
//! let balances = vec![
//!     Balance::new("A", -50),
//!     Balance::new("B", -25),
//!     Balance::new("C", 75),
//! ];
//!
//! let transactions = solve(&balances).unwrap();
//! assert_eq!(transactions.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod solver;
pub mod verify;
pub mod money;
pub mod poker;
pub mod food;
pub mod error;
pub mod config;
pub mod engine;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use engine::SettlementEngine;
pub use solver::{solve, SettlementSolver, SolverConfig};
pub use verify::verify_settlement;
