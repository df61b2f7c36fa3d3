//! Core library for simulating greedy bin-packing heuristics.
//!
//! - Heuristics: First-Fit, Best-Fit and their size-sorted Decreasing variants
//! - Engine: `run` turns a validated `SimulationInput` into an ordered event `Trace`
//! - The trace is serde-serializable and replayable; renderers consume it, the engine never calls them.
//!
//! Quick example:
//! ```
//! use binpack_sim_core::{run, validate, Event};
//! # fn main() -> binpack_sim_core::Result<()> {
//! let input = validate(&[0.5, 0.4, 0.3], "FF")?;
//! let trace = run(&input);
//! assert_eq!(trace.total_bins_used(), Some(2));
//! assert!(matches!(trace.events().last(), Some(Event::SimulationComplete { .. })));
//! # Ok(()) }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod model;
pub mod replay;
pub mod search;
pub mod trace;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use replay::*;
pub use trace::*;

/// Convenience prelude for common types and functions.
/// Importing `binpack_sim_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        Algorithm, RunConfig, RunConfigBuilder, SearchStrategy, SimulationInput, validate,
    };
    pub use crate::engine::{Comparison, RunOutcome, compare, run, run_batch, run_cancellable};
    pub use crate::error::SimError;
    pub use crate::model::{BIN_CAPACITY, Bin, Item, TOLERANCE};
    pub use crate::replay::Replay;
    pub use crate::trace::{Event, Placement, Trace, TraceStats, lower_bound};
}
