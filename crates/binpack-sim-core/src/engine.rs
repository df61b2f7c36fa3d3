use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::config::{Algorithm, RunConfig, SimulationInput};
use crate::error::Result;
use crate::model::{Bin, Item};
use crate::search::{self, BinSearch};
use crate::trace::{Event, Trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of a run that may be interrupted.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every item was placed; the trace ends with `SimulationComplete`.
    Completed(Trace),
    /// Interrupted between two items; the trace is a prefix without `SimulationComplete`.
    Cancelled(Trace),
}

impl RunOutcome {
    pub fn trace(&self) -> &Trace {
        match self {
            RunOutcome::Completed(t) | RunOutcome::Cancelled(t) => t,
        }
    }

    pub fn into_trace(self) -> Trace {
        match self {
            RunOutcome::Completed(t) | RunOutcome::Cancelled(t) => t,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled(_))
    }
}

/// Simulates `input` and returns the full event trace.
///
/// Notes:
/// - Deterministic: the same input always yields the same trace.
/// - Cannot fail; every validated item fits into a fresh bin.
#[instrument(skip_all, fields(algorithm = %input.algorithm(), items = input.len()))]
pub fn run(input: &SimulationInput) -> Trace {
    Simulation::new(input).run_to_end(None).into_trace()
}

/// Like [`run`], but polls `stop` before sorting and before each item.
///
/// A cancelled trace always ends at an item boundary: no item is ever half placed.
#[instrument(skip_all, fields(algorithm = %input.algorithm(), items = input.len()))]
pub fn run_cancellable(input: &SimulationInput, stop: &AtomicBool) -> RunOutcome {
    Simulation::new(input).run_to_end(Some(stop))
}

/// Runs independent inputs, in parallel when feature "parallel" is on and `parallel` is set.
/// Traces are returned in input order.
#[instrument(skip_all, fields(runs = inputs.len(), parallel = parallel))]
pub fn run_batch(inputs: &[SimulationInput], parallel: bool) -> Vec<Trace> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return inputs.par_iter().map(run).collect();
        }
    }
    inputs.iter().map(run).collect()
}

/// The same items run through every heuristic.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub runs: Vec<(Algorithm, Trace)>,
}

impl Comparison {
    /// Heuristic with the fewest bins; ties go to the earlier one in canonical order.
    pub fn best(&self) -> Option<(Algorithm, &Trace)> {
        let mut best: Option<(Algorithm, &Trace, usize)> = None;
        for (algo, trace) in &self.runs {
            let bins = trace.total_bins_used().unwrap_or(usize::MAX);
            match best {
                Some((_, _, b)) if bins >= b => {}
                _ => best = Some((*algo, trace, bins)),
            }
        }
        best.map(|(a, t, _)| (a, t))
    }

    pub fn get(&self, algorithm: Algorithm) -> Option<&Trace> {
        self.runs
            .iter()
            .find(|(a, _)| *a == algorithm)
            .map(|(_, t)| t)
    }
}

/// Validates `sizes` once and runs all four heuristics on them.
#[instrument(skip_all, fields(items = sizes.len()))]
pub fn compare(sizes: &[f64], cfg: &RunConfig) -> Result<Comparison> {
    let base = cfg.input(sizes)?;
    let inputs: Vec<SimulationInput> = Algorithm::ALL
        .iter()
        .map(|a| base.with_algorithm(*a))
        .collect();
    let traces = run_batch(&inputs, cfg.parallel);
    let comparison = Comparison {
        runs: Algorithm::ALL.iter().copied().zip(traces).collect(),
    };
    if let Some((best, trace)) = comparison.best() {
        debug!(best = %best, bins = ?trace.total_bins_used(), "comparison finished");
    }
    Ok(comparison)
}

// ---------- simulation state ----------

struct Simulation<'a> {
    input: &'a SimulationInput,
    search: Box<dyn BinSearch + Send + Sync>,
    bins: Vec<Bin>,
    events: Vec<Event>,
}

impl<'a> Simulation<'a> {
    fn new(input: &'a SimulationInput) -> Self {
        Self {
            input,
            search: search::for_strategy(input.algorithm().search()),
            bins: Vec::new(),
            events: Vec::new(),
        }
    }

    fn run_to_end(mut self, stop: Option<&AtomicBool>) -> RunOutcome {
        let stopped = |s: Option<&AtomicBool>| s.is_some_and(|f| f.load(Ordering::Relaxed));

        if stopped(stop) {
            debug!("run cancelled before start");
            return RunOutcome::Cancelled(Trace::from_events(self.events));
        }

        let order = self.processing_order();

        for item in &order {
            if stopped(stop) {
                debug!(
                    placed = self.placed_count(),
                    total = order.len(),
                    "run cancelled"
                );
                return RunOutcome::Cancelled(Trace::from_events(self.events));
            }
            self.place(item);
        }

        let total_bins_used = self.bins.len();
        self.events.push(Event::SimulationComplete { total_bins_used });
        debug!(
            bins = total_bins_used,
            events = self.events.len(),
            "simulation complete"
        );
        RunOutcome::Completed(Trace::from_events(self.events))
    }

    /// Items in processing order; emits `SortApplied` for the Decreasing variants.
    /// An empty input has nothing to sort, so its trace is just `SimulationComplete`.
    fn processing_order(&mut self) -> Vec<Item> {
        let mut order: Vec<Item> = self.input.items().to_vec();
        if self.input.algorithm().is_decreasing() && !order.is_empty() {
            // stable: equal sizes keep their input order
            order.sort_by(|a, b| b.size.total_cmp(&a.size));
            self.events.push(Event::SortApplied {
                order: order.iter().map(|it| it.index).collect(),
            });
        }
        order
    }

    fn place(&mut self, item: &Item) {
        let target = match self.search.select(&self.bins, item, &mut self.events) {
            Some(idx) => idx,
            None => self.open_bin(),
        };
        let bin = &mut self.bins[target];
        let resulting_fill_level = bin.place(item.size);
        debug_assert!(bin.within_capacity());
        trace!(
            item = item.index,
            size = item.size,
            bin = target,
            fill = resulting_fill_level,
            "item placed"
        );
        self.events.push(Event::ItemPlaced {
            item_original_index: item.index,
            bin_index: target,
            resulting_fill_level,
        });
    }

    fn open_bin(&mut self) -> usize {
        let index = self.bins.len();
        self.bins.push(Bin::new(index));
        self.events.push(Event::BinCreated { bin_index: index });
        debug!(bin = index, "bin created");
        index
    }

    fn placed_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::ItemPlaced { .. }))
            .count()
    }
}
