use serde::{Deserialize, Serialize};

use crate::model::TOLERANCE;

/// One decision made by the engine. The ordered sequence of events is the
/// contract with renderers; every state change appears as its own event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    /// Processing order after the descending sort (original indices). Decreasing variants only.
    SortApplied { order: Vec<usize> },
    BinCreated { bin_index: usize },
    BinInspected {
        item_original_index: usize,
        bin_index: usize,
        accepted: bool,
    },
    /// The running Best-Fit target changed. Best-Fit variants only.
    BestCandidateUpdated {
        item_original_index: usize,
        bin_index: usize,
    },
    ItemPlaced {
        item_original_index: usize,
        bin_index: usize,
        resulting_fill_level: f64,
    },
    /// Always the final event of a complete trace.
    SimulationComplete { total_bins_used: usize },
}

impl Event {
    /// The original item index this event refers to, if any.
    pub fn item(&self) -> Option<usize> {
        match self {
            Event::BinInspected {
                item_original_index,
                ..
            }
            | Event::BestCandidateUpdated {
                item_original_index,
                ..
            }
            | Event::ItemPlaced {
                item_original_index,
                ..
            } => Some(*item_original_index),
            _ => None,
        }
    }

    /// The bin this event refers to, if any.
    pub fn bin(&self) -> Option<usize> {
        match self {
            Event::BinCreated { bin_index }
            | Event::BinInspected { bin_index, .. }
            | Event::BestCandidateUpdated { bin_index, .. }
            | Event::ItemPlaced { bin_index, .. } => Some(*bin_index),
            _ => None,
        }
    }

    /// Variant name as it appears in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SortApplied { .. } => "SortApplied",
            Event::BinCreated { .. } => "BinCreated",
            Event::BinInspected { .. } => "BinInspected",
            Event::BestCandidateUpdated { .. } => "BestCandidateUpdated",
            Event::ItemPlaced { .. } => "ItemPlaced",
            Event::SimulationComplete { .. } => "SimulationComplete",
        }
    }
}

/// A single placement extracted from a trace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Placement {
    pub item_original_index: usize,
    pub bin_index: usize,
    pub resulting_fill_level: f64,
}

/// Ordered record of every decision of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Trace {
    events: Vec<Event>,
}

impl Trace {
    pub(crate) fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// True when the trace ends with `SimulationComplete`.
    pub fn is_complete(&self) -> bool {
        matches!(self.events.last(), Some(Event::SimulationComplete { .. }))
    }

    /// Bins used, as reported by `SimulationComplete`; `None` for a cancelled prefix.
    pub fn total_bins_used(&self) -> Option<usize> {
        match self.events.last() {
            Some(Event::SimulationComplete { total_bins_used }) => Some(*total_bins_used),
            _ => None,
        }
    }

    /// The processing order emitted by `SortApplied`, if the run sorted.
    pub fn sort_order(&self) -> Option<&[usize]> {
        self.events.iter().find_map(|e| match e {
            Event::SortApplied { order } => Some(order.as_slice()),
            _ => None,
        })
    }

    /// All placements in processing order.
    pub fn placements(&self) -> Vec<Placement> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::ItemPlaced {
                    item_original_index,
                    bin_index,
                    resulting_fill_level,
                } => Some(Placement {
                    item_original_index: *item_original_index,
                    bin_index: *bin_index,
                    resulting_fill_level: *resulting_fill_level,
                }),
                _ => None,
            })
            .collect()
    }

    /// Fill level of every created bin at the end of the trace, indexed by bin.
    pub fn final_fill_levels(&self) -> Vec<f64> {
        let mut fills: Vec<f64> = Vec::new();
        for e in &self.events {
            match e {
                Event::BinCreated { bin_index } => {
                    if fills.len() <= *bin_index {
                        fills.resize(bin_index + 1, 0.0);
                    }
                }
                Event::ItemPlaced {
                    bin_index,
                    resulting_fill_level,
                    ..
                } => {
                    if fills.len() <= *bin_index {
                        fills.resize(bin_index + 1, 0.0);
                    }
                    fills[*bin_index] = *resulting_fill_level;
                }
                _ => {}
            }
        }
        fills
    }

    /// Events that mention the item with original index `item`, in order.
    pub fn events_for_item(&self, item: usize) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(move |e| e.item() == Some(item))
    }

    /// Computes statistics over this trace.
    pub fn stats(&self) -> TraceStats {
        let mut inspections = 0;
        let mut rejections = 0;
        let mut best_candidate_updates = 0;
        let mut items_placed = 0;
        let mut sorted = false;

        for e in &self.events {
            match e {
                Event::SortApplied { .. } => sorted = true,
                Event::BinInspected { accepted, .. } => {
                    inspections += 1;
                    if !accepted {
                        rejections += 1;
                    }
                }
                Event::BestCandidateUpdated { .. } => best_candidate_updates += 1,
                Event::ItemPlaced { .. } => items_placed += 1,
                _ => {}
            }
        }

        let fills = self.final_fill_levels();
        let total_bins = self.total_bins_used().unwrap_or(fills.len());
        let total_size: f64 = fills.iter().sum();
        let average_fill = if total_bins > 0 {
            total_size / total_bins as f64
        } else {
            0.0
        };

        TraceStats {
            total_bins,
            items_placed,
            total_size,
            lower_bound: lower_bound(total_size),
            average_fill,
            inspections,
            rejections,
            best_candidate_updates,
            sorted,
        }
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;
    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Minimum number of bins any packing of `total_size` needs.
///
/// The sum is reduced by the tolerance first so that accumulated rounding
/// (e.g. `0.5 + 0.3 + 0.2`) does not bump the bound by one.
pub fn lower_bound(total_size: f64) -> usize {
    let adjusted = total_size - TOLERANCE;
    if adjusted <= 0.0 {
        0
    } else {
        adjusted.ceil() as usize
    }
}

/// Statistics about a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TraceStats {
    /// Bins opened during the run.
    pub total_bins: usize,
    /// Number of `ItemPlaced` events.
    pub items_placed: usize,
    /// Sum of final fill levels (equals the sum of placed sizes).
    pub total_size: f64,
    /// `ceil(total_size)`, tolerance-adjusted.
    pub lower_bound: usize,
    /// total_size / total_bins (0.0 to 1.0). Higher is better.
    pub average_fill: f64,
    pub inspections: usize,
    pub rejections: usize,
    pub best_candidate_updates: usize,
    /// Whether a `SortApplied` event was emitted.
    pub sorted: bool,
}

impl TraceStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Bins: {} (lower bound {}), Items: {}, Average fill: {:.2}%, Inspections: {} ({} rejected), Best-candidate updates: {}",
            self.total_bins,
            self.lower_bound,
            self.items_placed,
            self.average_fill * 100.0,
            self.inspections,
            self.rejections,
            self.best_candidate_updates,
        )
    }

    /// Unused capacity summed over all bins.
    pub fn wasted_capacity(&self) -> f64 {
        (self.total_bins as f64 - self.total_size).max(0.0)
    }

    /// Returns wasted capacity as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_bins > 0 {
            self.wasted_capacity() / self.total_bins as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Bins used beyond the lower bound.
    pub fn excess_bins(&self) -> usize {
        self.total_bins.saturating_sub(self.lower_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_bound_ignores_rounding_noise() {
        assert_eq!(lower_bound(0.0), 0);
        assert_eq!(lower_bound(0.3), 1);
        assert_eq!(lower_bound(1.0 + 1e-12), 1);
        assert_eq!(lower_bound(1.2), 2);
    }

    #[test]
    fn event_accessors() {
        let e = Event::BinInspected {
            item_original_index: 4,
            bin_index: 1,
            accepted: false,
        };
        assert_eq!(e.item(), Some(4));
        assert_eq!(e.bin(), Some(1));
        assert_eq!(e.kind(), "BinInspected");
        let done = Event::SimulationComplete { total_bins_used: 2 };
        assert_eq!(done.item(), None);
        assert_eq!(done.bin(), None);
    }
}
