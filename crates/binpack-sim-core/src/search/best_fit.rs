use super::BinSearch;
use crate::model::{Bin, Item};
use crate::trace::Event;

/// Scans every bin and keeps the candidate with the smallest residual.
///
/// The running best only changes on a strictly smaller residual, so among equal
/// residuals the earliest bin wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFitSearch;

impl BinSearch for BestFitSearch {
    fn select(&self, bins: &[Bin], item: &Item, events: &mut Vec<Event>) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for bin in bins {
            let residual = bin.residual(item.size);
            let candidate = bin.is_candidate(item.size);
            events.push(Event::BinInspected {
                item_original_index: item.index,
                bin_index: bin.index,
                accepted: candidate,
            });
            if !candidate {
                continue;
            }
            let improves = match best {
                None => true,
                Some((_, best_residual)) => residual < best_residual,
            };
            if improves {
                best = Some((bin.index, residual));
                events.push(Event::BestCandidateUpdated {
                    item_original_index: item.index,
                    bin_index: bin.index,
                });
            }
        }
        best.map(|(idx, _)| idx)
    }
}
