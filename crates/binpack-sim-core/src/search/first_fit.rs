use super::BinSearch;
use crate::model::{Bin, Item};
use crate::trace::Event;

/// Scans bins in creation order and stops at the first one that accepts the item.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitSearch;

impl BinSearch for FirstFitSearch {
    fn select(&self, bins: &[Bin], item: &Item, events: &mut Vec<Event>) -> Option<usize> {
        for bin in bins {
            let accepted = bin.fits(item.size);
            events.push(Event::BinInspected {
                item_original_index: item.index,
                bin_index: bin.index,
                accepted,
            });
            if accepted {
                return Some(bin.index);
            }
        }
        None
    }
}
