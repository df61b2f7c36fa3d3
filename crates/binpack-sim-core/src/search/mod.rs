use crate::config::SearchStrategy;
use crate::model::{Bin, Item};
use crate::trace::Event;

pub mod best_fit;
pub mod first_fit;

/// A search picks the target bin for one item among the bins opened so far.
///
/// Implementations must emit a `BinInspected` event for every bin they look at and
/// must not mutate any bin. `select` returns `None` when no existing bin qualifies;
/// the engine then opens a new one.
pub trait BinSearch {
    fn select(&self, bins: &[Bin], item: &Item, events: &mut Vec<Event>) -> Option<usize>;
}

/// Boxed search for `strategy`, resolved once per run.
pub fn for_strategy(strategy: SearchStrategy) -> Box<dyn BinSearch + Send + Sync> {
    match strategy {
        SearchStrategy::FirstFit => Box::new(first_fit::FirstFitSearch),
        SearchStrategy::BestFit => Box::new(best_fit::BestFitSearch),
    }
}
