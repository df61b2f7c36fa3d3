use crate::model::Bin;
use crate::trace::{Event, Trace};

/// Steps through a trace one event at a time, maintaining the bin state a
/// renderer needs to draw each frame.
///
/// The replay trusts the trace: bins are created on `BinCreated` and fill
/// levels are taken verbatim from `ItemPlaced`.
pub struct Replay<'a> {
    events: &'a [Event],
    cursor: usize,
    bins: Vec<Bin>,
    order: Option<&'a [usize]>,
    current_item: Option<usize>,
    best_candidate: Option<usize>,
    placed: usize,
}

impl<'a> Replay<'a> {
    pub fn new(trace: &'a Trace) -> Self {
        Self {
            events: trace.events(),
            cursor: 0,
            bins: Vec::new(),
            order: None,
            current_item: None,
            best_candidate: None,
            placed: 0,
        }
    }

    /// Applies the next event and returns it, or `None` once the trace is exhausted.
    pub fn step(&mut self) -> Option<&'a Event> {
        let event = self.events.get(self.cursor)?;
        self.cursor += 1;
        match event {
            Event::SortApplied { order } => {
                self.order = Some(order.as_slice());
            }
            Event::BinCreated { bin_index } => {
                while self.bins.len() <= *bin_index {
                    let idx = self.bins.len();
                    self.bins.push(Bin::new(idx));
                }
            }
            Event::BinInspected {
                item_original_index,
                ..
            } => {
                self.begin_item(*item_original_index);
            }
            Event::BestCandidateUpdated {
                item_original_index,
                bin_index,
            } => {
                self.begin_item(*item_original_index);
                self.best_candidate = Some(*bin_index);
            }
            Event::ItemPlaced {
                item_original_index,
                bin_index,
                resulting_fill_level,
            } => {
                self.begin_item(*item_original_index);
                if let Some(bin) = self.bins.get_mut(*bin_index) {
                    bin.fill_level = *resulting_fill_level;
                }
                self.placed += 1;
                self.current_item = None;
                self.best_candidate = None;
            }
            Event::SimulationComplete { .. } => {
                self.current_item = None;
                self.best_candidate = None;
            }
        }
        Some(event)
    }

    fn begin_item(&mut self, item: usize) {
        if self.current_item != Some(item) {
            self.current_item = Some(item);
            self.best_candidate = None;
        }
    }

    /// Bins as of the last applied event.
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Item being searched for, between its first event and its `ItemPlaced`.
    pub fn current_item(&self) -> Option<usize> {
        self.current_item
    }

    /// Running Best-Fit target for the current item.
    pub fn best_candidate(&self) -> Option<usize> {
        self.best_candidate
    }

    /// Processing order announced by `SortApplied`, if any was seen.
    pub fn order(&self) -> Option<&'a [usize]> {
        self.order
    }

    /// Number of items placed so far.
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Number of events applied so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    /// Applies every remaining event and returns the final bins.
    pub fn finish(mut self) -> Vec<Bin> {
        while self.step().is_some() {}
        self.bins
    }
}

impl<'a> Iterator for Replay<'a> {
    type Item = &'a Event;
    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}
