use std::sync::atomic::AtomicBool;

use binpack_sim_core::prelude::*;

#[test]
fn unset_flag_matches_plain_run() {
    let input = validate(&[0.5, 0.7, 0.2, 0.4, 0.1], "BFD").unwrap();
    let stop = AtomicBool::new(false);
    let outcome = run_cancellable(&input, &stop);
    assert!(!outcome.is_cancelled());
    assert_eq!(outcome.into_trace(), run(&input));
}

#[test]
fn preset_flag_yields_empty_trace() {
    let input = validate(&[0.5, 0.7, 0.2], "FFD").unwrap();
    let stop = AtomicBool::new(true);
    let outcome = run_cancellable(&input, &stop);
    assert!(outcome.is_cancelled());
    assert!(outcome.trace().is_empty());
    assert!(!outcome.trace().is_complete());
    assert_eq!(outcome.trace().total_bins_used(), None);
}

/// Every prefix that ends right after an item boundary is a valid cancellation point.
#[test]
fn cancelled_prefixes_end_at_item_boundaries() {
    let input = validate(&[0.6, 0.3, 0.5, 0.2, 0.9, 0.1], "BF").unwrap();
    let full = run(&input);
    for (i, e) in full.events().iter().enumerate() {
        if let Event::ItemPlaced { .. } = e {
            let prefix = &full.events()[..=i];
            // the boundary is followed by either the next item's events or the end
            let next = full.events().get(i + 1);
            assert!(matches!(
                next,
                Some(Event::BinCreated { .. })
                    | Some(Event::BinInspected { .. })
                    | Some(Event::SimulationComplete { .. })
            ));
            assert!(matches!(prefix.last(), Some(Event::ItemPlaced { .. })));
        }
    }
}

/// A flag flipped from another thread stops the run at some item boundary;
/// whatever was emitted is an exact prefix of the uninterrupted trace.
#[test]
fn concurrent_cancel_yields_prefix_of_full_trace() {
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let sizes: Vec<f64> = (0..3000).map(|_| rng.gen_range(0.15..=0.7)).collect();
    let input = SimulationInput::new(&sizes, Algorithm::FirstFitDecreasing).unwrap();
    let full = run(&input);

    let stop = Arc::new(AtomicBool::new(false));
    let setter = {
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(1));
            stop.store(true, Ordering::Relaxed);
        })
    };
    let outcome = run_cancellable(&input, &stop);
    setter.join().unwrap();

    match outcome {
        RunOutcome::Completed(trace) => assert_eq!(trace, full),
        RunOutcome::Cancelled(trace) => {
            assert!(!trace.is_complete());
            assert_eq!(trace.events(), &full.events()[..trace.len()]);
            assert!(matches!(
                trace.events().last(),
                None | Some(Event::SortApplied { .. }) | Some(Event::ItemPlaced { .. })
            ));
        }
    }
}
