use binpack_sim_core::prelude::*;

#[test]
fn replay_reaches_final_fill_levels() {
    for code in ["FF", "BF", "FFD", "BFD"] {
        let input = validate(&[0.42, 0.17, 0.66, 0.35, 0.5, 0.29, 0.61], code).unwrap();
        let trace = run(&input);
        let bins = Replay::new(&trace).finish();
        let fills: Vec<f64> = bins.iter().map(|b| b.fill_level).collect();
        assert_eq!(fills, trace.final_fill_levels());
        assert_eq!(Some(bins.len()), trace.total_bins_used());
    }
}

#[test]
fn replay_tracks_current_item_and_best_candidate() {
    let input = validate(&[0.6, 0.3, 0.5, 0.2], "BF").unwrap();
    let trace = run(&input);
    let mut replay = Replay::new(&trace);

    // advance until the last item's best candidate is announced
    let mut saw_candidate = false;
    while let Some(e) = replay.step() {
        if let Event::BestCandidateUpdated {
            item_original_index: 3,
            bin_index,
        } = e
        {
            assert_eq!(replay.current_item(), Some(3));
            assert_eq!(replay.best_candidate(), Some(*bin_index));
            assert_eq!(replay.placed(), 3);
            saw_candidate = true;
        }
        if let Event::ItemPlaced { .. } = e {
            assert_eq!(replay.current_item(), None);
            assert_eq!(replay.best_candidate(), None);
        }
    }
    assert!(saw_candidate);
    assert!(replay.is_finished());
    assert_eq!(replay.position(), trace.len());
}

#[test]
fn replay_exposes_sort_order() {
    let input = validate(&[0.1, 0.9, 0.5], "FFD").unwrap();
    let trace = run(&input);
    let mut replay = Replay::new(&trace);
    assert_eq!(replay.order(), None);
    replay.step();
    assert_eq!(replay.order(), Some(&[1, 2, 0][..]));
    assert!(replay.bins().is_empty());
}

#[test]
fn replay_is_an_iterator_over_events() {
    let input = validate(&[0.3, 0.3], "FF").unwrap();
    let trace = run(&input);
    let collected: Vec<&Event> = Replay::new(&trace).collect();
    assert_eq!(collected.len(), trace.len());
}
