//! Minimal text "renderer": replays a trace and prints the bins after every placement.
//!
//! cargo run -p binpack-sim-core --example ascii_replay -- BFD 0.5 0.4 0.6 0.2 0.8 0.3

use binpack_sim_core::prelude::*;

const BAR_WIDTH: usize = 20;

fn bar(fill: f64) -> String {
    let filled = ((fill / BIN_CAPACITY) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let code = args.next().unwrap_or_else(|| "FF".to_string());
    let sizes: Vec<f64> = args.map(|s| s.parse()).collect::<Result<_, _>>()?;
    let sizes = if sizes.is_empty() {
        vec![0.5, 0.4, 0.6, 0.2, 0.8, 0.3]
    } else {
        sizes
    };

    let input = validate(&sizes, &code)?;
    let trace = run(&input);
    println!("Algorithm: {} ({})", input.algorithm().name(), input.algorithm());

    let mut replay = Replay::new(&trace);
    while let Some(event) = replay.step() {
        match event {
            Event::SortApplied { order } => println!("sorted: {order:?}"),
            Event::BinInspected {
                item_original_index,
                bin_index,
                accepted,
            } => println!(
                "  item {item_original_index} -> B{} {}",
                bin_index + 1,
                if *accepted { "ok" } else { "full" }
            ),
            Event::ItemPlaced {
                item_original_index,
                bin_index,
                ..
            } => {
                println!(
                    "item {item_original_index} ({:.2}) dropped into B{}",
                    sizes[*item_original_index],
                    bin_index + 1
                );
                for bin in replay.bins() {
                    println!("    B{:<3} {} {:.2}", bin.index + 1, bar(bin.fill_level), bin.fill_level);
                }
            }
            Event::SimulationComplete { total_bins_used } => {
                println!("Total Bins Used: {total_bins_used}");
            }
            _ => {}
        }
    }
    Ok(())
}
