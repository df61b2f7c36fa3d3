//! Trace rendering for the CLI: plain-text summary and handlebars templates.

use binpack_sim_core::{BIN_CAPACITY, Event, SimulationInput, Trace};
use handlebars::Handlebars;
use serde::Serialize;

const BAR_WIDTH: usize = 20;

pub fn builtin_template(name: &str) -> anyhow::Result<&'static str> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "storyboard" => include_str!("templates/storyboard.hbs"),
        "csv" => include_str!("templates/csv.hbs"),
        other => anyhow::bail!("unknown built-in template: {}", other),
    })
}

fn fill_bar(fill: f64) -> String {
    let filled = ((fill / BIN_CAPACITY) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Item indices per bin, in placement order.
fn contents(trace: &Trace) -> Vec<Vec<usize>> {
    let mut bins: Vec<Vec<usize>> = vec![Vec::new(); trace.final_fill_levels().len()];
    for p in trace.placements() {
        if let Some(b) = bins.get_mut(p.bin_index) {
            b.push(p.item_original_index);
        }
    }
    bins
}

/// Human-readable end state of a run.
pub fn render_summary(input: &SimulationInput, trace: &Trace) -> String {
    let mut out = String::new();
    let algo = input.algorithm();
    out.push_str(&format!("Algorithm: {} ({})\n", algo.name(), algo));
    let sizes: Vec<String> = input
        .items()
        .iter()
        .map(|it| format!("{:.2}", it.size))
        .collect();
    out.push_str(&format!("Items: [{}]\n", sizes.join(", ")));
    if let Some(order) = trace.sort_order() {
        out.push_str(&format!("Processing order: {:?}\n", order));
    }
    let fills = trace.final_fill_levels();
    for (idx, items) in contents(trace).iter().enumerate() {
        let list: Vec<String> = items.iter().map(|i| i.to_string()).collect();
        out.push_str(&format!(
            "B{:<3} {} {:.2}  items: {}\n",
            idx + 1,
            fill_bar(fills[idx]),
            fills[idx],
            list.join(", ")
        ));
    }
    let stats = trace.stats();
    match trace.total_bins_used() {
        Some(n) => out.push_str(&format!(
            "Total Bins Used: {} (lower bound {})\n",
            n, stats.lower_bound
        )),
        None => out.push_str("Simulation incomplete\n"),
    }
    out.push_str(&stats.summary());
    out.push('\n');
    out
}

#[derive(Serialize)]
struct TemplateItem {
    index: usize,
    size: f64,
}

#[derive(Serialize, Default)]
struct TemplateStep {
    seq: usize,
    kind: &'static str,
    item: Option<usize>,
    bin: Option<usize>,
    /// 1-based bin label (B1, B2, ...).
    bin_label: Option<usize>,
    accepted: Option<bool>,
    fill: Option<f64>,
    order: Vec<usize>,
    total_bins: Option<usize>,
    is_sort: bool,
    is_created: bool,
    is_inspected: bool,
    is_candidate: bool,
    is_placed: bool,
    is_complete: bool,
}

#[derive(Serialize)]
struct TemplateBin {
    index: usize,
    label: usize,
    fill: f64,
    items: Vec<usize>,
}

#[derive(Serialize)]
struct TemplateContext {
    meta: serde_json::Value,
    items: Vec<TemplateItem>,
    steps: Vec<TemplateStep>,
    bins: Vec<TemplateBin>,
}

fn build_template_context(input: &SimulationInput, trace: &Trace) -> TemplateContext {
    let items = input
        .items()
        .iter()
        .map(|it| TemplateItem {
            index: it.index,
            size: it.size,
        })
        .collect();

    let steps = trace
        .iter()
        .enumerate()
        .map(|(seq, e)| {
            let mut step = TemplateStep {
                seq,
                kind: e.kind(),
                item: e.item(),
                bin: e.bin(),
                bin_label: e.bin().map(|b| b + 1),
                ..Default::default()
            };
            match e {
                Event::SortApplied { order } => {
                    step.is_sort = true;
                    step.order = order.clone();
                }
                Event::BinCreated { .. } => step.is_created = true,
                Event::BinInspected { accepted, .. } => {
                    step.is_inspected = true;
                    step.accepted = Some(*accepted);
                }
                Event::BestCandidateUpdated { .. } => step.is_candidate = true,
                Event::ItemPlaced {
                    resulting_fill_level,
                    ..
                } => {
                    step.is_placed = true;
                    step.fill = Some(*resulting_fill_level);
                }
                Event::SimulationComplete { total_bins_used } => {
                    step.is_complete = true;
                    step.total_bins = Some(*total_bins_used);
                }
            }
            step
        })
        .collect();

    let fills = trace.final_fill_levels();
    let bins = contents(trace)
        .into_iter()
        .enumerate()
        .map(|(index, items)| TemplateBin {
            index,
            label: index + 1,
            fill: fills[index],
            items,
        })
        .collect();

    let algo = input.algorithm();
    let meta = serde_json::json!({
        "app": "binpack-sim",
        "version": env!("CARGO_PKG_VERSION"),
        "algorithm": algo.code(),
        "name": algo.name(),
        "total_bins": trace.total_bins_used(),
        "complete": trace.is_complete(),
    });
    TemplateContext {
        meta,
        items,
        steps,
        bins,
    }
}

/// Renders `template` (handlebars source) against the run.
pub fn render_template(
    input: &SimulationInput,
    trace: &Trace,
    template: &str,
) -> anyhow::Result<String> {
    let ctx = build_template_context(input, trace);
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_escape_fn(handlebars::no_escape);
    reg.register_template_string("tpl", template)?;
    Ok(reg.render("tpl", &ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use binpack_sim_core::{run, validate};

    #[test]
    fn summary_lists_every_bin() {
        let input = validate(&[0.5, 0.4, 0.3], "FF").unwrap();
        let trace = run(&input);
        let text = render_summary(&input, &trace);
        assert!(text.contains("Algorithm: First-Fit (FF)"));
        assert!(text.contains("B1"));
        assert!(text.contains("B2"));
        assert!(text.contains("Total Bins Used: 2"));
    }

    #[test]
    fn csv_template_has_row_per_event() {
        let input = validate(&[0.6, 0.3, 0.5, 0.2], "BF").unwrap();
        let trace = run(&input);
        let csv = render_template(&input, &trace, builtin_template("csv").unwrap()).unwrap();
        let rows: Vec<&str> = csv.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(rows[0], "seq,type,item,bin,accepted,fill");
        assert_eq!(rows.len(), trace.len() + 1);
        assert!(rows.iter().any(|r| r.contains("BestCandidateUpdated")));
    }

    #[test]
    fn storyboard_mentions_sort_and_total() {
        let input = validate(&[0.2, 0.5, 0.3], "FFD").unwrap();
        let trace = run(&input);
        let text =
            render_template(&input, &trace, builtin_template("storyboard").unwrap()).unwrap();
        assert!(text.contains("First-Fit Decreasing"));
        assert!(text.contains("sort"));
        assert!(text.contains("total bins: 1"));
    }

    #[test]
    fn unknown_builtin_is_rejected() {
        assert!(builtin_template("unity").is_err());
    }
}
