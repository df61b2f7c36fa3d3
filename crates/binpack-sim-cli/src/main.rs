use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use binpack_sim_core::{
    Algorithm, RunConfig, SimulationInput, compare, run, run_batch, to_json, to_json_lines,
    validate,
};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info};

mod input;
mod output;

use input::{ItemSource, RandomSpec, Settings, YamlConfig};

#[derive(Parser, Debug)]
#[command(
    name = "binpack-sim",
    about = "Step-by-step simulator for greedy bin-packing heuristics",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one heuristic and emit its event trace
    Run(RunArgs),
    /// Run all four heuristics on the same items and compare bin counts
    Compare(CompareArgs),
    /// Average bin counts and timings over many random instances
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct InputArgs {
    /// Comma separated item sizes in (0, 1], e.g. 0.5,0.4,0.6
    #[arg(
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        conflicts_with = "random",
        help_heading = "Input"
    )]
    items: Option<Vec<f64>>,
    /// Generate this many random items instead (1..=1000)
    #[arg(long, help_heading = "Input")]
    random: Option<usize>,
    /// Seed for --random
    #[arg(long, default_value_t = 42, help_heading = "Input")]
    seed: u64,
    /// Smallest random size
    #[arg(long, default_value_t = 0.15, help_heading = "Input")]
    min: f64,
    /// Largest random size
    #[arg(long, default_value_t = 0.7, help_heading = "Input")]
    max: f64,
    /// Decimals kept in random sizes
    #[arg(long, default_value_t = 2, help_heading = "Input")]
    decimals: u32,
    /// YAML config file path (overrides item and algorithm options)
    #[arg(long, help_heading = "Input")]
    config: Option<PathBuf>,
}

impl InputArgs {
    fn source(&self) -> ItemSource {
        if let Some(items) = &self.items {
            ItemSource::Manual {
                items: items.clone(),
            }
        } else if let Some(count) = self.random {
            ItemSource::Random(RandomSpec {
                count,
                seed: self.seed,
                min: self.min,
                max: self.max,
                decimals: self.decimals,
            })
        } else {
            ItemSource::Demo
        }
    }

    fn settings(&self, algorithm: &str, parallel: bool) -> anyhow::Result<Settings> {
        let settings = Settings {
            algorithm: algorithm.to_string(),
            source: self.source(),
            parallel,
        };
        match &self.config {
            Some(path) => YamlConfig::load(path)?.apply(settings),
            None => Ok(settings),
        }
    }
}

#[derive(Parser, Debug, Clone)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Algorithm code: FF | BF | FFD | BFD
    #[arg(short, long, default_value = "FF", help_heading = "Algorithm")]
    algorithm: String,

    // Export
    /// Output format: json | jsonl | summary | template
    #[arg(long, default_value = "summary", value_parser = ["json", "jsonl", "summary", "template"], help_heading = "Export")]
    format: String,
    /// Built-in template: storyboard | csv
    #[arg(long, default_value = "storyboard", help_heading = "Export")]
    preset: String,
    /// External template file (handlebars), used when --format template
    #[arg(long, help_heading = "Export")]
    template: Option<PathBuf>,
    /// Write the rendered output to this file instead of stdout
    #[arg(short, long, help_heading = "Export")]
    out: Option<PathBuf>,
    /// Export run statistics as JSON to this path
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: simulate and print to stdout but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct CompareArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Print the comparison as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Run the heuristics in parallel (requires feature "parallel")
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Number of random instances
    #[arg(long, default_value_t = 100)]
    trials: usize,
    /// Items per instance
    #[arg(long, default_value_t = 100)]
    count: usize,
    /// Seed of the first instance; instance i uses seed + i
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Smallest random size
    #[arg(long, default_value_t = 0.15)]
    min: f64,
    /// Largest random size
    #[arg(long, default_value_t = 0.7)]
    max: f64,
    /// Evaluate instances in parallel (requires feature "parallel")
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Run(args) => run_single(args),
        Commands::Compare(args) => run_compare(args),
        Commands::Bench(b) => run_bench(b, cli.progress && !cli.quiet),
    }
}

fn load_input(settings: &Settings) -> anyhow::Result<SimulationInput> {
    let sizes = settings.source.sizes()?;
    debug!(count = sizes.len(), source = ?settings.source, "item sizes resolved");
    let input = validate(&sizes, &settings.algorithm).context("invalid simulation input")?;
    Ok(input)
}

fn run_single(cli: &RunArgs) -> anyhow::Result<()> {
    let settings = cli.input.settings(&cli.algorithm, false)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&settings)?),
            _ => println!("{}", serde_json::to_string_pretty(&settings)?),
        }
        return Ok(());
    }

    let input = load_input(&settings)?;
    let start = Instant::now();
    let trace = run(&input);
    info!(
        algorithm = %input.algorithm(),
        items = input.len(),
        events = trace.len(),
        bins = trace.total_bins_used().unwrap_or(0),
        time = %fmt_dur(start.elapsed()),
        "simulation finished"
    );

    let rendered = match cli.format.as_str() {
        "json" => serde_json::to_string_pretty(&to_json(&input, &trace))?,
        "jsonl" => to_json_lines(&trace)?,
        "summary" => output::render_summary(&input, &trace),
        "template" => {
            let tpl_owned_from_file: Option<String> = match &cli.template {
                Some(path) => Some(
                    fs::read_to_string(path)
                        .with_context(|| format!("read template {}", path.display()))?,
                ),
                None => None,
            };
            let tpl_ref = match &tpl_owned_from_file {
                Some(s) => s.as_str(),
                None => output::builtin_template(&cli.preset)?,
            };
            output::render_template(&input, &trace, tpl_ref)?
        }
        other => anyhow::bail!("unknown output format: {}", other),
    };

    match &cli.out {
        Some(out_path) if !cli.dry_run => {
            fs::write(out_path, &rendered)
                .with_context(|| format!("write {}", out_path.display()))?;
            info!(?out_path, format = %cli.format, "trace written");
        }
        _ => println!("{}", rendered.trim_end()),
    }

    if let Some(stats_path) = &cli.export_stats {
        let stats = trace.stats();
        if !cli.dry_run {
            let value = serde_json::json!({
                "algorithm": input.algorithm(),
                "stats": stats,
                "excess_bins": stats.excess_bins(),
                "waste_percentage": stats.waste_percentage(),
            });
            fs::write(stats_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", stats.summary());
        }
    }
    Ok(())
}

fn run_compare(cli: &CompareArgs) -> anyhow::Result<()> {
    let settings = cli.input.settings(Algorithm::FirstFit.code(), cli.parallel)?;
    let sizes = settings.source.sizes()?;
    let cfg = RunConfig::builder().parallel(settings.parallel).build();
    let comparison = compare(&sizes, &cfg).context("invalid simulation input")?;

    if cli.json {
        let value = serde_json::json!({
            "items": sizes,
            "best": comparison.best().map(|(a, _)| a),
            "runs": comparison
                .runs
                .iter()
                .map(|(a, t)| serde_json::json!({"algorithm": a, "stats": t.stats()}))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let best = comparison.best().map(|(a, _)| a);
    let lb = binpack_sim_core::lower_bound(sizes.iter().sum());
    println!("items={} lower_bound={}", sizes.len(), lb);
    println!(
        "{:<5} {:<22} {:>5} {:>9} {:>11}",
        "code", "name", "bins", "avg_fill", "inspections"
    );
    for (algo, trace) in &comparison.runs {
        let stats = trace.stats();
        let mark = if Some(*algo) == best { " *" } else { "" };
        println!(
            "{:<5} {:<22} {:>5} {:>8.2}% {:>11}{}",
            algo.code(),
            algo.name(),
            stats.total_bins,
            stats.average_fill * 100.0,
            stats.inspections,
            mark
        );
    }
    Ok(())
}

#[derive(Default)]
struct BenchRow {
    bins: usize,
    excess: usize,
    elapsed: Duration,
}

fn run_bench(b: &BenchArgs, show_progress: bool) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    anyhow::ensure!(b.trials > 0, "trials must be > 0");

    let bar = if show_progress {
        let pb = ProgressBar::new(b.trials as u64);
        pb.set_style(ProgressStyle::with_template(
            "{spinner:.green} generating {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(pb)
    } else {
        None
    };
    let mut instances: Vec<Vec<f64>> = Vec::with_capacity(b.trials);
    for i in 0..b.trials {
        let spec = RandomSpec {
            count: b.count,
            seed: b.seed.wrapping_add(i as u64),
            min: b.min,
            max: b.max,
            ..RandomSpec::default()
        };
        spec.check()?;
        instances.push(spec.generate());
        if let Some(pb) = &bar {
            pb.inc(1);
        }
    }
    if let Some(pb) = &bar {
        pb.finish_and_clear();
    }

    let mut rows: Vec<(Algorithm, BenchRow)> = Vec::with_capacity(Algorithm::ALL.len());
    for algo in Algorithm::ALL {
        let inputs = instances
            .iter()
            .map(|sizes| SimulationInput::new(sizes, algo))
            .collect::<binpack_sim_core::Result<Vec<_>>>()?;
        let start = Instant::now();
        let traces = run_batch(&inputs, b.parallel);
        let elapsed = start.elapsed();
        let mut row = BenchRow {
            elapsed,
            ..Default::default()
        };
        for t in &traces {
            let stats = t.stats();
            row.bins += stats.total_bins;
            row.excess += stats.excess_bins();
        }
        debug!(algorithm = %algo, bins = row.bins, "bench algorithm done");
        rows.push((algo, row));
    }

    let n = b.trials as f64;
    println!("trials={} items={} range={}..={}", b.trials, b.count, b.min, b.max);
    for (algo, row) in &rows {
        println!(
            "{:<4} mean_bins={:.2} mean_excess={:.2} time={}",
            algo.code(),
            row.bins as f64 / n,
            row.excess as f64 / n,
            fmt_dur(row.elapsed)
        );
    }
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_item_list() {
        let cli = Cli::try_parse_from([
            "binpack-sim",
            "run",
            "--items",
            "0.5,0.4,0.6",
            "--algorithm",
            "BFD",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.algorithm, "BFD");
                assert_eq!(args.input.items, Some(vec![0.5, 0.4, 0.6]));
                let settings = args.input.settings(&args.algorithm, false).unwrap();
                let input = load_input(&settings).unwrap();
                assert_eq!(input.len(), 3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn negative_item_is_parsed_then_rejected() {
        let cli = Cli::try_parse_from(["binpack-sim", "run", "--items", "0.5,-0.2"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let settings = args.input.settings(&args.algorithm, false).unwrap();
        assert!(load_input(&settings).is_err());
    }

    #[test]
    fn defaults_fall_back_to_demo_items() {
        let cli = Cli::try_parse_from(["binpack-sim", "compare"]).unwrap();
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.input.source(), ItemSource::Demo);
    }

    #[test]
    fn items_and_random_conflict() {
        let res = Cli::try_parse_from(["binpack-sim", "run", "--items", "0.5", "--random", "5"]);
        assert!(res.is_err());
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(fmt_dur(Duration::from_millis(12)), "12.0ms");
        assert_eq!(fmt_dur(Duration::from_micros(250)), "250us");
    }
}
