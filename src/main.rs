//! Swap-network simulator entry point — CLI wiring and run orchestration.

use std::path::Path;
use std::process;

use swapnet_sim::config::{BaselineConfig, ScenarioDelta};
use swapnet_sim::io::export::{RunReport, export_report_json, export_timeline_csv};
use swapnet_sim::scenario;
use swapnet_sim::sim::cost::{CostBreakdown, CostDelta, CostParameters};
use swapnet_sim::sim::engine::{SimulationResult, simulate};
use swapnet_sim::sim::kpi::KpiReport;
use swapnet_sim::validate::{ReferenceKpis, ValidationReport};

/// Parsed CLI arguments.
struct CliArgs {
    baseline_path: Option<String>,
    preset: Option<String>,
    scenario_path: Option<String>,
    scenario_preset: Option<String>,
    seed_override: Option<u64>,
    validate_path: Option<String>,
    output: Option<String>,
    timeline_out: Option<String>,
    quiet: bool,
}

fn print_help() {
    eprintln!("swapnet-sim — Battery-swap station network simulator");
    eprintln!();
    eprintln!("Usage: swapnet-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --baseline <path>         Load baseline config from TOML file");
    eprintln!("  --preset <name>           Use a built-in baseline preset (baseline_city)");
    eprintln!("  --scenario <path>         Apply a scenario delta from TOML and compare");
    eprintln!("  --scenario-preset <name>  Apply a built-in delta (rush_hour, heatwave)");
    eprintln!("  --seed <u64>              Override random seed");
    eprintln!("  --validate <path>         Check baseline KPIs against reference TOML");
    eprintln!("  --output <path>           Write full run report as JSON");
    eprintln!("  --timeline-out <path>     Export timeline frames to CSV");
    eprintln!("  --quiet                   Suppress report printing");
    eprintln!("  --help                    Show this help message");
    eprintln!();
    eprintln!("If no --baseline or --preset is given, the baseline_city preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        baseline_path: None,
        preset: None,
        scenario_path: None,
        scenario_preset: None,
        seed_override: None,
        validate_path: None,
        output: None,
        timeline_out: None,
        quiet: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--baseline" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --baseline requires a path argument");
                    process::exit(1);
                }
                cli.baseline_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--scenario-preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario-preset requires a name argument");
                    process::exit(1);
                }
                cli.scenario_preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--validate" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --validate requires a path argument");
                    process::exit(1);
                }
                cli.validate_path = Some(args[i].clone());
            }
            "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --output requires a path argument");
                    process::exit(1);
                }
                cli.output = Some(args[i].clone());
            }
            "--timeline-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --timeline-out requires a path argument");
                    process::exit(1);
                }
                cli.timeline_out = Some(args[i].clone());
            }
            "--quiet" => {
                cli.quiet = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Runs one configuration end to end.
fn run(config: &BaselineConfig) -> (SimulationResult, KpiReport, CostBreakdown) {
    let results = simulate(config);
    let kpis = KpiReport::from_results(&results, config);
    let costs = CostBreakdown::calculate(&results, config, &CostParameters::default());
    (results, kpis, costs)
}

fn main() {
    let cli = parse_args();

    // Load config: --baseline takes priority, then --preset, then default
    let mut baseline = if let Some(ref path) = cli.baseline_path {
        match BaselineConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match BaselineConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        BaselineConfig::baseline_city()
    };

    if let Some(seed) = cli.seed_override {
        baseline.random_seed = seed;
    }

    let errors = baseline.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Optional scenario delta
    let delta = if let Some(ref path) = cli.scenario_path {
        match ScenarioDelta::from_toml_file(Path::new(path)) {
            Ok(d) => Some(d),
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.scenario_preset {
        match ScenarioDelta::from_preset(name) {
            Ok(d) => Some(d),
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        None
    };

    let (baseline_results, baseline_kpis, baseline_costs) = run(&baseline);

    if !cli.quiet {
        println!("{baseline_kpis}");
        println!("{baseline_costs}");
    }

    // Scenario comparison run on a fresh engine/RNG
    let scenario_run = delta.map(|delta| {
        let modified = match scenario::apply(&baseline, &delta) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("error: scenario \"{}\": {e}", delta.name);
                process::exit(1);
            }
        };
        let errors = modified.validate();
        if !errors.is_empty() {
            for e in &errors {
                eprintln!("{e}");
            }
            process::exit(1);
        }
        let (results, kpis, costs) = run(&modified);
        if !cli.quiet {
            println!("Scenario: {}", delta.name);
            println!("{kpis}");
            println!("{costs}");
            println!("{}", CostDelta::between(&baseline_costs, &costs));
        }
        (results, kpis, costs)
    });

    // Validate baseline KPIs against a reference if requested
    if let Some(ref path) = cli.validate_path {
        let reference = match ReferenceKpis::from_toml_file(Path::new(path)) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        };
        let report = ValidationReport::check(&baseline_kpis.city, &reference);
        if !cli.quiet {
            println!("{report}");
        }
        if !report.passed {
            process::exit(1);
        }
    }

    // Exports refer to the scenario run when one was requested
    let (results, kpis, costs) = match &scenario_run {
        Some((results, kpis, costs)) => (results, kpis, costs),
        None => (&baseline_results, &baseline_kpis, &baseline_costs),
    };

    if let Some(ref path) = cli.output {
        let report = RunReport::new(results, kpis, costs);
        if let Err(e) = export_report_json(&report, Path::new(path)) {
            eprintln!("error: failed to write JSON report: {e}");
            process::exit(1);
        }
        eprintln!("Report written to {path}");
    }

    if let Some(ref path) = cli.timeline_out {
        if let Err(e) = export_timeline_csv(&results.timeline_frames, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Timeline written to {path}");
    }
}
