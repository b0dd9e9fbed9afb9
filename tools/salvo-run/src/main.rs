//! salvo-run: headless scenario runner for the salvo guidance engine.
//!
//! Usage:
//!   salvo-run coordinated --ticks 900 --seed 7
//!   salvo-run swarm --config tuning.json --pipelined
//!   salvo-run list

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use log::{debug, info, warn};
use serde::Serialize;

use salvo_core::config::SalvoConfig;
use salvo_core::constants::TICK_RATE;
use salvo_core::enums::{PlanningMode, ScenarioId};
use salvo_core::events::SalvoEvent;
use salvo_core::state::SalvoSnapshot;
use salvo_sim::{SimConfig, SimulationEngine};

const DEFAULT_TICKS: u64 = 30 * TICK_RATE as u64;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "list" => {
            for id in ScenarioId::ALL {
                println!("{}", id.name());
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        name => match ScenarioId::from_name(name) {
            Some(id) => cmd_run(id, &args[2..]),
            None => {
                eprintln!("Unknown scenario: {name}");
                print_usage();
                process::exit(1);
            }
        },
    }
}

fn print_usage() {
    eprintln!(
        "salvo-run: run a built-in engagement headless and print a JSON summary\n\
         \n\
         Usage: salvo-run <scenario> [options]\n\
                salvo-run list\n\
         \n\
           --seed <N>        RNG seed (default: 42)\n\
           --ticks <N>       Ticks to run at 30 Hz (default: 900)\n\
           --config <path>   JSON tuning file (default: built-in tuning)\n\
           --pipelined       Merge plans on a later tick instead of in-tick\n\
         \n\
         Scenarios: direct, offset-pair, coordinated, flip-burn, swarm\n\
         \n\
         Logging follows RUST_LOG (default: info).\n"
    );
}

fn parse_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    let i = args.iter().position(|a| a == flag)?;
    match args.get(i + 1).map(|v| v.parse::<T>()) {
        Some(Ok(value)) => Some(value),
        _ => {
            eprintln!("Error: {flag} needs a valid value");
            process::exit(1);
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct EventTally {
    waypoints_updated: u64,
    waypoints_reached: u64,
    plans_degraded: u64,
    results_dropped: u64,
    munitions_rejected: u64,
    targets_lost: u64,
    period_changes: u64,
}

impl EventTally {
    fn add(&mut self, events: &[SalvoEvent]) {
        for event in events {
            match event {
                SalvoEvent::WaypointsUpdated { .. } => self.waypoints_updated += 1,
                SalvoEvent::WaypointReached { .. } => self.waypoints_reached += 1,
                SalvoEvent::PlanDegraded { .. } => self.plans_degraded += 1,
                SalvoEvent::ResultDropped { .. } => self.results_dropped += 1,
                SalvoEvent::MunitionRejected { .. } => self.munitions_rejected += 1,
                SalvoEvent::TargetLost { .. } => self.targets_lost += 1,
                SalvoEvent::PeriodChanged { .. } => self.period_changes += 1,
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct MunitionSummary {
    id: u64,
    generation: u64,
    current_index: usize,
    remaining_waypoints: usize,
    waypoints_reached: u32,
    range_to_target: Option<f64>,
    speed: f64,
    smoothness: f64,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    scenario: &'static str,
    seed: u64,
    ticks: u64,
    sim_seconds: f64,
    wall_seconds: f64,
    planning_mode: PlanningMode,
    batches_dispatched: u64,
    final_period_secs: f64,
    min_time_to_impact: Option<f64>,
    events: EventTally,
    munitions: Vec<MunitionSummary>,
}

fn summarize(snapshot: &SalvoSnapshot) -> Vec<MunitionSummary> {
    snapshot
        .munitions
        .iter()
        .map(|m| {
            let target = m
                .target
                .and_then(|id| snapshot.targets.iter().find(|t| t.id == id));
            MunitionSummary {
                id: m.id,
                generation: m.generation,
                current_index: m.current_index,
                remaining_waypoints: m.waypoints.len().saturating_sub(m.current_index),
                waypoints_reached: m.metrics.waypoints_reached,
                range_to_target: target.map(|t| m.state.position.distance(t.state.position)),
                speed: m.state.speed(),
                smoothness: m.metrics.smoothness,
            }
        })
        .collect()
}

fn cmd_run(scenario: ScenarioId, args: &[String]) {
    let tuning = match parse_value::<PathBuf>(args, "--config") {
        Some(path) => match SalvoConfig::load(&path) {
            Ok(tuning) => {
                info!("loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                eprintln!("Error loading {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => SalvoConfig::default(),
    };

    let mut config = SimConfig {
        tuning,
        ..SimConfig::default()
    };
    if let Some(seed) = parse_value(args, "--seed") {
        config.seed = seed;
    }
    if args.iter().any(|a| a == "--pipelined") {
        config.tuning.backend.mode = PlanningMode::Pipelined;
    }
    let ticks = parse_value(args, "--ticks").unwrap_or(DEFAULT_TICKS);
    let seed = config.seed;
    let planning_mode = config.tuning.backend.mode;

    let mut engine = match SimulationEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    engine.load_scenario(scenario);

    let started = Instant::now();
    let mut tally = EventTally::default();
    let mut last = None;
    for tick in 0..ticks {
        let snapshot = engine.tick();
        tally.add(&snapshot.events);
        if tick % TICK_RATE as u64 == 0 {
            debug!(
                "t={:.1}s: {} munitions, period {:.2}s, {} batches",
                snapshot.time.elapsed_secs,
                snapshot.munitions.len(),
                snapshot.planning.period_secs,
                snapshot.planning.batches_dispatched
            );
        }
        if snapshot.munitions.is_empty() {
            warn!("no munitions left after {} ticks", tick + 1);
            last = Some(snapshot);
            break;
        }
        last = Some(snapshot);
    }
    let wall_seconds = started.elapsed().as_secs_f64();

    let Some(snapshot) = last else {
        eprintln!("Error: ran zero ticks");
        process::exit(1);
    };
    info!(
        "{}: {} ticks in {:.2}s wall, {} batches",
        scenario.name(),
        snapshot.time.tick,
        wall_seconds,
        snapshot.planning.batches_dispatched
    );

    let summary = RunSummary {
        scenario: scenario.name(),
        seed,
        ticks: snapshot.time.tick,
        sim_seconds: snapshot.time.elapsed_secs,
        wall_seconds,
        planning_mode,
        batches_dispatched: snapshot.planning.batches_dispatched,
        final_period_secs: snapshot.planning.period_secs,
        min_time_to_impact: snapshot.planning.min_time_to_impact,
        events: tally,
        munitions: summarize(&snapshot),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error encoding summary: {e}");
            process::exit(1);
        }
    }
}
