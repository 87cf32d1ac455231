use std::time::Instant;

use serde::Serialize;

use wcst::env_config;
use wcst::session::SessionCounters;
use wcst::simulation::{simulate_batch, ParticipantKind};
use wcst::types::{ExperimentConfig, RuleSchedule};

const USAGE: &str = "Usage: wcst-simulate [--sessions N] [--seed S] [--participant NAME] \
                     [--stickiness F] [--schedule NAME] [--json]";

/// One output row per simulated session.
#[derive(Serialize)]
struct SessionRow {
    session: usize,
    seed: u64,
    #[serde(flatten)]
    counters: SessionCounters,
    exhausted_buffer: bool,
}

struct Args {
    num_sessions: usize,
    seed: u64,
    participant: ParticipantKind,
    stickiness: Option<f64>,
    schedule: Option<RuleSchedule>,
    json: bool,
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T {
    match value.and_then(|v| v.parse().ok()) {
        Some(v) => v,
        None => {
            let shown = value.map(String::as_str).unwrap_or("<missing>");
            eprintln!("Invalid {} value: {}", flag, shown);
            std::process::exit(1);
        }
    }
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut num_sessions = 20usize;
    let mut seed = 42u64;
    let mut participant = ParticipantKind::HypothesisTester { stickiness: 0.0 };
    let mut stickiness: Option<f64> = None;
    let mut schedule: Option<RuleSchedule> = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sessions" => {
                i += 1;
                num_sessions = parse_value("--sessions", args.get(i));
            }
            "--seed" => {
                i += 1;
                seed = parse_value("--seed", args.get(i));
            }
            "--participant" => {
                i += 1;
                let name = args.get(i).map(String::as_str).unwrap_or("");
                participant = name.parse().unwrap_or_else(|e: String| {
                    eprintln!("{}", e);
                    std::process::exit(1);
                });
            }
            "--stickiness" => {
                i += 1;
                stickiness = Some(parse_value("--stickiness", args.get(i)));
            }
            "--schedule" => {
                i += 1;
                schedule = Some(parse_value("--schedule", args.get(i)));
            }
            "--json" => {
                json = true;
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                println!();
                println!("Options:");
                println!("  --sessions N        Number of sessions to simulate (default: 20)");
                println!("  --seed S            RNG seed (default: 42)");
                println!("  --participant NAME  oracle, random, hypothesis (default: hypothesis)");
                println!("  --stickiness F      Hypothesis perseveration probability in [0,1]");
                println!("  --schedule NAME     standard or reduced (default: WCST_SCHEDULE)");
                println!("  --json              Print per-session counters as JSON");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{}", USAGE);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if let Some(s) = stickiness {
        if !(0.0..=1.0).contains(&s) {
            eprintln!("Error: --stickiness must be within [0, 1]");
            std::process::exit(1);
        }
        match participant {
            ParticipantKind::HypothesisTester { .. } => {
                participant = ParticipantKind::HypothesisTester { stickiness: s };
            }
            _ => {
                eprintln!("Error: --stickiness only applies to --participant hypothesis");
                std::process::exit(1);
            }
        }
    }

    Args {
        num_sessions,
        seed,
        participant,
        stickiness,
        schedule,
        json,
    }
}

fn main() {
    let args = parse_args();

    let mut config: ExperimentConfig = match env_config::experiment_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(schedule) = args.schedule {
        config.schedule = schedule;
    }

    let threads = env_config::init_rayon_threads();
    if !args.json {
        println!("Rayon threads: {}", threads);
        println!(
            "Simulating {} sessions (participant={}, stickiness={}, schedule={}, seed={})",
            args.num_sessions,
            args.participant.name(),
            args.stickiness.unwrap_or(0.0),
            config.schedule.as_str(),
            args.seed
        );
    }

    let start = Instant::now();
    let summaries = match simulate_batch(&config, args.participant, args.num_sessions, args.seed) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    let rows: Vec<SessionRow> = summaries
        .iter()
        .enumerate()
        .map(|(i, s)| SessionRow {
            session: i,
            seed: args.seed.wrapping_add(i as u64),
            counters: s.counters,
            exhausted_buffer: s.exhausted_buffer,
        })
        .collect();

    if args.json {
        match serde_json::to_string_pretty(&rows) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize session counters: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Done in {:.2?}", elapsed);
    println!();
    println!(
        "{:>7} {:>20} {:>7} {:>6} {:>6} {:>6} {:>6} {:>9}",
        "session", "seed", "counted", "score", "found", "pers", "nonp", "exhausted"
    );
    for row in &rows {
        let c = &row.counters;
        println!(
            "{:>7} {:>20} {:>7} {:>6} {:>6} {:>6} {:>6} {:>9}",
            row.session,
            row.seed,
            c.counted_trials,
            c.score,
            c.rules_found,
            c.perseverative_errors,
            c.non_perseverative_errors,
            if row.exhausted_buffer { "yes" } else { "no" }
        );
    }
}
