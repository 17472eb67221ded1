use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use rayon::prelude::*;

use rinkside::classify::ClassifierConfig;
use rinkside::pipeline::AnalyticsEngine;
use rinkside::provider::parse_game_json;
use rinkside::report::{build_report, render_text};
use rinkside::xg::DefaultXgModel;

fn main() -> ExitCode {
    env_logger::init();

    let paths: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("usage: rinkside <game.json> [game.json ...]");
        eprintln!("set RINKSIDE_JSON=1 for structured output");
        return ExitCode::from(2);
    }

    let mut config = ClassifierConfig::default();
    if let Ok(raw) = env::var("CYCLE_MIN_SECS")
        && let Ok(secs) = raw.trim().parse::<f64>()
    {
        config.cycle_min_secs = secs.max(0.0);
    }
    let json_output = env::var("RINKSIDE_JSON").is_ok_and(|v| v != "0");

    let engine = AnalyticsEngine::new(Box::new(DefaultXgModel), config);

    // One task per game; games are independent, so a failure stays per-game
    // and is reported with its reason, never retried here.
    let results: Vec<(PathBuf, anyhow::Result<String>)> = paths
        .par_iter()
        .map(|path| (path.clone(), run_one(&engine, path, json_output)))
        .collect();

    let mut failed = 0usize;
    for (path, result) in results {
        match result {
            Ok(text) => println!("{text}"),
            Err(err) => {
                failed += 1;
                eprintln!("{}: failed: {err:#}", path.display());
            }
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_one(engine: &AnalyticsEngine, path: &PathBuf, json_output: bool) -> anyhow::Result<String> {
    let raw = std::fs::read_to_string(path)?;
    let input = parse_game_json(&raw)?;
    let analytics = engine.analyze_game(&input)?;
    let report = build_report(&analytics);
    if json_output {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(render_text(&report))
    }
}
