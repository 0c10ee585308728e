//! tfstats-parse-worker - Parses one match (one or two round logs) into stats.
//!
//! Usage: tfstats-parse-worker <round1.log> [round2.log]
//!
//! Output: `ParsedMatch` JSON on stdout. Logs go to stderr, or to
//! TFSTATS_LOG_PATH when set.

use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tfstats_core::{ParsedMatch, decode_log, load_config_or_default, process_match};
use tfstats_types::StatsConfig;
use tfstats_types::formatting::{format_duration, format_pct, format_signed};
use tracing_subscriber::filter::EnvFilter;

/// Initialize logging, writing to TFSTATS_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("TFSTATS_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config() -> Result<StatsConfig, tfstats_core::ConfigError> {
    let path = std::env::var_os("TFSTATS_CONFIG")
        .map(PathBuf::from)
        .or_else(tfstats_core::default_config_path);
    load_config_or_default(path.as_deref())
}

fn map_file(path: &Path) -> Result<Mmap, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    // The log is only read, and is not expected to change while parsing
    unsafe { Mmap::map(&file).map_err(|e| format!("Failed to mmap {}: {}", path.display(), e)) }
}

fn log_summary(parsed: &ParsedMatch) {
    for (i, round) in parsed.rounds.iter().enumerate() {
        let stats = &round.stats;
        for team in stats.teams.values() {
            tracing::info!(
                round = i + 1,
                team = team.color.as_str(),
                score = team.score,
                frags = team.frags,
                toss = %team.toss_percent.map(format_pct).unwrap_or_default(),
                flag_time = %team.flag_time_secs.map(format_duration).unwrap_or_default(),
                "Team summary"
            );
        }
        tracing::info!(
            round = i + 1,
            parse_name = %stats.parse_name,
            duration = %format_duration(stats.game_time_secs),
            "Round summary"
        );
    }
    if let Some(comparison) = &parsed.comparison {
        tracing::info!(
            score = %format_signed(comparison.offense.score),
            captures = %format_signed(comparison.offense.captures),
            frags = %format_signed(comparison.defense.frags),
            "Round comparison"
        );
    }
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        tracing::error!("Usage: tfstats-parse-worker <round1.log> [round2.log]");
        std::process::exit(1);
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load config");
            std::process::exit(1);
        }
    };

    let mut maps = Vec::new();
    for path in &args[1..] {
        match map_file(Path::new(path)) {
            Ok(mmap) => maps.push(mmap),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read log");
                std::process::exit(1);
            }
        }
    }
    let texts: Vec<Cow<'_, str>> = maps.iter().map(|m| decode_log(m.as_ref())).collect();
    let texts: Vec<&str> = texts.iter().map(|t| t.as_ref()).collect();

    let timer = std::time::Instant::now();
    match process_match(&texts, &config) {
        Ok(parsed) => {
            log_summary(&parsed);
            tracing::debug!(elapsed_ms = timer.elapsed().as_millis() as u64, "Match processed");
            match parsed.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize output");
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Parse error");
            std::process::exit(1);
        }
    }
}
