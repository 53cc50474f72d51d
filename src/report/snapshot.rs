use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::catalog::EnemyCatalog;
use crate::config::params::{BalanceParams, ComposerTuning};
use crate::simulation::economy::WaveResult;

/// Exact numeric inputs of one run, recorded for reproducible external
/// analysis and plotting.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSnapshot {
    pub run_id: Uuid,
    /// Enemy table: id with derived cost, bounty and speed.
    pub enemies: Vec<EnemyEntry>,
    pub starting_difficulty: f64,
    pub difficulty_increase_factor: f64,
    pub alpha: f64,
    pub path_length: f64,
    pub delay_between_enemies_ms: f64,
    pub starting_money: f64,
    pub max_wave: u32,
    /// Resolved RNG seed actually used (never 0).
    pub seed: u64,
    pub tuning: ComposerTuning,
    /// Reference time `T_0 = L / min(speed)` in seconds: the slowest
    /// archetype's unobstructed full-path traversal, used externally as a
    /// normalization constant.
    pub reference_time_sec: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyEntry {
    pub id: String,
    pub cost: f64,
    pub bounty: f64,
    pub speed: f64,
}

impl ParameterSnapshot {
    pub fn new(catalog: &EnemyCatalog, params: &BalanceParams, resolved_seed: u64) -> Self {
        let enemies = catalog
            .archetypes()
            .iter()
            .map(|a| EnemyEntry {
                id: a.id.clone(),
                cost: a.cost,
                bounty: a.bounty,
                speed: a.speed,
            })
            .collect();

        ParameterSnapshot {
            run_id: Uuid::new_v4(),
            enemies,
            starting_difficulty: params.starting_difficulty,
            difficulty_increase_factor: params.difficulty_increase_factor,
            alpha: params.alpha,
            path_length: params.path_length,
            delay_between_enemies_ms: params.delay_between_enemies_ms,
            starting_money: params.starting_money,
            max_wave: params.max_wave,
            seed: resolved_seed,
            tuning: params.tuning.clone(),
            reference_time_sec: params.path_length / catalog.min_speed(),
        }
    }
}

/// The serialized artifact of one run: the snapshot plus the per-wave
/// result sequence.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub snapshot: &'a ParameterSnapshot,
    pub results: &'a [WaveResult],
}

/// Metadata about a report file on disk.
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    pub path: PathBuf,
    pub seed: u64,
    pub timestamp: u64,
    pub file_size: u64,
}

/// Errors that can occur while writing or listing run reports.
#[derive(Debug)]
pub enum ReportError {
    Io(io::Error),
    Serialize(String),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "I/O error: {}", e),
            ReportError::Serialize(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<io::Error> for ReportError {
    fn from(e: io::Error) -> Self {
        ReportError::Io(e)
    }
}

/// Build a report filename from the resolved seed and a unix timestamp.
fn report_filename(seed: u64, timestamp: u64) -> String {
    format!("run-seed{}-{}.json", seed, timestamp)
}

/// Parse seed and timestamp from a report filename.
/// Expected format: `run-seed{N}-{timestamp}.json`
fn parse_report_filename(filename: &str) -> Option<(u64, u64)> {
    let stem = filename.strip_suffix(".json")?;
    let rest = stem.strip_prefix("run-seed")?;
    let (seed_str, ts_str) = rest.split_once('-')?;
    let seed = seed_str.parse::<u64>().ok()?;
    let ts = ts_str.parse::<u64>().ok()?;
    Some((seed, ts))
}

fn unix_timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Write a run report to the report directory using atomic write.
///
/// Writes to a temporary file first, then renames to the final path, so a
/// crash mid-write never leaves a truncated report behind.
pub fn write_report(
    snapshot: &ParameterSnapshot,
    results: &[WaveResult],
    report_dir: &Path,
) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(report_dir)?;

    let report = RunReport { snapshot, results };
    let json = serde_json::to_vec_pretty(&report)
        .map_err(|e| ReportError::Serialize(e.to_string()))?;

    let filename = report_filename(snapshot.seed, unix_timestamp_now());
    let final_path = report_dir.join(&filename);
    let tmp_path = report_dir.join(format!("{}.tmp", filename));

    fs::write(&tmp_path, &json)?;
    fs::rename(&tmp_path, &final_path)?;

    Ok(final_path)
}

/// List run reports in a directory, newest first. Files that do not match
/// the report naming scheme are skipped with a warning.
pub fn list_reports(report_dir: &Path) -> Result<Vec<ReportMetadata>, ReportError> {
    if !report_dir.exists() {
        return Ok(Vec::new());
    }

    let mut reports = Vec::new();
    for entry in fs::read_dir(report_dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !filename.ends_with(".json") {
            continue;
        }

        match parse_report_filename(filename) {
            Some((seed, timestamp)) => {
                let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                reports.push(ReportMetadata {
                    path: path.clone(),
                    seed,
                    timestamp,
                    file_size,
                });
            }
            None => {
                warn!(file = %path.display(), "Skipping file with unrecognized report name");
            }
        }
    }

    reports.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(reports)
}
