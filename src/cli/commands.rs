use std::path::Path;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::catalog::EnemyCatalog;
use crate::config::enemies::EnemyRoster;
use crate::config::params::BalanceParams;
use crate::report;
use crate::report::ParameterSnapshot;
use crate::simulation;
use crate::simulation::composer::WaveComposer;
use crate::simulation::solver::solve_flat_start_money;
use crate::simulation::timing::{speed_groups, WaveTimingModel};

/// Load and validate both config files and build the usable catalog.
fn load_inputs(
    enemies_path: &str,
    params_path: &str,
) -> Result<(EnemyCatalog, BalanceParams), String> {
    let roster = EnemyRoster::from_file(Path::new(enemies_path))
        .map_err(|e| format!("Error loading enemy roster: {}", e))?;
    let params = BalanceParams::from_file(Path::new(params_path))
        .map_err(|e| format!("Error loading balance config: {}", e))?;
    crate::cli::init_logging(&params.log_level);
    let catalog = EnemyCatalog::from_definitions(&roster.enemies)
        .map_err(|e| format!("Error building catalog: {}", e))?;
    Ok((catalog, params))
}

/// Resolve the refinement seed: 0 means pick one at random. The resolved
/// seed is what goes into the parameter snapshot.
fn resolve_seed(configured: u64) -> u64 {
    if configured == 0 {
        rand::thread_rng().r#gen()
    } else {
        configured
    }
}

/// Run the full wave horizon, print the per-wave table, write the run
/// report, and print the flat-start solver suggestion.
pub fn run(enemies_path: &str, params_path: &str) -> Result<(), String> {
    let (catalog, params) = load_inputs(enemies_path, params_path)?;

    let seed = resolve_seed(params.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let snapshot = ParameterSnapshot::new(&catalog, &params, seed);

    eprintln!(
        "Projecting {} wave(s): W_1 = {}, f = {}, alpha = {}, seed = {}",
        params.max_wave,
        params.starting_difficulty,
        params.difficulty_increase_factor,
        params.alpha,
        seed
    );

    let outcome = simulation::project_horizon(&catalog, &params, &mut rng);

    println!(
        "{:>5} {:>12} {:>12} {:>12} {:>10} {:>12} {:>10}",
        "wave", "bounty", "duration_ms", "assets", "rate", "bounty_rate", "ratio"
    );
    println!("{}", "-".repeat(80));
    for result in &outcome.results {
        println!(
            "{:>5} {:>12.1} {:>12.0} {:>12.1} {:>10.3} {:>12.5} {:>10.3}",
            result.wave,
            result.total_bounty,
            result.duration_ms,
            result.cumulative_assets,
            crate::simulation::economy::clamp_for_display(result.earning_rate),
            result.bounty_rate,
            result.ratio_clamped(),
        );
    }

    if let Some(wave) = outcome.terminated_at {
        println!(
            "\nHorizon terminated early at wave {} ({} result(s) kept)",
            wave,
            outcome.results.len()
        );
    }

    match solve_flat_start_money(&outcome.results) {
        Some(money) => println!("\nFlat-ratio starting money suggestion: {}", money),
        None => println!("\nFlat-ratio starting money: unsolvable for these waves"),
    }

    let report_dir = Path::new(&params.report_directory);
    let path = report::write_report(&snapshot, &outcome.results, report_dir)
        .map_err(|e| format!("Cannot write run report: {}", e))?;
    println!("Run report saved to {}", path.display());

    Ok(())
}

/// Compose and time a single wave for inspection, with a fresh RNG stream.
pub fn compose(enemies_path: &str, params_path: &str, wave: u32) -> Result<(), String> {
    if wave == 0 {
        return Err("wave index must be >= 1".to_string());
    }
    let (catalog, params) = load_inputs(enemies_path, params_path)?;

    let seed = resolve_seed(params.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let target = params.wave_difficulty(wave);
    let composer = WaveComposer::new(&catalog, &params.tuning);
    let composition = composer.compose(target, &mut rng);
    let timing = WaveTimingModel::new(params.path_length, params.delay_between_enemies_ms);
    let duration_ms = timing.duration_ms(&composition);

    println!(
        "Wave {} (target difficulty {:.2}, seed {})",
        wave, target, seed
    );
    if composition.is_empty() {
        println!("  no spawnable enemies");
        return Ok(());
    }

    for (id, count) in composition.member_counts() {
        println!("  {:<16} x{}", id, count);
    }
    println!(
        "  total cost {:.2} ({:+.1}% of target), bounty {:.1}, {} member(s)",
        composition.total_cost(),
        (composition.total_cost() - target) / target * 100.0,
        composition.total_bounty(),
        composition.len()
    );
    for group in speed_groups(&composition) {
        println!(
            "  speed group {:>8.2} u/s: {} member(s)",
            group.speed, group.count
        );
    }
    println!(
        "  duration {:.0} ms{}",
        duration_ms,
        if composition.converged() {
            ""
        } else {
            " (composition did not converge)"
        }
    );

    Ok(())
}

/// List run reports in a directory, newest first.
pub fn list_reports(dir: &str) -> Result<(), String> {
    let report_dir = Path::new(dir);
    let reports =
        report::list_reports(report_dir).map_err(|e| format!("Error listing reports: {}", e))?;

    if reports.is_empty() {
        println!("No run reports found in {}", report_dir.display());
        return Ok(());
    }

    println!("{:<44} {:>20} {:>12}", "File", "Seed", "Size");
    println!("{}", "-".repeat(78));
    for r in &reports {
        let name = r.path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
        let size_kb = r.file_size / 1024;
        println!("{:<44} {:>20} {:>9} KB", name, r.seed, size_kb);
    }
    println!("\n{} report(s) in {}", reports.len(), report_dir.display());

    Ok(())
}
