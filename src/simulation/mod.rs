pub mod composer;
pub mod economy;
pub mod solver;
pub mod timing;

use rand::Rng;
use tracing::{debug, warn};

use crate::catalog::EnemyCatalog;
use crate::config::params::BalanceParams;
use crate::simulation::composer::WaveComposer;
use crate::simulation::economy::{balance_ratio, bounty_rate, EconomyState, WaveResult};
use crate::simulation::timing::WaveTimingModel;

/// Output of a full horizon projection.
#[derive(Debug)]
pub struct ProjectionOutcome {
    /// One result per completed wave, in wave order.
    pub results: Vec<WaveResult>,
    /// Wave index at which the horizon stopped early because the composer
    /// produced no spawnable wave, if that happened. Results up to that
    /// wave remain valid.
    pub terminated_at: Option<u32>,
}

impl ProjectionOutcome {
    pub fn completed(&self) -> bool {
        self.terminated_at.is_none()
    }
}

/// Run the wave horizon: for each wave compose enemies toward the target
/// difficulty, time the coordinated spawn schedule, and record the
/// economic projection. Bounty enters the economy only after the wave's
/// own metrics are recorded, so `cumulative_assets` always reflects prior
/// waves only.
pub fn project_horizon(
    catalog: &EnemyCatalog,
    params: &BalanceParams,
    rng: &mut impl Rng,
) -> ProjectionOutcome {
    let composer = WaveComposer::new(catalog, &params.tuning);
    let timing = WaveTimingModel::new(params.path_length, params.delay_between_enemies_ms);
    let mut economy = EconomyState::new(params.starting_money, params.alpha);
    let mut results = Vec::with_capacity(params.max_wave as usize);

    for wave in 1..=params.max_wave {
        let target = params.wave_difficulty(wave);
        let composition = composer.compose(target, rng);

        // An empty composition for a positive target past wave 1 is a
        // composer failure, not an intentional zero-difficulty wave.
        if composition.is_empty() && wave > 1 && target > 0.0 {
            warn!(
                wave,
                target_difficulty = target,
                completed = results.len(),
                "No spawnable wave; terminating horizon early"
            );
            return ProjectionOutcome {
                results,
                terminated_at: Some(wave),
            };
        }

        let duration_ms = timing.duration_ms(&composition);
        let total_bounty = composition.total_bounty();
        let cumulative_assets = economy.cumulative_assets();
        let earning_rate = economy.earning_rate();
        let (ratio, ratio_case) = balance_ratio(
            total_bounty,
            duration_ms,
            economy.alpha,
            cumulative_assets,
            earning_rate,
        );

        debug!(
            wave,
            target_difficulty = target,
            members = composition.len(),
            total_cost = composition.total_cost(),
            total_bounty,
            duration_ms,
            "Wave projected"
        );

        results.push(WaveResult {
            wave,
            total_bounty,
            duration_ms,
            cumulative_assets,
            earning_rate,
            bounty_rate: bounty_rate(total_bounty, duration_ms),
            ratio,
            ratio_case,
        });

        economy.record_wave_bounty(total_bounty);
    }

    ProjectionOutcome {
        results,
        terminated_at: None,
    }
}
