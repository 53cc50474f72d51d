use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, warn};

use crate::catalog::{EnemyArchetype, EnemyCatalog};
use crate::config::params::ComposerTuning;

/// The enemy multiset chosen for one wave, with exact running totals.
/// Immutable once returned by the composer.
#[derive(Debug, Clone)]
pub struct WaveComposition {
    members: Vec<EnemyArchetype>,
    total_cost: f64,
    total_bounty: f64,
    converged: bool,
}

impl WaveComposition {
    fn empty(converged: bool) -> Self {
        WaveComposition {
            members: Vec::new(),
            total_cost: 0.0,
            total_bounty: 0.0,
            converged,
        }
    }

    pub fn members(&self) -> &[EnemyArchetype] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn total_bounty(&self) -> f64 {
        self.total_bounty
    }

    /// Whether refinement reached the difficulty tolerance before the
    /// attempt budget ran out.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Member counts keyed by archetype id, for display.
    pub fn member_counts(&self) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for member in &self.members {
            *counts.entry(member.id.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Composes a wave whose total difficulty cost approximates a target value.
///
/// Works in three phases: whitelist selection (cap cheap archetypes that
/// would saturate the wave), even-split pre-population, then bounded random
/// add/remove refinement until the relative difference to the target falls
/// within tolerance.
pub struct WaveComposer<'a> {
    catalog: &'a EnemyCatalog,
    tuning: &'a ComposerTuning,
}

impl<'a> WaveComposer<'a> {
    pub fn new(catalog: &'a EnemyCatalog, tuning: &'a ComposerTuning) -> Self {
        WaveComposer { catalog, tuning }
    }

    /// Compose a wave for the given target difficulty.
    ///
    /// A target <= 0 is trivially satisfied by an empty wave. An empty
    /// whitelist (cannot happen with a non-empty catalog, guarded anyway)
    /// yields an empty, non-converged composition the caller must treat as
    /// "no spawnable wave".
    pub fn compose(&self, target: f64, rng: &mut impl Rng) -> WaveComposition {
        if target <= 0.0 {
            return WaveComposition::empty(true);
        }

        let whitelist = self.build_whitelist(target);
        if whitelist.is_empty() {
            warn!(target_difficulty = target, "Whitelist empty after fallback; no spawnable wave");
            return WaveComposition::empty(false);
        }

        let mut composition = WaveComposition::empty(false);
        self.prepopulate(target, &whitelist, &mut composition);
        self.refine(target, &whitelist, &mut composition, rng);
        composition
    }

    /// Phase 1: eligible archetypes for this wave.
    ///
    /// Sorted by ascending cost, the `min_enemy_types` most expensive are
    /// always kept. A cheaper archetype stays eligible only while its
    /// even-split potential count does not exceed the per-type cap, which
    /// keeps one cheap archetype from saturating the wave.
    fn build_whitelist(&self, target: f64) -> Vec<&'a EnemyArchetype> {
        let mut ordered: Vec<&EnemyArchetype> = self.catalog.archetypes().iter().collect();
        ordered.sort_by(|a, b| a.cost.total_cmp(&b.cost));

        let total_types = ordered.len();
        let min_types = self.tuning.min_enemy_types.clamp(1, total_types);
        let always_kept_from = total_types - min_types;
        let even_share = target / total_types as f64;

        let mut whitelist = Vec::with_capacity(total_types);
        for (index, archetype) in ordered.iter().enumerate() {
            if index >= always_kept_from {
                whitelist.push(*archetype);
                continue;
            }
            match (potential_count(even_share, archetype.cost), self.tuning.max_prepopulation_per_type) {
                // No cap configured: every candidate stays eligible.
                (_, None) => whitelist.push(*archetype),
                (Some(count), Some(cap)) if count <= u64::from(cap) => whitelist.push(*archetype),
                // Count over the cap, or unbounded (cost <= 0): excluded.
                _ => {}
            }
        }

        if whitelist.is_empty() {
            debug!(target_difficulty = target, min_types, "Whitelist emptied by exclusion; falling back to most expensive types");
            whitelist = ordered[always_kept_from..].to_vec();
        }
        whitelist
    }

    /// Phase 2: split the target evenly across the whitelist and add each
    /// archetype's floor share up front.
    fn prepopulate(
        &self,
        target: f64,
        whitelist: &[&'a EnemyArchetype],
        composition: &mut WaveComposition,
    ) {
        let even_share = target / whitelist.len() as f64;
        for archetype in whitelist {
            let Some(count) = potential_count(even_share, archetype.cost) else {
                continue;
            };
            for _ in 0..count {
                add_member(composition, archetype);
            }
        }
    }

    /// Phase 3: bounded random walk toward the target. Under target (or
    /// still empty): add a random whitelisted archetype. Over target:
    /// remove a random already-selected instance.
    fn refine(
        &self,
        target: f64,
        whitelist: &[&'a EnemyArchetype],
        composition: &mut WaveComposition,
        rng: &mut impl Rng,
    ) {
        let tolerance = self.tuning.difficulty_tolerance;
        let mut attempts = 0u32;

        while attempts < self.tuning.max_selection_attempts {
            if within_tolerance(target, composition.total_cost, tolerance) {
                break;
            }
            if composition.total_cost < target || composition.is_empty() {
                let pick = whitelist[rng.gen_range(0..whitelist.len())];
                add_member(composition, pick);
            } else {
                let index = rng.gen_range(0..composition.members.len());
                remove_member(composition, index);
            }
            attempts += 1;
        }

        composition.converged =
            within_tolerance(target, composition.total_cost, tolerance);
        if composition.converged {
            debug!(
                target_difficulty = target,
                total_cost = composition.total_cost,
                attempts,
                members = composition.len(),
                "Wave composition converged"
            );
        } else {
            warn!(
                target_difficulty = target,
                total_cost = composition.total_cost,
                attempts,
                relative_diff = relative_diff(target, composition.total_cost),
                "Wave composition did not converge; accepting best effort"
            );
        }
    }
}

/// Instances of an archetype if the given difficulty share were spent on it
/// alone. `None` when cost is not positive (an unbounded count, which the
/// cap rules treat as over any limit).
fn potential_count(share: f64, cost: f64) -> Option<u64> {
    if cost <= 0.0 {
        return None;
    }
    Some((share / cost).floor().max(0.0) as u64)
}

fn relative_diff(target: f64, total_cost: f64) -> f64 {
    if target <= 0.0 {
        0.0
    } else {
        (target - total_cost).abs() / target
    }
}

fn within_tolerance(target: f64, total_cost: f64, tolerance: f64) -> bool {
    relative_diff(target, total_cost) <= tolerance && (total_cost > 0.0 || target <= 0.0)
}

fn add_member(composition: &mut WaveComposition, archetype: &EnemyArchetype) {
    composition.total_cost += archetype.cost;
    composition.total_bounty += archetype.bounty;
    composition.members.push(archetype.clone());
}

fn remove_member(composition: &mut WaveComposition, index: usize) {
    let removed = composition.members.swap_remove(index);
    composition.total_cost -= removed.cost;
    composition.total_bounty -= removed.bounty;
}
