use std::collections::HashMap;

use crate::simulation::composer::WaveComposition;

/// Members of one wave sharing the exact same speed, spawned as one
/// staggered column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedGroup {
    /// Path-units per second.
    pub speed: f64,
    pub count: u32,
}

/// Computes the real-time duration of a composed wave.
///
/// Spawning each speed group at a uniform interval independently would make
/// arrivals at the endpoint wildly disjointed. Instead every group is
/// delayed at spawn so that the center of mass of each group reaches the
/// path midpoint at the same moment; the wave ends when the last member of
/// the slowest-to-finish group completes the full path.
#[derive(Debug, Clone, Copy)]
pub struct WaveTimingModel {
    /// Full path length in path-units.
    path_length: f64,
    /// Inter-spawn delay within a group, milliseconds.
    spawn_delay_ms: f64,
}

impl WaveTimingModel {
    pub fn new(path_length: f64, spawn_delay_ms: f64) -> Self {
        WaveTimingModel {
            path_length,
            spawn_delay_ms,
        }
    }

    /// Wave duration in milliseconds; 0 for an empty composition.
    pub fn duration_ms(&self, composition: &WaveComposition) -> f64 {
        let groups = speed_groups(composition);
        if groups.is_empty() {
            return 0.0;
        }

        let midpoint = self.path_length / 2.0;
        let delay = self.spawn_delay_ms;

        // Time for each group's center of mass to reach the midpoint when
        // spawned at t = 0: travel time plus half the internal stagger.
        let com_times: Vec<f64> = groups
            .iter()
            .map(|group| {
                let travel_ms = midpoint / group.speed * 1000.0;
                let stagger_offset = (group.count - 1) as f64 * delay / 2.0;
                travel_ms + stagger_offset
            })
            .collect();

        let com_max = com_times.iter().fold(0.0_f64, |acc, &t| acc.max(t));

        // Delay each group so all centers of mass coincide, then find when
        // the last spawned member of each group finishes the full path.
        groups
            .iter()
            .zip(&com_times)
            .map(|(group, &com)| {
                let start = com_max - com;
                let last_spawn = (group.count - 1) as f64 * delay;
                let full_travel_ms = self.path_length / group.speed * 1000.0;
                start + last_spawn + full_travel_ms
            })
            .fold(0.0_f64, f64::max)
    }
}

/// Group composition members by exact speed. Keyed on the speed's bit
/// pattern; only identical values share a group.
pub fn speed_groups(composition: &WaveComposition) -> Vec<SpeedGroup> {
    let mut counts: HashMap<u64, (f64, u32)> = HashMap::new();
    for member in composition.members() {
        let entry = counts.entry(member.speed.to_bits()).or_insert((member.speed, 0));
        entry.1 += 1;
    }
    let mut groups: Vec<SpeedGroup> = counts
        .into_values()
        .map(|(speed, count)| SpeedGroup { speed, count })
        .collect();
    groups.sort_by(|a, b| a.speed.total_cmp(&b.speed));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EnemyCatalog;
    use crate::config::enemies::EnemyDefinition;
    use crate::config::params::ComposerTuning;
    use crate::simulation::composer::WaveComposer;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn def(id: &str, hp: f64, speed: f64, bounty: f64) -> EnemyDefinition {
        EnemyDefinition {
            id: id.to_string(),
            hp,
            speed,
            bounty,
        }
    }

    /// Compose a wave that is exactly `count` copies of a single archetype
    /// by making the target an exact multiple of its cost.
    fn uniform_wave(hp: f64, speed: f64, count: u32) -> WaveComposition {
        let catalog = EnemyCatalog::from_definitions(&[def("only", hp, speed, 1.0)]).unwrap();
        let tuning = ComposerTuning::default();
        let composer = WaveComposer::new(&catalog, &tuning);
        let target = hp * speed * count as f64;
        let composition = composer.compose(target, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(composition.len(), count as usize);
        composition
    }

    fn two_speed_wave() -> WaveComposition {
        // Costs 10 and 10: target 20 pre-populates one of each.
        let catalog = EnemyCatalog::from_definitions(&[
            def("slow", 10.0, 1.0, 2.0),
            def("fast", 5.0, 2.0, 1.0),
        ])
        .unwrap();
        let tuning = ComposerTuning::default();
        let composer = WaveComposer::new(&catalog, &tuning);
        composer.compose(20.0, &mut ChaCha8Rng::seed_from_u64(1))
    }

    #[test]
    fn single_group_matches_closed_form() {
        // L = 1000, delay = 500 ms, speed = 1000 units/s, k = 3:
        // midpoint travel 500 ms + stagger 500 ms => com 1000 ms;
        // duration = 0 + 2*500 + 1000 = 2000 ms.
        let model = WaveTimingModel::new(1000.0, 500.0);
        let wave = uniform_wave(1.0, 1000.0, 3);
        let duration = model.duration_ms(&wave);
        assert!((duration - 2000.0).abs() < 1e-9, "duration {}", duration);
    }

    #[test]
    fn empty_composition_has_zero_duration() {
        let catalog = EnemyCatalog::from_definitions(&[def("a", 1.0, 1.0, 0.0)]).unwrap();
        let tuning = ComposerTuning::default();
        let composer = WaveComposer::new(&catalog, &tuning);
        let empty = composer.compose(0.0, &mut ChaCha8Rng::seed_from_u64(1));

        let model = WaveTimingModel::new(1000.0, 500.0);
        assert_eq!(model.duration_ms(&empty), 0.0);
    }

    #[test]
    fn duration_strictly_increases_with_count() {
        let model = WaveTimingModel::new(1000.0, 500.0);
        let mut previous = 0.0;
        for count in 1..=6 {
            let duration = model.duration_ms(&uniform_wave(1.0, 1000.0, count));
            assert!(
                duration > previous,
                "k={}: {} not > {}",
                count,
                duration,
                previous
            );
            previous = duration;
        }
    }

    #[test]
    fn no_group_finishes_before_its_own_full_travel_time() {
        let model = WaveTimingModel::new(1200.0, 800.0);
        let wave = two_speed_wave();
        let duration = model.duration_ms(&wave);
        let slowest_full_travel = speed_groups(&wave)
            .iter()
            .map(|g| 1200.0 / g.speed * 1000.0)
            .fold(0.0_f64, f64::max);
        assert!(
            duration >= slowest_full_travel,
            "duration {} below floor {}",
            duration,
            slowest_full_travel
        );
    }

    #[test]
    fn faster_group_is_delayed_at_spawn() {
        // Recompute the schedule by hand for a two-group wave: the slowest
        // group anchors the synchronization (zero spawn delay) and the
        // faster group waits out the center-of-mass difference.
        let path_length = 1200.0;
        let delay = 800.0;
        let wave = two_speed_wave();
        let groups = speed_groups(&wave);
        assert_eq!(groups.len(), 2);

        let midpoint = path_length / 2.0;
        let com: Vec<f64> = groups
            .iter()
            .map(|g| midpoint / g.speed * 1000.0 + (g.count - 1) as f64 * delay / 2.0)
            .collect();
        let com_max = com.iter().fold(0.0_f64, |acc, &t| acc.max(t));

        // Groups are sorted by ascending speed: [0] slow, [1] fast.
        let slow_start = com_max - com[0];
        let fast_start = com_max - com[1];
        assert_eq!(slow_start, 0.0);
        assert!(fast_start > 0.0, "fast group start {}", fast_start);
        // Equal counts: the start gap is exactly the travel-time gap.
        let expected_gap = midpoint / groups[0].speed * 1000.0 - midpoint / groups[1].speed * 1000.0;
        assert!((fast_start - expected_gap).abs() < 1e-9);
    }

    #[test]
    fn single_member_has_no_stagger() {
        // k = 1: duration is exactly the full-path travel time.
        let model = WaveTimingModel::new(1000.0, 500.0);
        let duration = model.duration_ms(&uniform_wave(1.0, 500.0, 1));
        assert!((duration - 2000.0).abs() < 1e-9, "duration {}", duration);
    }

    #[test]
    fn speed_groups_merge_identical_speeds_only() {
        let catalog = EnemyCatalog::from_definitions(&[
            def("slow", 10.0, 1.0, 2.0),
            def("fast", 5.0, 2.0, 1.0),
        ])
        .unwrap();
        let tuning = ComposerTuning::default();
        let composer = WaveComposer::new(&catalog, &tuning);
        let wave = composer.compose(20.0, &mut ChaCha8Rng::seed_from_u64(1));

        let groups = speed_groups(&wave);
        assert_eq!(groups.len(), 2);
        let total: u32 = groups.iter().map(|g| g.count).sum();
        assert_eq!(total as usize, wave.len());
    }
}
