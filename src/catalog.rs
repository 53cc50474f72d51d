use serde::Serialize;
use tracing::warn;

use crate::config::enemies::EnemyDefinition;

/// A usable enemy archetype: positive speed and hp, with the derived
/// difficulty cost `hp * speed`. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyArchetype {
    pub id: String,
    /// Path-units per second.
    pub speed: f64,
    pub hp: f64,
    /// Reward granted when the enemy is defeated.
    pub bounty: f64,
    /// Difficulty cost: `hp * speed`, a scalar threat proxy.
    pub cost: f64,
}

/// Normalized roster of usable archetypes.
///
/// Definitions with non-positive speed or hp cannot contribute a finite
/// positive cost; they are dropped with a warning. An empty usable set is a
/// configuration error.
#[derive(Debug, Clone)]
pub struct EnemyCatalog {
    archetypes: Vec<EnemyArchetype>,
}

impl EnemyCatalog {
    pub fn from_definitions(definitions: &[EnemyDefinition]) -> Result<Self, String> {
        let mut archetypes = Vec::with_capacity(definitions.len());

        for def in definitions {
            if !def.speed.is_finite() || def.speed <= 0.0 {
                warn!(id = %def.id, speed = def.speed, "Dropping archetype with non-positive speed");
                continue;
            }
            if !def.hp.is_finite() || def.hp <= 0.0 {
                warn!(id = %def.id, hp = def.hp, "Dropping archetype with non-positive hp");
                continue;
            }
            archetypes.push(EnemyArchetype {
                id: def.id.clone(),
                speed: def.speed,
                hp: def.hp,
                bounty: def.bounty.max(0.0),
                cost: def.hp * def.speed,
            });
        }

        if archetypes.is_empty() {
            return Err(format!(
                "No usable enemy archetypes: all {} definition(s) have non-positive speed or hp",
                definitions.len()
            ));
        }

        Ok(EnemyCatalog { archetypes })
    }

    pub fn archetypes(&self) -> &[EnemyArchetype] {
        &self.archetypes
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Slowest usable speed, used to derive the reference traversal time
    /// `T_0 = L / min(speed)`.
    pub fn min_speed(&self) -> f64 {
        self.archetypes
            .iter()
            .map(|a| a.speed)
            .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: &str, hp: f64, speed: f64, bounty: f64) -> EnemyDefinition {
        EnemyDefinition {
            id: id.to_string(),
            hp,
            speed,
            bounty,
        }
    }

    #[test]
    fn cost_is_hp_times_speed() {
        let catalog =
            EnemyCatalog::from_definitions(&[def("runner", 5.0, 2.0, 1.0)]).unwrap();
        let a = &catalog.archetypes()[0];
        assert_eq!(a.cost, 10.0);
        assert_eq!(a.bounty, 1.0);
    }

    #[test]
    fn nonpositive_speed_dropped() {
        let catalog = EnemyCatalog::from_definitions(&[
            def("stuck", 5.0, 0.0, 1.0),
            def("runner", 5.0, 2.0, 1.0),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.archetypes()[0].id, "runner");
    }

    #[test]
    fn nonpositive_hp_dropped() {
        let catalog = EnemyCatalog::from_definitions(&[
            def("ghost", -1.0, 2.0, 1.0),
            def("runner", 5.0, 2.0, 1.0),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn non_finite_values_dropped() {
        let catalog = EnemyCatalog::from_definitions(&[
            def("nan", f64::NAN, 2.0, 1.0),
            def("inf", 5.0, f64::INFINITY, 1.0),
            def("runner", 5.0, 2.0, 1.0),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn empty_usable_set_is_error() {
        let err = EnemyCatalog::from_definitions(&[def("stuck", 5.0, 0.0, 1.0)]).unwrap_err();
        assert!(err.contains("No usable enemy archetypes"), "Error: {}", err);
    }

    #[test]
    fn min_speed_is_slowest() {
        let catalog = EnemyCatalog::from_definitions(&[
            def("runner", 5.0, 2.0, 1.0),
            def("brute", 40.0, 0.5, 6.0),
        ])
        .unwrap();
        assert_eq!(catalog.min_speed(), 0.5);
    }
}
