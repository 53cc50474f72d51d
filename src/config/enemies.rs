use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw enemy archetype definition as it appears in `enemies.toml`.
///
/// Values are unchecked here; the catalog decides which definitions are
/// usable (positive speed and hp) and derives the difficulty cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub id: String,
    pub hp: f64,
    pub speed: f64,
    #[serde(default)]
    pub bounty: f64,
}

/// The `enemies.toml` roster file: a list of `[[enemies]]` entries.
#[derive(Debug, Clone, Deserialize)]
pub struct EnemyRoster {
    pub enemies: Vec<EnemyDefinition>,
}

impl EnemyRoster {
    /// Load the enemy roster from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let roster: EnemyRoster = toml::from_str(content)
            .map_err(|e| format!("Invalid TOML in {}: {}", source_path.display(), e))?;
        roster.validate()?;
        Ok(roster)
    }

    /// Structural validation only. Non-positive speed/hp entries are a
    /// catalog concern (dropped with a warning), not a load failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.enemies.is_empty() {
            return Err("enemy roster is empty. Add at least one [[enemies]] entry".to_string());
        }

        let mut errors = Vec::new();
        for (index, def) in self.enemies.iter().enumerate() {
            if def.id.trim().is_empty() {
                errors.push(format!("enemies[{}]: id must not be empty", index));
            }
            if def.bounty < 0.0 {
                errors.push(format!(
                    "enemies[{}] ('{}'): bounty must be >= 0, got {}",
                    index, def.id, def.bounty
                ));
            }
        }

        for (index, def) in self.enemies.iter().enumerate() {
            let duplicate = self.enemies[..index].iter().any(|other| other.id == def.id);
            if duplicate {
                errors.push(format!("enemies[{}]: duplicate id '{}'", index, def.id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}
