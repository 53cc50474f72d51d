use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs for the stochastic wave composer.
///
/// `max_prepopulation_per_type` is optional; absent means unlimited
/// (no cap-based whitelist exclusion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposerTuning {
    #[serde(default = "default_max_selection_attempts")]
    pub max_selection_attempts: u32,
    #[serde(default = "default_difficulty_tolerance")]
    pub difficulty_tolerance: f64,
    #[serde(default)]
    pub max_prepopulation_per_type: Option<u32>,
    #[serde(default = "default_min_enemy_types")]
    pub min_enemy_types: usize,
}

fn default_max_selection_attempts() -> u32 {
    200
}
fn default_difficulty_tolerance() -> f64 {
    0.10
}
fn default_min_enemy_types() -> usize {
    1
}

impl Default for ComposerTuning {
    fn default() -> Self {
        ComposerTuning {
            max_selection_attempts: default_max_selection_attempts(),
            difficulty_tolerance: default_difficulty_tolerance(),
            max_prepopulation_per_type: None,
            min_enemy_types: default_min_enemy_types(),
        }
    }
}

/// Full parameter set for one balance run: difficulty curve, spawn timing,
/// economy, horizon, and composer tuning. Loaded from `balance.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceParams {
    /// Target difficulty of wave 1 (W_1).
    #[serde(default = "default_starting_difficulty")]
    pub starting_difficulty: f64,
    /// Per-wave geometric growth factor (f). Values <= 1 are accepted but
    /// make the curve flat or shrinking.
    #[serde(default = "default_difficulty_increase_factor")]
    pub difficulty_increase_factor: f64,
    /// Inter-spawn delay within a speed group, milliseconds.
    #[serde(default = "default_delay_between_enemies_ms")]
    pub delay_between_enemies_ms: f64,
    /// Path length in path-units; every enemy traverses the full length.
    #[serde(default = "default_path_length")]
    pub path_length: f64,
    #[serde(default = "default_starting_money")]
    pub starting_money: f64,
    /// Difficulty-to-money-need divisor.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_max_wave")]
    pub max_wave: u32,
    /// RNG seed for composition refinement. 0 means pick a random seed;
    /// the resolved seed is recorded in the parameter snapshot.
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_report_directory")]
    pub report_directory: String,
    #[serde(default)]
    pub tuning: ComposerTuning,
}

fn default_starting_difficulty() -> f64 {
    60.0
}
fn default_difficulty_increase_factor() -> f64 {
    1.3
}
fn default_delay_between_enemies_ms() -> f64 {
    800.0
}
fn default_path_length() -> f64 {
    1200.0
}
fn default_starting_money() -> f64 {
    150.0
}
fn default_alpha() -> f64 {
    40.0
}
fn default_max_wave() -> u32 {
    50
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_report_directory() -> String {
    "./reports".to_string()
}

impl Default for BalanceParams {
    fn default() -> Self {
        BalanceParams {
            starting_difficulty: default_starting_difficulty(),
            difficulty_increase_factor: default_difficulty_increase_factor(),
            delay_between_enemies_ms: default_delay_between_enemies_ms(),
            path_length: default_path_length(),
            starting_money: default_starting_money(),
            alpha: default_alpha(),
            max_wave: default_max_wave(),
            seed: 0,
            log_level: default_log_level(),
            report_directory: default_report_directory(),
            tuning: ComposerTuning::default(),
        }
    }
}

impl BalanceParams {
    /// Load balance parameters from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let params: BalanceParams = toml::from_str(content)
            .map_err(|e| format!("{}: {}", source_path.display(), e))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if !self.path_length.is_finite() || self.path_length <= 0.0 {
            errors.push(format!(
                "path_length must be > 0, got {}. Example: path_length = 1200.0",
                self.path_length
            ));
        }

        if !self.delay_between_enemies_ms.is_finite() || self.delay_between_enemies_ms < 0.0 {
            errors.push(format!(
                "delay_between_enemies_ms must be >= 0, got {}. Example: delay_between_enemies_ms = 800.0",
                self.delay_between_enemies_ms
            ));
        }

        if !self.starting_difficulty.is_finite() {
            errors.push(format!(
                "starting_difficulty must be finite, got {}",
                self.starting_difficulty
            ));
        }

        if !self.difficulty_increase_factor.is_finite()
            || self.difficulty_increase_factor <= 0.0
        {
            errors.push(format!(
                "difficulty_increase_factor must be > 0, got {}. Example: difficulty_increase_factor = 1.3",
                self.difficulty_increase_factor
            ));
        }

        if self.max_wave == 0 {
            errors.push(format!(
                "max_wave must be >= 1, got {}. Example: max_wave = 50",
                self.max_wave
            ));
        }

        if self.tuning.max_selection_attempts == 0 {
            errors.push(format!(
                "tuning.max_selection_attempts must be > 0, got {}. Example: max_selection_attempts = 200",
                self.tuning.max_selection_attempts
            ));
        }

        if !self.tuning.difficulty_tolerance.is_finite() || self.tuning.difficulty_tolerance < 0.0
        {
            errors.push(format!(
                "tuning.difficulty_tolerance must be >= 0, got {}. Example: difficulty_tolerance = 0.1",
                self.tuning.difficulty_tolerance
            ));
        }

        if self.tuning.min_enemy_types == 0 {
            errors.push(format!(
                "tuning.min_enemy_types must be >= 1, got {}. Example: min_enemy_types = 1",
                self.tuning.min_enemy_types
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }

    /// Target difficulty for wave `n` (1-based): `W_n = W_1 * f^(n-1)`.
    pub fn wave_difficulty(&self, wave: u32) -> f64 {
        let exponent = wave.saturating_sub(1) as i32;
        self.starting_difficulty * self.difficulty_increase_factor.powi(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn test_path() -> PathBuf {
        PathBuf::from("test-balance.toml")
    }

    #[test]
    fn defaults_applied_for_empty_config() {
        let params = BalanceParams::from_toml_str("", &test_path()).unwrap();
        assert_eq!(params.starting_difficulty, 60.0);
        assert_eq!(params.difficulty_increase_factor, 1.3);
        assert_eq!(params.delay_between_enemies_ms, 800.0);
        assert_eq!(params.path_length, 1200.0);
        assert_eq!(params.starting_money, 150.0);
        assert_eq!(params.alpha, 40.0);
        assert_eq!(params.max_wave, 50);
        assert_eq!(params.seed, 0);
        assert_eq!(params.log_level, "info");
        assert_eq!(params.report_directory, "./reports");
        assert_eq!(params.tuning.max_selection_attempts, 200);
        assert_eq!(params.tuning.difficulty_tolerance, 0.10);
        assert_eq!(params.tuning.max_prepopulation_per_type, None);
        assert_eq!(params.tuning.min_enemy_types, 1);
    }

    #[test]
    fn valid_config_loads_all_fields() {
        let toml = r#"
            starting_difficulty = 20.0
            difficulty_increase_factor = 1.5
            delay_between_enemies_ms = 500.0
            path_length = 1000.0
            starting_money = 400.0
            alpha = 25.0
            max_wave = 30
            seed = 7
            log_level = "debug"
            report_directory = "./out"

            [tuning]
            max_selection_attempts = 100
            difficulty_tolerance = 0.05
            max_prepopulation_per_type = 12
            min_enemy_types = 2
        "#;
        let params = BalanceParams::from_toml_str(toml, &test_path()).unwrap();
        assert_eq!(params.starting_difficulty, 20.0);
        assert_eq!(params.max_wave, 30);
        assert_eq!(params.seed, 7);
        assert_eq!(params.tuning.max_selection_attempts, 100);
        assert_eq!(params.tuning.max_prepopulation_per_type, Some(12));
        assert_eq!(params.tuning.min_enemy_types, 2);
    }

    #[test]
    fn wave_difficulty_grows_geometrically() {
        let params = BalanceParams {
            starting_difficulty: 20.0,
            difficulty_increase_factor: 1.5,
            ..BalanceParams::default()
        };
        assert!((params.wave_difficulty(1) - 20.0).abs() < 1e-9);
        assert!((params.wave_difficulty(2) - 30.0).abs() < 1e-9);
        assert!((params.wave_difficulty(3) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_path_length_rejected() {
        let err = BalanceParams::from_toml_str("path_length = 0.0", &test_path()).unwrap_err();
        assert!(err.contains("path_length"), "Error: {}", err);
    }

    #[test]
    fn invalid_growth_factor_rejected() {
        let err = BalanceParams::from_toml_str(
            "difficulty_increase_factor = -2.0",
            &test_path(),
        )
        .unwrap_err();
        assert!(err.contains("difficulty_increase_factor"), "Error: {}", err);
    }

    #[test]
    fn invalid_max_wave_rejected() {
        let err = BalanceParams::from_toml_str("max_wave = 0", &test_path()).unwrap_err();
        assert!(err.contains("max_wave"), "Error: {}", err);
    }

    #[test]
    fn invalid_min_enemy_types_rejected() {
        let toml = "[tuning]\nmin_enemy_types = 0";
        let err = BalanceParams::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.contains("min_enemy_types"), "Error: {}", err);
    }

    #[test]
    fn invalid_log_level_rejected() {
        let err =
            BalanceParams::from_toml_str(r#"log_level = "verbose""#, &test_path()).unwrap_err();
        assert!(err.contains("log_level"), "Error: {}", err);
    }

    #[test]
    fn multiple_errors_reported_together() {
        let toml = "path_length = -1.0\nmax_wave = 0";
        let err = BalanceParams::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.contains("path_length"), "Error: {}", err);
        assert!(err.contains("max_wave"), "Error: {}", err);
    }

    #[test]
    fn from_file_loads_valid_config() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "starting_difficulty = 75.0").unwrap();
        let params = BalanceParams::from_file(tmp.path()).unwrap();
        assert_eq!(params.starting_difficulty, 75.0);
    }

    #[test]
    fn from_file_missing_file_error() {
        let err = BalanceParams::from_file(Path::new("/nonexistent/balance.toml")).unwrap_err();
        assert!(err.contains("Cannot read"), "Error: {}", err);
    }

    #[test]
    fn malformed_toml_includes_source_path() {
        let err =
            BalanceParams::from_toml_str("max_wave = [oops", &test_path()).unwrap_err();
        assert!(err.contains("test-balance.toml"), "Error: {}", err);
    }
}
