// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ranking::normalize::Metric;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub filters: FilterConfig,
    pub metrics: Vec<MetricWeightConfig>,
    pub recommend: RecommendConfig,
    pub data_paths: DataPaths,
    pub output_paths: OutputPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    data: DataPaths,
    output: OutputPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    /// Games in a full regular season; drives the participation percentages.
    pub season_game_count: u32,
    /// Season labels to include. Empty means every season present in the
    /// stats file.
    #[serde(default)]
    pub seasons: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub season_stats: String,
    /// Externally sourced free-agent list. When absent the matching stage is
    /// skipped and only the ranking output is produced.
    #[serde(default)]
    pub available_players: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputPaths {
    pub rankings: String,
    pub recommendations: String,
    pub unmatched: String,
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    filters: FilterConfig,
    metrics: Vec<MetricWeightConfig>,
    recommend: RecommendConfig,
}

/// Minimum-participation thresholds applied to the aggregated population.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    pub min_games: u32,
    pub min_minutes: f64,
}

/// One ranking metric and its candidate weight values for the grid search.
/// The order of `[[metrics]]` tables defines weight-vector component order.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricWeightConfig {
    pub name: Metric,
    pub candidates: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendConfig {
    pub top_n: usize,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        filters: strategy_file.filters,
        metrics: strategy_file.metrics,
        recommend: strategy_file.recommend,
        data_paths: league_file.data,
        output_paths: league_file.output,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // File already exists in config/, keep the user's copy.
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying default config files first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.season_game_count == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.season_game_count".into(),
            message: "must be greater than 0".into(),
        });
    }

    if !config.filters.min_minutes.is_finite() || config.filters.min_minutes < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "filters.min_minutes".into(),
            message: format!("must be >= 0, got {}", config.filters.min_minutes),
        });
    }

    if config.metrics.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "metrics".into(),
            message: "at least one [[metrics]] table is required".into(),
        });
    }

    for (i, metric) in config.metrics.iter().enumerate() {
        if config.metrics[..i].iter().any(|m| m.name == metric.name) {
            return Err(ConfigError::ValidationError {
                field: format!("metrics.{}", metric.name.label()),
                message: "duplicate metric name".into(),
            });
        }
        if metric.candidates.is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("metrics.{}.candidates", metric.name.label()),
                message: "candidate weight list must not be empty".into(),
            });
        }
        for w in &metric.candidates {
            if !w.is_finite() || !(0.0..=1.0).contains(w) {
                return Err(ConfigError::ValidationError {
                    field: format!("metrics.{}.candidates", metric.name.label()),
                    message: format!("candidate weights must lie in [0, 1], got {w}"),
                });
            }
        }
    }

    if config.recommend.top_n == 0 {
        return Err(ConfigError::ValidationError {
            field: "recommend.top_n".into(),
            message: "must be > 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    /// Path to the project root (works whether `cargo test` runs from the
    /// crate root or elsewhere in the tree).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    fn temp_config_dir(name: &str) -> (PathBuf, PathBuf) {
        let tmp = std::env::temp_dir().join(name);
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();
        (tmp, config_dir)
    }

    #[test]
    fn load_valid_config_from_project_defaults() {
        let (tmp, config_dir) = temp_config_dir("scout_config_defaults");
        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), config_dir.join("league.toml")).unwrap();
        fs::copy(
            root.join("defaults/strategy.toml"),
            config_dir.join("strategy.toml"),
        )
        .unwrap();

        let config = load_config_from(&tmp).expect("should load valid config");

        assert_eq!(config.league.season_game_count, 82);
        assert_eq!(config.league.seasons, vec!["2023-24", "2024-25"]);
        assert_eq!(config.filters.min_games, 20);
        assert!((config.filters.min_minutes - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.metrics.len(), 3);
        assert_eq!(config.metrics[0].name, Metric::PctMinutesPlayed);
        assert_eq!(config.metrics[1].name, Metric::FantasyPointsPerMin);
        assert_eq!(config.metrics[2].name, Metric::PctGamesPlayed);
        assert_eq!(config.metrics[0].candidates, vec![0.2, 0.3, 0.4, 0.5]);
        assert_eq!(config.recommend.top_n, 10);
        assert_eq!(config.data_paths.season_stats, "data/nba_fantasy_stats.csv");
        assert!(config.data_paths.available_players.is_some());
        assert_eq!(config.output_paths.rankings, "out/fantasy_rankings.csv");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_available_players_path_is_ok() {
        let (tmp, config_dir) = temp_config_dir("scout_config_no_candidates");
        let root = project_root();
        let league_text = fs::read_to_string(root.join("defaults/league.toml")).unwrap();
        let modified: String = league_text
            .lines()
            .filter(|l| !l.starts_with("available_players"))
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(config_dir.join("league.toml"), modified).unwrap();
        fs::copy(
            root.join("defaults/strategy.toml"),
            config_dir.join("strategy.toml"),
        )
        .unwrap();

        let config = load_config_from(&tmp).expect("should load without candidates path");
        assert!(config.data_paths.available_players.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_season_game_count() {
        let (tmp, config_dir) = temp_config_dir("scout_config_zero_games");
        let root = project_root();
        let league_text = fs::read_to_string(root.join("defaults/league.toml")).unwrap();
        let modified = league_text.replace("season_game_count = 82", "season_game_count = 0");
        fs::write(config_dir.join("league.toml"), modified).unwrap();
        fs::copy(
            root.join("defaults/strategy.toml"),
            config_dir.join("strategy.toml"),
        )
        .unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "league.season_game_count");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_negative_min_minutes() {
        let (tmp, config_dir) = temp_config_dir("scout_config_neg_minutes");
        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), config_dir.join("league.toml")).unwrap();
        let strategy_text = fs::read_to_string(root.join("defaults/strategy.toml")).unwrap();
        let modified = strategy_text.replace("min_minutes = 10.0", "min_minutes = -1.0");
        fs::write(config_dir.join("strategy.toml"), modified).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "filters.min_minutes");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_out_of_range_candidate_weight() {
        let (tmp, config_dir) = temp_config_dir("scout_config_bad_weight");
        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), config_dir.join("league.toml")).unwrap();
        let strategy_text = fs::read_to_string(root.join("defaults/strategy.toml")).unwrap();
        let modified = strategy_text.replacen(
            "candidates = [0.2, 0.3, 0.4, 0.5]",
            "candidates = [0.2, 0.3, 0.4, 1.5]",
            1,
        );
        fs::write(config_dir.join("strategy.toml"), modified).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert!(field.starts_with("metrics."));
                assert!(field.ends_with(".candidates"));
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_duplicate_metric() {
        let (tmp, config_dir) = temp_config_dir("scout_config_dup_metric");
        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), config_dir.join("league.toml")).unwrap();
        let strategy_text = fs::read_to_string(root.join("defaults/strategy.toml")).unwrap();
        let modified = strategy_text.replace("fantasy_points_per_min", "pct_minutes_played");
        fs::write(config_dir.join("strategy.toml"), modified).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, message } => {
                assert_eq!(field, "metrics.pct_minutes_played");
                assert!(message.contains("duplicate"));
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_top_n() {
        let (tmp, config_dir) = temp_config_dir("scout_config_zero_top_n");
        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), config_dir.join("league.toml")).unwrap();
        let strategy_text = fs::read_to_string(root.join("defaults/strategy.toml")).unwrap();
        let modified = strategy_text.replace("top_n = 10", "top_n = 0");
        fs::write(config_dir.join("strategy.toml"), modified).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "recommend.top_n");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_strategy_toml() {
        let (tmp, config_dir) = temp_config_dir("scout_config_missing_strategy");
        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), config_dir.join("league.toml")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => {
                assert!(path.ends_with("strategy.toml"));
            }
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let (tmp, config_dir) = temp_config_dir("scout_config_invalid_toml");
        fs::write(config_dir.join("league.toml"), "this is not valid [[[ toml").unwrap();
        let root = project_root();
        fs::copy(
            root.join("defaults/strategy.toml"),
            config_dir.join("strategy.toml"),
        )
        .unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => {
                assert!(path.ends_with("league.toml"));
            }
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("scout_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), defaults_dir.join("league.toml")).unwrap();
        fs::copy(root.join("defaults/strategy.toml"), defaults_dir.join("strategy.toml")).unwrap();

        assert!(!tmp.join("config").exists());

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 2);
        assert!(tmp.join("config/league.toml").exists());
        assert!(tmp.join("config/strategy.toml").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = std::env::temp_dir().join("scout_config_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        let config_dir = tmp.join("config");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(&config_dir).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), defaults_dir.join("league.toml")).unwrap();
        fs::copy(root.join("defaults/strategy.toml"), defaults_dir.join("strategy.toml")).unwrap();

        fs::write(config_dir.join("league.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(copied[0].ends_with("strategy.toml"));

        let content = fs::read_to_string(config_dir.join("league.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("scout_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
