// Season stat line ingestion and fantasy scoring.
//
// Reads the stats-provider CSV export (league dash player totals, one row per
// player-season). The provider ships far more columns than we use; extras are
// absorbed via `#[serde(flatten)]` and ignored.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Regulation game length in minutes.
pub const MINUTES_PER_GAME: f64 = 48.0;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Raw counting stats for one player-season.
#[derive(Debug, Clone, Copy)]
pub struct CountingStats {
    pub fgm: f64,
    pub fga: f64,
    pub ftm: f64,
    pub fta: f64,
    pub fg3m: f64,
    pub oreb: f64,
    pub reb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub tov: f64,
    pub pf: f64,
    pub pts: f64,
}

/// One player's totals for one season, with the fantasy score and per-game /
/// per-minute metrics derived at construction. Immutable once built.
///
/// Derived values are kept at full precision; rounding happens only when a
/// report is written.
#[derive(Debug, Clone)]
pub struct SeasonLine {
    pub player_name: String,
    pub team_abbreviation: String,
    pub season: String,
    pub gp: u32,
    pub minutes: u32,
    pub stats: CountingStats,
    pub fantasy_points: f64,
    pub avg_fantasy_ppg: f64,
    pub pct_games_played: f64,
    pub avg_minutes: f64,
    pub pct_minutes_played: f64,
    pub fantasy_points_per_min: f64,
}

impl SeasonLine {
    /// Build a season line, computing the fantasy score and derived metrics.
    /// A zero GP or minutes divisor yields 0.0 for the affected metric.
    pub fn new(
        player_name: String,
        team_abbreviation: String,
        season: String,
        gp: u32,
        minutes: u32,
        stats: CountingStats,
        season_game_count: u32,
    ) -> Self {
        let fp = fantasy_points(&stats);
        let games = f64::from(season_game_count);
        SeasonLine {
            fantasy_points: fp,
            avg_fantasy_ppg: ratio(fp, f64::from(gp)),
            pct_games_played: 100.0 * ratio(f64::from(gp), games),
            avg_minutes: ratio(f64::from(minutes), f64::from(gp)),
            pct_minutes_played: 100.0 * ratio(f64::from(minutes), MINUTES_PER_GAME * games),
            fantasy_points_per_min: ratio(fp, f64::from(minutes)),
            player_name,
            team_abbreviation,
            season,
            gp,
            minutes,
            stats,
        }
    }
}

/// The fixed linear fantasy scoring formula.
pub fn fantasy_points(s: &CountingStats) -> f64 {
    s.fgm - s.fga + s.ftm - s.fta + s.fg3m + 0.5 * s.oreb + s.reb + s.ast
        + 1.5 * s.stl
        + 1.5 * s.blk
        - s.tov
        - s.pf
        + s.pts
}

/// Division with a defined fallback: zero divisor yields 0.0 instead of an
/// infinite or NaN value leaking into the ranking math.
fn ratio(numerator: f64, divisor: f64) -> f64 {
    if divisor == 0.0 {
        0.0
    } else {
        numerator / divisor
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private) — stats provider export format
// ---------------------------------------------------------------------------

/// Provider CSV row. Numeric fields come in as f64 because the export does
/// not distinguish integer columns. Extra columns are silently absorbed.
#[derive(Debug, Deserialize)]
#[allow(dead_code, non_snake_case)]
struct RawSeasonTotals {
    PLAYER_NAME: String,
    #[serde(default)]
    TEAM_ABBREVIATION: String,
    SEASON: String,
    GP: f64,
    MIN: f64,
    FGM: f64,
    FGA: f64,
    FTM: f64,
    FTA: f64,
    FG3M: f64,
    OREB: f64,
    REB: f64,
    AST: f64,
    STL: f64,
    BLK: f64,
    TOV: f64,
    PF: f64,
    PTS: f64,
    /// Absorb any extra columns the provider includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_season_lines_from_reader<R: Read>(
    rdr: R,
    season_game_count: u32,
) -> Result<Vec<SeasonLine>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut lines = Vec::new();
    for result in reader.deserialize::<RawSeasonTotals>() {
        match result {
            Ok(raw) => {
                let name = raw.PLAYER_NAME.trim().to_string();
                if name.is_empty() {
                    warn!("skipping season row with empty player name");
                    continue;
                }
                if raw.GP < 0.0 || !raw.GP.is_finite() {
                    warn!("rejecting row for '{}': GP must be >= 0, got {}", name, raw.GP);
                    continue;
                }
                if raw.MIN < 0.0 || !raw.MIN.is_finite() {
                    warn!("rejecting row for '{}': MIN must be >= 0, got {}", name, raw.MIN);
                    continue;
                }
                let counting = CountingStats {
                    fgm: raw.FGM,
                    fga: raw.FGA,
                    ftm: raw.FTM,
                    fta: raw.FTA,
                    fg3m: raw.FG3M,
                    oreb: raw.OREB,
                    reb: raw.REB,
                    ast: raw.AST,
                    stl: raw.STL,
                    blk: raw.BLK,
                    tov: raw.TOV,
                    pf: raw.PF,
                    pts: raw.PTS,
                };
                if !all_finite(&[
                    counting.fgm,
                    counting.fga,
                    counting.ftm,
                    counting.fta,
                    counting.fg3m,
                    counting.oreb,
                    counting.reb,
                    counting.ast,
                    counting.stl,
                    counting.blk,
                    counting.tov,
                    counting.pf,
                    counting.pts,
                ]) {
                    warn!("rejecting row for '{}': non-finite counting stat", name);
                    continue;
                }
                lines.push(SeasonLine::new(
                    name,
                    raw.TEAM_ABBREVIATION.trim().to_string(),
                    raw.SEASON.trim().to_string(),
                    raw.GP.round() as u32,
                    raw.MIN.round() as u32,
                    counting,
                    season_game_count,
                ));
            }
            Err(e) => {
                warn!("skipping malformed season row: {}", e);
            }
        }
    }
    Ok(lines)
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load per-season stat lines from the provider CSV export.
///
/// Invalid rows (negative GP or minutes, non-finite stats, missing name) are
/// rejected individually with a logged reason. A file yielding zero valid
/// rows is an error: the ranking step cannot proceed without input.
pub fn load_season_lines(
    path: &Path,
    season_game_count: u32,
) -> Result<Vec<SeasonLine>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let lines =
        load_season_lines_from_reader(file, season_game_count).map_err(|e| IngestError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
    if lines.is_empty() {
        return Err(IngestError::Validation(format!(
            "season stats CSV {} produced zero valid rows",
            path.display()
        )));
    }
    Ok(lines)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn sample_stats() -> CountingStats {
        CountingStats {
            fgm: 500.0,
            fga: 1000.0,
            ftm: 200.0,
            fta: 250.0,
            fg3m: 100.0,
            oreb: 80.0,
            reb: 400.0,
            ast: 300.0,
            stl: 60.0,
            blk: 40.0,
            tov: 150.0,
            pf: 120.0,
            pts: 1300.0,
        }
    }

    // -- Scoring formula --

    #[test]
    fn fantasy_points_known_value() {
        // 500 - 1000 + 200 - 250 + 100 + 40 + 400 + 300 + 90 + 60 - 150 - 120 + 1300
        let fp = fantasy_points(&sample_stats());
        assert!(approx_eq(fp, 1470.0, 1e-10));
    }

    #[test]
    fn derived_metrics_computed_at_construction() {
        let line = SeasonLine::new(
            "Test Player".into(),
            "DEN".into(),
            "2024-25".into(),
            70,
            2400,
            sample_stats(),
            82,
        );
        assert!(approx_eq(line.fantasy_points, 1470.0, 1e-10));
        assert!(approx_eq(line.avg_fantasy_ppg, 1470.0 / 70.0, 1e-10));
        assert!(approx_eq(line.avg_minutes, 2400.0 / 70.0, 1e-10));
        assert!(approx_eq(line.pct_games_played, 100.0 * 70.0 / 82.0, 1e-10));
        assert!(approx_eq(
            line.pct_minutes_played,
            100.0 * 2400.0 / (48.0 * 82.0),
            1e-10
        ));
        assert!(approx_eq(
            line.fantasy_points_per_min,
            1470.0 / 2400.0,
            1e-10
        ));
    }

    #[test]
    fn zero_gp_yields_zero_per_game_metrics() {
        let line = SeasonLine::new(
            "Bench Guy".into(),
            "BOS".into(),
            "2024-25".into(),
            0,
            0,
            sample_stats(),
            82,
        );
        assert!(approx_eq(line.avg_fantasy_ppg, 0.0, 1e-10));
        assert!(approx_eq(line.avg_minutes, 0.0, 1e-10));
        assert!(approx_eq(line.fantasy_points_per_min, 0.0, 1e-10));
        // Fantasy points themselves are still defined.
        assert!(line.fantasy_points != 0.0);
    }

    #[test]
    fn minutes_exceeding_gp_times_48_accepted() {
        // Dirty data from the provider; treated as valid input.
        let line = SeasonLine::new(
            "Iron Man".into(),
            "PHI".into(),
            "2024-25".into(),
            1,
            200,
            sample_stats(),
            82,
        );
        assert_eq!(line.minutes, 200);
        assert!(line.avg_minutes > MINUTES_PER_GAME);
    }

    // -- CSV loading --

    const HEADER: &str = "PLAYER_NAME,TEAM_ABBREVIATION,SEASON,GP,MIN,FGM,FGA,FTM,FTA,FG3M,OREB,REB,AST,STL,BLK,TOV,PF,PTS";

    #[test]
    fn csv_rows_loaded() {
        let csv_data = format!(
            "{HEADER}\n\
             Nikola Jokic,DEN,2024-25,70,2400,500,1000,200,250,100,80,400,300,60,40,150,120,1300\n\
             Jamal Murray,DEN,2024-25,60,1900,400,900,150,180,80,30,200,350,50,10,120,100,1050"
        );
        let lines = load_season_lines_from_reader(csv_data.as_bytes(), 82).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].player_name, "Nikola Jokic");
        assert_eq!(lines[0].team_abbreviation, "DEN");
        assert_eq!(lines[0].season, "2024-25");
        assert_eq!(lines[0].gp, 70);
        assert_eq!(lines[0].minutes, 2400);
        assert!(approx_eq(lines[0].fantasy_points, 1470.0, 1e-10));
        assert_eq!(lines[1].player_name, "Jamal Murray");
    }

    #[test]
    fn extra_provider_columns_ignored() {
        let csv_data = format!(
            "{HEADER},PLUS_MINUS,NBA_FANTASY_PTS,DD2\n\
             Nikola Jokic,DEN,2024-25,70,2400,500,1000,200,250,100,80,400,300,60,40,150,120,1300,350,3900,60"
        );
        let lines = load_season_lines_from_reader(csv_data.as_bytes(), 82).unwrap();
        assert_eq!(lines.len(), 1);
        // The provider's own fantasy column is ignored; the score is recomputed.
        assert!(approx_eq(lines[0].fantasy_points, 1470.0, 1e-10));
    }

    #[test]
    fn negative_gp_row_rejected() {
        let csv_data = format!(
            "{HEADER}\n\
             Bad Row,DEN,2024-25,-5,2400,500,1000,200,250,100,80,400,300,60,40,150,120,1300\n\
             Good Row,DEN,2024-25,70,2400,500,1000,200,250,100,80,400,300,60,40,150,120,1300"
        );
        let lines = load_season_lines_from_reader(csv_data.as_bytes(), 82).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].player_name, "Good Row");
    }

    #[test]
    fn negative_minutes_row_rejected() {
        let csv_data = format!(
            "{HEADER}\n\
             Bad Row,DEN,2024-25,70,-10,500,1000,200,250,100,80,400,300,60,40,150,120,1300"
        );
        let lines = load_season_lines_from_reader(csv_data.as_bytes(), 82).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn malformed_row_skipped() {
        let csv_data = format!(
            "{HEADER}\n\
             Bad Row,DEN,2024-25,not_a_number,2400,500,1000,200,250,100,80,400,300,60,40,150,120,1300\n\
             Good Row,DEN,2024-25,70,2400,500,1000,200,250,100,80,400,300,60,40,150,120,1300"
        );
        let lines = load_season_lines_from_reader(csv_data.as_bytes(), 82).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].player_name, "Good Row");
    }

    #[test]
    fn empty_player_name_skipped() {
        let csv_data = format!(
            "{HEADER}\n\
             ,DEN,2024-25,70,2400,500,1000,200,250,100,80,400,300,60,40,150,120,1300"
        );
        let lines = load_season_lines_from_reader(csv_data.as_bytes(), 82).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn names_and_teams_trimmed() {
        let csv_data = format!(
            "{HEADER}\n\
               Nikola Jokic  , DEN ,2024-25,70,2400,500,1000,200,250,100,80,400,300,60,40,150,120,1300"
        );
        let lines = load_season_lines_from_reader(csv_data.as_bytes(), 82).unwrap();
        assert_eq!(lines[0].player_name, "Nikola Jokic");
        assert_eq!(lines[0].team_abbreviation, "DEN");
    }

    #[test]
    fn header_only_csv_yields_empty_vec() {
        let lines = load_season_lines_from_reader(HEADER.as_bytes(), 82).unwrap();
        assert!(lines.is_empty());
    }
}
