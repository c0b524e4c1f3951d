// CSV report writers for rankings, recommendations, and unmatched players.
//
// Internal values stay at full precision; rounding to two decimals happens
// here, at the output boundary, and nowhere else. Headers are written
// explicitly so a report with zero rows is still well-formed CSV.

use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::matcher::{AvailablePlayer, MatchedPickup};
use crate::ranking::RankedPlayer;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create output directory for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

const RANKINGS_HEADER: [&str; 11] = [
    "PLAYER_NAME",
    "TEAM_ABBREVIATION",
    "FANTASY_RANK_SCORE",
    "FANTASY_RANK_PERCENTILE",
    "FANTASY_POINTS_PER_MIN",
    "PCT_MINUTES_PLAYED",
    "PCT_GAMES_PLAYED",
    "GP",
    "AVG_MINUTES",
    "FANTASY_POINTS",
    "AVG_FANTASY_PPG",
];

const RECOMMENDATIONS_HEADER: [&str; 7] = [
    "PLAYER_NAME",
    "TEAM_ABBREVIATION",
    "POSITION",
    "RANK_PERCENTILE",
    "FANTASY_POINTS_PER_MIN",
    "PCT_MINUTES_PLAYED",
    "PCT_GAMES_PLAYED",
];

const UNMATCHED_HEADER: [&str; 3] = ["PLAYER_NAME", "TEAM_ABBREVIATION", "POSITION"];

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn ensure_parent_dir(path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ReportError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Open a writer with automatic headers disabled and emit the header row
/// up front, so it appears even when no data rows follow.
fn open_writer(
    path: &Path,
    header: &[&str],
) -> Result<csv::Writer<std::fs::File>, ReportError> {
    ensure_parent_dir(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| ReportError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
    writer.write_record(header).map_err(|e| ReportError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(writer)
}

// ---------------------------------------------------------------------------
// Row structs (serialized field order matches the header constants)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct RankingRow<'a> {
    player_name: &'a str,
    team_abbreviation: &'a str,
    fantasy_rank_score: f64,
    fantasy_rank_percentile: f64,
    fantasy_points_per_min: f64,
    pct_minutes_played: f64,
    pct_games_played: f64,
    gp: u32,
    avg_minutes: f64,
    fantasy_points: f64,
    avg_fantasy_ppg: f64,
}

#[derive(Debug, Serialize)]
struct RecommendationRow<'a> {
    player_name: &'a str,
    team_abbreviation: &'a str,
    position: &'a str,
    rank_percentile: f64,
    fantasy_points_per_min: f64,
    pct_minutes_played: f64,
    pct_games_played: f64,
}

#[derive(Debug, Serialize)]
struct UnmatchedRow<'a> {
    player_name: &'a str,
    team_abbreviation: &'a str,
    position: &'a str,
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write the full ranking table, in the given (descending rank score) order.
pub fn write_rankings(path: &Path, players: &[RankedPlayer]) -> Result<(), ReportError> {
    let mut writer = open_writer(path, &RANKINGS_HEADER)?;
    for ranked in players {
        let p = &ranked.player;
        writer
            .serialize(RankingRow {
                player_name: &p.player_name,
                team_abbreviation: &p.team_abbreviation,
                fantasy_rank_score: round2(ranked.rank_score),
                fantasy_rank_percentile: round2(ranked.percentile),
                fantasy_points_per_min: round2(p.fantasy_points_per_min),
                pct_minutes_played: round2(p.pct_minutes_played),
                pct_games_played: round2(p.pct_games_played),
                gp: p.gp,
                avg_minutes: round2(p.avg_minutes),
                fantasy_points: round2(p.fantasy_points),
                avg_fantasy_ppg: round2(p.avg_fantasy_ppg),
            })
            .map_err(|e| ReportError::Csv {
                path: path.display().to_string(),
                source: e,
            })?;
    }
    writer.flush().map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// Write the pickup recommendations, in the given (descending percentile)
/// order.
pub fn write_recommendations(path: &Path, picks: &[MatchedPickup]) -> Result<(), ReportError> {
    let mut writer = open_writer(path, &RECOMMENDATIONS_HEADER)?;
    for pick in picks {
        writer
            .serialize(RecommendationRow {
                player_name: &pick.player_name,
                team_abbreviation: &pick.team_abbreviation,
                position: &pick.position,
                rank_percentile: round2(pick.percentile),
                fantasy_points_per_min: round2(pick.fantasy_points_per_min),
                pct_minutes_played: round2(pick.pct_minutes_played),
                pct_games_played: round2(pick.pct_games_played),
            })
            .map_err(|e| ReportError::Csv {
                path: path.display().to_string(),
                source: e,
            })?;
    }
    writer.flush().map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// Write the candidates that found no ranking-table counterpart.
pub fn write_unmatched(path: &Path, players: &[AvailablePlayer]) -> Result<(), ReportError> {
    let mut writer = open_writer(path, &UNMATCHED_HEADER)?;
    for player in players {
        writer
            .serialize(UnmatchedRow {
                player_name: &player.player_name,
                team_abbreviation: &player.team_abbreviation,
                position: &player.position,
            })
            .map_err(|e| ReportError::Csv {
                path: path.display().to_string(),
                source: e,
            })?;
    }
    writer.flush().map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
