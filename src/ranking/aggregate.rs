// Cross-season aggregation with games-played weighting.

use std::collections::HashMap;

use crate::config::FilterConfig;
use crate::stats::SeasonLine;

/// One player's summary across every season supplied.
///
/// `fantasy_points` is cumulative production and is summed; every other
/// aggregated metric is a GP-weighted mean of the per-season values. The team
/// abbreviation is taken from the last row in group order, which the caller
/// is expected to have sorted chronologically.
#[derive(Debug, Clone)]
pub struct AggregatedPlayer {
    pub player_name: String,
    pub team_abbreviation: String,
    pub gp: u32,
    pub avg_minutes: f64,
    pub fantasy_points: f64,
    pub avg_fantasy_ppg: f64,
    pub fantasy_points_per_min: f64,
    pub pct_minutes_played: f64,
    pub pct_games_played: f64,
}

/// GP-weighted arithmetic mean over (value, gp) pairs.
/// Callers must ensure the total weight is non-zero.
fn weighted_mean(rows: &[&SeasonLine], total_gp: f64, value: impl Fn(&SeasonLine) -> f64) -> f64 {
    rows.iter()
        .map(|r| value(r) * f64::from(r.gp))
        .sum::<f64>()
        / total_gp
}

/// Collapse season lines into one `AggregatedPlayer` per player, applying the
/// minimum-participation filters to the aggregate (not per season): a player
/// who fails a single-season cut but qualifies in aggregate is kept.
///
/// Groups whose summed GP is zero have no defined weighted average and are
/// dropped before filtering. Output preserves first-appearance order of
/// players in the input.
pub fn aggregate(lines: &[SeasonLine], filters: &FilterConfig) -> Vec<AggregatedPlayer> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&SeasonLine>> = HashMap::new();
    for line in lines {
        groups
            .entry(line.player_name.as_str())
            .or_insert_with(|| {
                order.push(line.player_name.as_str());
                Vec::new()
            })
            .push(line);
    }

    let mut aggregated = Vec::new();
    for name in order {
        let rows = &groups[name];
        let total_gp: u32 = rows.iter().map(|r| r.gp).sum();
        if total_gp == 0 {
            continue;
        }
        let gp = f64::from(total_gp);

        let avg_minutes = weighted_mean(rows, gp, |r| r.avg_minutes);
        if total_gp < filters.min_games || avg_minutes < filters.min_minutes {
            continue;
        }

        aggregated.push(AggregatedPlayer {
            player_name: name.to_string(),
            team_abbreviation: rows
                .last()
                .map(|r| r.team_abbreviation.clone())
                .unwrap_or_default(),
            gp: total_gp,
            avg_minutes,
            fantasy_points: rows.iter().map(|r| r.fantasy_points).sum(),
            avg_fantasy_ppg: weighted_mean(rows, gp, |r| r.avg_fantasy_ppg),
            fantasy_points_per_min: weighted_mean(rows, gp, |r| r.fantasy_points_per_min),
            pct_minutes_played: weighted_mean(rows, gp, |r| r.pct_minutes_played),
            pct_games_played: weighted_mean(rows, gp, |r| r.pct_games_played),
        });
    }
    aggregated
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
