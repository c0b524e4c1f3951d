// Min-max normalization of ranking metrics across the player population.

use serde::Deserialize;

use crate::ranking::aggregate::AggregatedPlayer;

/// A rankable metric on an aggregated player. The configured metric set
/// defines the weight vector's component order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PctMinutesPlayed,
    FantasyPointsPerMin,
    PctGamesPlayed,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::PctMinutesPlayed => "pct_minutes_played",
            Metric::FantasyPointsPerMin => "fantasy_points_per_min",
            Metric::PctGamesPlayed => "pct_games_played",
        }
    }

    /// Raw (un-normalized) value of this metric for one player.
    pub fn value(&self, player: &AggregatedPlayer) -> f64 {
        match self {
            Metric::PctMinutesPlayed => player.pct_minutes_played,
            Metric::FantasyPointsPerMin => player.fantasy_points_per_min,
            Metric::PctGamesPlayed => player.pct_games_played,
        }
    }
}

/// Min-max rescale a column to [0, 1] across the population: the minimum
/// maps to 0 and the maximum to 1. A zero-variance column (all values equal)
/// has no defined scale and maps every player to 0.0.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let range = max - min;
    if range == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}

/// Extract the raw column for one metric across the population.
pub fn raw_column(players: &[AggregatedPlayer], metric: Metric) -> Vec<f64> {
    players.iter().map(|p| metric.value(p)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
