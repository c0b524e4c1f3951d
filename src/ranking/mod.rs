// Ranking engine: cross-season aggregation, metric normalization,
// correlation-driven weight search, percentile ranks.

pub mod aggregate;
pub mod normalize;
pub mod percentile;
pub mod weights;

use tracing::debug;

use crate::config::{FilterConfig, MetricWeightConfig};
use crate::stats::SeasonLine;

use aggregate::AggregatedPlayer;
use normalize::Metric;
use weights::{SearchOutcome, WeightVector};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RankError {
    #[error(
        "no players remain after aggregation filters (min_games={min_games}, min_minutes={min_minutes})"
    )]
    EmptyPopulation { min_games: u32, min_minutes: f64 },

    #[error("weight grid contains no combination summing to 1.0 within {tolerance}")]
    EmptyWeightGrid { tolerance: f64 },
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// An aggregated player enriched with the composite rank score and
/// percentile. Terminal form written to the rankings output.
#[derive(Debug, Clone)]
pub struct RankedPlayer {
    pub player: AggregatedPlayer,
    pub rank_score: f64,
    pub percentile: f64,
}

/// Diagnostics reported alongside a ranking run: how each raw metric
/// correlates with total fantasy points on its own, how many weight
/// candidates were tested, and what won.
#[derive(Debug, Clone)]
pub struct RankingDiagnostics {
    pub population: usize,
    pub metric_correlations: Vec<(Metric, f64)>,
    pub candidates_tested: usize,
    pub selected_weights: Vec<(Metric, f64)>,
    pub best_correlation: f64,
}

#[derive(Debug, Clone)]
pub struct RankingOutcome {
    pub players: Vec<RankedPlayer>,
    pub diagnostics: RankingDiagnostics,
}

// ---------------------------------------------------------------------------
// Top-level entry point
// ---------------------------------------------------------------------------

/// Run the full ranking computation over per-season stat lines.
///
/// Steps:
/// 1. Build the weight grid from the configured candidate sets (a grid with
///    no valid combination is a configuration error and fails here, before
///    any aggregation work).
/// 2. Aggregate season lines per player with GP weighting and apply the
///    participation filters.
/// 3. Min-max normalize the configured metrics across the population.
/// 4. Grid-search the weight vector maximizing Pearson correlation between
///    the composite score and total fantasy points.
/// 5. Apply the selected weights and derive fractional percentile ranks.
///
/// The result is sorted descending by rank score. The whole computation is
/// deterministic: equal inputs produce equal rankings.
pub fn rank_players(
    lines: &[SeasonLine],
    filters: &FilterConfig,
    metrics: &[MetricWeightConfig],
) -> Result<RankingOutcome, RankError> {
    let candidate_sets: Vec<Vec<f64>> = metrics.iter().map(|m| m.candidates.clone()).collect();
    let grid = weights::build_grid(&candidate_sets)?;
    debug!("weight grid holds {} candidate vectors", grid.len());

    let population = aggregate::aggregate(lines, filters);
    if population.is_empty() {
        return Err(RankError::EmptyPopulation {
            min_games: filters.min_games,
            min_minutes: filters.min_minutes,
        });
    }

    let target: Vec<f64> = population.iter().map(|p| p.fantasy_points).collect();

    let metric_order: Vec<Metric> = metrics.iter().map(|m| m.name).collect();
    let raw_columns: Vec<Vec<f64>> = metric_order
        .iter()
        .map(|m| normalize::raw_column(&population, *m))
        .collect();

    let metric_correlations: Vec<(Metric, f64)> = metric_order
        .iter()
        .zip(&raw_columns)
        .map(|(m, col)| (*m, weights::pearson(col, &target)))
        .collect();

    let normalized_columns: Vec<Vec<f64>> = raw_columns
        .iter()
        .map(|col| normalize::min_max_normalize(col))
        .collect();

    let SearchOutcome {
        weights: selected,
        correlation,
        candidates_tested,
    } = weights::search(&normalized_columns, &target, &grid)?;

    let players = apply_weights(population, &normalized_columns, &selected);

    let diagnostics = RankingDiagnostics {
        population: players.len(),
        metric_correlations,
        candidates_tested,
        selected_weights: metric_order
            .iter()
            .copied()
            .zip(selected.components.iter().copied())
            .collect(),
        best_correlation: correlation,
    };

    Ok(RankingOutcome {
        players,
        diagnostics,
    })
}

/// Score the population with the selected weights, attach percentiles, and
/// sort descending by rank score. Percentile is a property of the score's
/// position in the population, independent of display order.
fn apply_weights(
    population: Vec<AggregatedPlayer>,
    normalized_columns: &[Vec<f64>],
    selected: &WeightVector,
) -> Vec<RankedPlayer> {
    let scores = weights::composite_column(normalized_columns, selected);
    let percentiles = percentile::percentile_ranks(&scores);

    let mut players: Vec<RankedPlayer> = population
        .into_iter()
        .zip(scores)
        .zip(percentiles)
        .map(|((player, rank_score), percentile)| RankedPlayer {
            player,
            rank_score,
            percentile,
        })
        .collect();

    players.sort_by(|a, b| {
        b.rank_score
            .partial_cmp(&a.rank_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    players
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
