// Weight grid construction and correlation-driven grid search.
//
// The search space is small and discrete: the Cartesian product of per-metric
// candidate values, kept when the components sum to 1.0.

use crate::ranking::RankError;

/// Tolerance for the weight-sum constraint.
pub const SUM_TOLERANCE: f64 = 1e-3;

/// A candidate weight assignment, one component per configured metric, in
/// metric order. Components are non-negative and sum to 1.0 within
/// [`SUM_TOLERANCE`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeightVector {
    pub components: Vec<f64>,
}

impl WeightVector {
    pub fn sum(&self) -> f64 {
        self.components.iter().sum()
    }
}

/// Outcome of the grid search: the best-correlated weight vector plus
/// diagnostics reported to the user.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub weights: WeightVector,
    pub correlation: f64,
    pub candidates_tested: usize,
}

/// Enumerate the full Cartesian product of per-metric candidate values and
/// keep the vectors satisfying the sum constraint.
///
/// An empty result is a configuration error and is surfaced here, before any
/// optimization work runs.
pub fn build_grid(candidate_sets: &[Vec<f64>]) -> Result<Vec<WeightVector>, RankError> {
    let mut grid = Vec::new();
    let mut current = Vec::with_capacity(candidate_sets.len());
    expand(candidate_sets, &mut current, &mut grid);
    if grid.is_empty() {
        return Err(RankError::EmptyWeightGrid {
            tolerance: SUM_TOLERANCE,
        });
    }
    Ok(grid)
}

fn expand(sets: &[Vec<f64>], current: &mut Vec<f64>, out: &mut Vec<WeightVector>) {
    if sets.is_empty() {
        let sum: f64 = current.iter().sum();
        if (sum - 1.0).abs() < SUM_TOLERANCE {
            out.push(WeightVector {
                components: current.clone(),
            });
        }
        return;
    }
    for &value in &sets[0] {
        current.push(value);
        expand(&sets[1..], current, out);
        current.pop();
    }
}

/// Pearson correlation coefficient between two equal-length columns.
/// Returns 0.0 when either column has zero variance (undefined correlation).
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len() as f64;
    if xs.is_empty() {
        return 0.0;
    }
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    cov / denom
}

/// Composite score column for one weight vector: the weighted sum of each
/// player's normalized metrics. `columns` is metric-major and aligned with
/// the vector's components.
pub fn composite_column(columns: &[Vec<f64>], weights: &WeightVector) -> Vec<f64> {
    let population = columns.first().map_or(0, Vec::len);
    (0..population)
        .map(|i| {
            weights
                .components
                .iter()
                .zip(columns)
                .map(|(w, col)| w * col[i])
                .sum()
        })
        .collect()
}

/// Score every grid candidate by the Pearson correlation of its composite
/// column against the target column and select the maximum. Ties are broken
/// by first-encountered grid order, which keeps the search reproducible.
///
/// The search is a pure function of its inputs: the same population always
/// yields the same selected weights.
pub fn search(
    columns: &[Vec<f64>],
    target: &[f64],
    grid: &[WeightVector],
) -> Result<SearchOutcome, RankError> {
    let mut best: Option<(WeightVector, f64)> = None;
    for candidate in grid {
        let composite = composite_column(columns, candidate);
        let corr = pearson(&composite, target);
        match &best {
            Some((_, best_corr)) if corr <= *best_corr => {}
            _ => best = Some((candidate.clone(), corr)),
        }
    }
    let (weights, correlation) = best.ok_or(RankError::EmptyWeightGrid {
        tolerance: SUM_TOLERANCE,
    })?;
    Ok(SearchOutcome {
        weights,
        correlation,
        candidates_tested: grid.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
