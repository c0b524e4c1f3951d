// Fractional percentile ranks over composite scores.

/// Fractional percentile rank (0, 100] for each score: ascending rank with
/// ties averaged, divided by the population size, times 100. A higher score
/// always receives a percentile at least as high; equal scores receive
/// identical percentiles; the maximum score receives 100.0 when untied.
pub fn percentile_ranks(scores: &[f64]) -> Vec<f64> {
    let n = scores.len();
    if n == 0 {
        return Vec::new();
    }

    let mut indexed: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    // Walk groups of equal scores and assign each the averaged 1-based rank.
    let mut percentiles = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + 1 + j + 1) as f64 / 2.0;
        for k in i..=j {
            percentiles[indexed[k].0] = 100.0 * avg_rank / n as f64;
        }
        i = j + 1;
    }
    percentiles
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

    #[test]
    fn distinct_scores_spread_evenly() {
        let p = percentile_ranks(&[0.1, 0.4, 0.2, 0.3]);
        assert!(approx_eq(p[0], 25.0, 1e-10));
        assert!(approx_eq(p[1], 100.0, 1e-10));
        assert!(approx_eq(p[2], 50.0, 1e-10));
        assert!(approx_eq(p[3], 75.0, 1e-10));
    }

    #[test]
    fn maximum_score_gets_highest_percentile() {
        let scores = vec![0.31, 0.87, 0.52, 0.11, 0.74];
        let p = percentile_ranks(&scores);
        let max_idx = 1;
        for (i, pct) in p.iter().enumerate() {
            assert!(*pct <= p[max_idx], "index {i} beat the max score");
        }
        assert!(approx_eq(p[max_idx], 100.0, 1e-10));
    }

    #[test]
    fn ties_receive_identical_averaged_percentile() {
        let p = percentile_ranks(&[0.5, 0.5, 0.9, 0.1]);
        // Ranks: 0.1 -> 1, the two 0.5s share (2+3)/2 = 2.5, 0.9 -> 4.
        assert!(approx_eq(p[0], 62.5, 1e-10));
        assert!(approx_eq(p[1], 62.5, 1e-10));
        assert!(approx_eq(p[2], 100.0, 1e-10));
        assert!(approx_eq(p[3], 25.0, 1e-10));
    }

    #[test]
    fn monotonic_in_score() {
        let scores = vec![0.44, 0.12, 0.98, 0.44, 0.7, 0.01, 0.12];
        let p = percentile_ranks(&scores);
        for i in 0..scores.len() {
            for j in 0..scores.len() {
                if scores[i] > scores[j] {
                    assert!(p[i] >= p[j]);
                }
                if scores[i] == scores[j] {
                    assert!(approx_eq(p[i], p[j], 1e-12));
                }
            }
        }
    }

    #[test]
    fn percentiles_lie_in_half_open_range() {
        let p = percentile_ranks(&[0.0, 0.0, 0.0, 1.0]);
        for pct in &p {
            assert!(*pct > 0.0 && *pct <= 100.0);
        }
    }

    #[test]
    fn single_player_gets_one_hundred() {
        let p = percentile_ranks(&[0.42]);
        assert!(approx_eq(p[0], 100.0, 1e-10));
    }

    #[test]
    fn empty_population() {
        assert!(percentile_ranks(&[]).is_empty());
    }
}
