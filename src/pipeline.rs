// End-to-end run: ingest, rank, write, and optionally match free agents.

use anyhow::Context;
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::matcher;
use crate::ranking;
use crate::report;
use crate::stats;

/// What a run produced, for logging and for the binary's exit summary.
#[derive(Debug)]
pub struct RunSummary {
    pub ranked_players: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub recommended: usize,
}

/// Execute the full pipeline described by the config. The matching stage
/// runs only when an available-players file is configured; the ranking
/// output is written either way.
pub fn run(config: &Config) -> anyhow::Result<RunSummary> {
    let stats_path = Path::new(&config.data_paths.season_stats);
    let mut lines = stats::load_season_lines(stats_path, config.league.season_game_count)
        .with_context(|| format!("loading season stats from {}", stats_path.display()))?;
    info!("loaded {} season stat lines", lines.len());

    if !config.league.seasons.is_empty() {
        lines.retain(|l| config.league.seasons.contains(&l.season));
        if lines.is_empty() {
            anyhow::bail!(
                "no stat lines remain for configured seasons {:?}",
                config.league.seasons
            );
        }
        info!(
            "{} stat lines remain for seasons {:?}",
            lines.len(),
            config.league.seasons
        );
    }

    let outcome = ranking::rank_players(&lines, &config.filters, &config.metrics)
        .context("ranking players")?;
    log_diagnostics(&outcome.diagnostics);

    let rankings_path = Path::new(&config.output_paths.rankings);
    report::write_rankings(rankings_path, &outcome.players)
        .with_context(|| format!("writing rankings to {}", rankings_path.display()))?;
    info!(
        "wrote {} ranked players to {}",
        outcome.players.len(),
        rankings_path.display()
    );
    log_top_players(&outcome.players);

    let mut summary = RunSummary {
        ranked_players: outcome.players.len(),
        matched: 0,
        unmatched: 0,
        recommended: 0,
    };

    let Some(candidates_path) = &config.data_paths.available_players else {
        info!("no available-players file configured; skipping the matching stage");
        return Ok(summary);
    };

    let candidates_path = Path::new(candidates_path);
    let candidates = matcher::load_available_players(candidates_path)
        .with_context(|| format!("loading free agents from {}", candidates_path.display()))?;
    info!("loaded {} free-agent candidates", candidates.len());

    let match_outcome = matcher::match_available(&candidates, &outcome.players);
    info!(
        "matched {} of {} candidates ({} unmatched)",
        match_outcome.matched.len(),
        candidates.len(),
        match_outcome.unmatched.len()
    );
    if !match_outcome.collisions.is_empty() {
        warn!(
            "{} normalized-name collisions in the ranking table: {:?}",
            match_outcome.collisions.len(),
            match_outcome.collisions
        );
    }

    let picks = matcher::recommend(&match_outcome.matched, config.recommend.top_n);
    for (i, pick) in picks.iter().enumerate() {
        info!(
            "pickup #{}: {} ({}) percentile {:.1}",
            i + 1,
            pick.player_name,
            if pick.position.is_empty() { "?" } else { pick.position.as_str() },
            pick.percentile
        );
    }

    let recs_path = Path::new(&config.output_paths.recommendations);
    report::write_recommendations(recs_path, &picks)
        .with_context(|| format!("writing recommendations to {}", recs_path.display()))?;

    let unmatched_path = Path::new(&config.output_paths.unmatched);
    report::write_unmatched(unmatched_path, &match_outcome.unmatched)
        .with_context(|| format!("writing unmatched players to {}", unmatched_path.display()))?;

    summary.matched = match_outcome.matched.len();
    summary.unmatched = match_outcome.unmatched.len();
    summary.recommended = picks.len();
    Ok(summary)
}

fn log_diagnostics(diagnostics: &ranking::RankingDiagnostics) {
    info!("ranking population: {} players", diagnostics.population);
    for (metric, corr) in &diagnostics.metric_correlations {
        info!(
            "correlation of {} with total fantasy points: {:.4}",
            metric.label(),
            corr
        );
    }
    let weights: Vec<String> = diagnostics
        .selected_weights
        .iter()
        .map(|(m, w)| format!("{}={w}", m.label()))
        .collect();
    info!(
        "selected weights [{}] with correlation {:.4} ({} candidates tested)",
        weights.join(", "),
        diagnostics.best_correlation,
        diagnostics.candidates_tested
    );
}

fn log_top_players(players: &[ranking::RankedPlayer]) {
    for (i, ranked) in players.iter().take(15).enumerate() {
        info!(
            "#{:<2} {} ({}) score {:.3} percentile {:.1}",
            i + 1,
            ranked.player.player_name,
            ranked.player.team_abbreviation,
            ranked.rank_score,
            ranked.percentile
        );
    }
}
