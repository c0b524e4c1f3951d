// Fuzzy name matching between the free-agent list and the ranking table.
//
// The two sources spell players differently ("Nikola Jokić Jr." vs
// "nikola jokic"), so both sides are reduced to a normalized key before the
// join. The join is a total partition: every candidate lands in exactly one
// of matched or unmatched.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::ranking::RankedPlayer;
use crate::stats::IngestError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One row of the externally sourced free-agent list.
#[derive(Debug, Clone)]
pub struct AvailablePlayer {
    pub player_name: String,
    pub team_abbreviation: String,
    pub position: String,
}

/// A free agent joined with their ranking-table entry. Identity fields come
/// from the candidate row, performance fields from the ranking.
#[derive(Debug, Clone)]
pub struct MatchedPickup {
    pub player_name: String,
    pub team_abbreviation: String,
    pub position: String,
    pub rank_score: f64,
    pub percentile: f64,
    pub fantasy_points_per_min: f64,
    pub pct_minutes_played: f64,
    pub pct_games_played: f64,
}

/// Result of joining candidates against the ranking table.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matched: Vec<MatchedPickup>,
    pub unmatched: Vec<AvailablePlayer>,
    /// Normalized names that mapped to more than one ranking-table entry.
    /// The first entry won the join; the rest were shadowed.
    pub collisions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Name normalization
// ---------------------------------------------------------------------------

/// Reduce a display name to its join key: lowercase with diacritics folded
/// to ASCII, `.` and `'` stripped, `-` treated as a space, generational
/// suffixes removed, and whitespace collapsed. Idempotent.
pub fn normalize_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for c in name.chars() {
        for lc in c.to_lowercase() {
            match fold_diacritic(lc) {
                '.' | '\'' => {}
                '-' => cleaned.push(' '),
                other => cleaned.push(other),
            }
        }
    }
    // Removing one suffix can splice the surrounding text into another, so
    // the removal passes repeat until the name stops changing.
    let mut cleaned = collapse_whitespace(&cleaned);
    loop {
        let mut next = cleaned.clone();
        for suffix in [" jr", " sr", " ii", " iii", " iv"] {
            next = next.replace(suffix, "");
        }
        next = collapse_whitespace(&next);
        if next == cleaned {
            return cleaned;
        }
        cleaned = next;
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fold the accented Latin letters that appear in league rosters to their
/// ASCII base. Unrecognized characters pass through unchanged.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' | 'ĉ' => 'c',
        'ď' | 'đ' => 'd',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ğ' | 'ģ' => 'g',
        'í' | 'ì' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => 'i',
        'ķ' => 'k',
        'ł' | 'ĺ' | 'ļ' | 'ľ' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' | 'ŕ' => 'r',
        'š' | 'ś' | 'ş' | 'ș' => 's',
        'ť' | 'ţ' | 'ț' => 't',
        'ú' | 'ù' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ž' | 'ź' | 'ż' => 'z',
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Free-agent CSV loading
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[allow(dead_code, non_snake_case)]
struct RawAvailable {
    PLAYER_NAME: String,
    #[serde(default)]
    TEAM_ABBREVIATION: String,
    #[serde(default)]
    POSITION: String,
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

fn load_available_players_from_reader<R: Read>(
    rdr: R,
) -> Result<Vec<AvailablePlayer>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawAvailable>() {
        match result {
            Ok(raw) => {
                let name = raw.PLAYER_NAME.trim().to_string();
                if name.is_empty() {
                    warn!("skipping free-agent row with empty player name");
                    continue;
                }
                players.push(AvailablePlayer {
                    player_name: name,
                    team_abbreviation: raw.TEAM_ABBREVIATION.trim().to_string(),
                    position: raw.POSITION.trim().to_string(),
                });
            }
            Err(e) => {
                warn!("skipping malformed free-agent row: {}", e);
            }
        }
    }
    Ok(players)
}

/// Load the free-agent list. Unlike the season stats file, an empty list is
/// not an error; it simply yields no recommendations.
pub fn load_available_players(path: &Path) -> Result<Vec<AvailablePlayer>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_available_players_from_reader(file).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Join and recommendation
// ---------------------------------------------------------------------------

/// Left-join the free-agent list against the ranking table on normalized
/// name. Every candidate lands in exactly one of `matched` or `unmatched`.
/// When two table entries normalize to the same key, the first wins and the
/// key is recorded in `collisions`.
pub fn match_available(candidates: &[AvailablePlayer], table: &[RankedPlayer]) -> MatchOutcome {
    let mut by_key: HashMap<String, &RankedPlayer> = HashMap::with_capacity(table.len());
    let mut collisions = Vec::new();
    for ranked in table {
        let key = normalize_name(&ranked.player.player_name);
        match by_key.entry(key) {
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(ranked);
            }
            std::collections::hash_map::Entry::Occupied(slot) => {
                warn!(
                    "ranking names '{}' and '{}' collide on normalized key '{}'; keeping the first",
                    slot.get().player.player_name,
                    ranked.player.player_name,
                    slot.key()
                );
                if !collisions.contains(slot.key()) {
                    collisions.push(slot.key().clone());
                }
            }
        }
    }

    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    for candidate in candidates {
        match by_key.get(&normalize_name(&candidate.player_name)) {
            Some(ranked) => matched.push(MatchedPickup {
                player_name: candidate.player_name.clone(),
                team_abbreviation: candidate.team_abbreviation.clone(),
                position: candidate.position.clone(),
                rank_score: ranked.rank_score,
                percentile: ranked.percentile,
                fantasy_points_per_min: ranked.player.fantasy_points_per_min,
                pct_minutes_played: ranked.player.pct_minutes_played,
                pct_games_played: ranked.player.pct_games_played,
            }),
            None => unmatched.push(candidate.clone()),
        }
    }

    MatchOutcome {
        matched,
        unmatched,
        collisions,
    }
}

/// The top pickup targets: matched candidates sorted descending by
/// percentile, truncated to `top_n`.
pub fn recommend(matched: &[MatchedPickup], top_n: usize) -> Vec<MatchedPickup> {
    let mut picks = matched.to_vec();
    picks.sort_by(|a, b| {
        b.percentile
            .partial_cmp(&a.percentile)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    picks.truncate(top_n);
    picks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
