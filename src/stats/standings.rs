// Standings engine: reconstructs ranked team records from final-score rows.
//
// Works chronologically (game IDs are assigned monotonically upstream) so
// last-10 windows and streaks come out right, and applies the league's
// official four-key tie-break. All accumulators are BTreeMap-keyed: the
// same log always produces byte-identical output.

use crate::events::{EventLog, EventType};
use crate::extract::{parse_integer, penalty_minutes};
use crate::schedule::Schedule;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Points awarded per game outcome.
const WIN_POINTS: u32 = 2;
const TIE_POINTS: u32 = 1;

/// Window length for the recent-form column.
const FORM_WINDOW: usize = 10;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One ranked standings row. Column names in serialized output match the
/// league's published tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStandingRecord {
    #[serde(rename = "Rank")]
    pub rank: u32,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Games Played")]
    pub gp: u32,
    #[serde(rename = "Wins")]
    pub w: u32,
    #[serde(rename = "Losses")]
    pub l: u32,
    #[serde(rename = "Ties")]
    pub t: u32,
    #[serde(rename = "Points")]
    pub pts: u32,
    #[serde(rename = "Win Percentage")]
    pub win_pct: f64,
    #[serde(rename = "Goals For")]
    pub gf: u32,
    #[serde(rename = "Goals Against")]
    pub ga: u32,
    #[serde(rename = "Goal Differential")]
    pub diff: i32,
    #[serde(rename = "Penalty Minutes")]
    pub pim: u32,
    #[serde(rename = "Last 10")]
    pub last10: String,
    #[serde(rename = "Streak")]
    pub streak: String,
}

// ---------------------------------------------------------------------------
// Final-score pairing (shared with the GWG and efficiency engines)
// ---------------------------------------------------------------------------

/// Per-game final scores: game ID -> the two (team, score) sides in
/// first-appearance order.
pub(crate) type GameScores = BTreeMap<String, [(String, u32); 2]>;

/// Final scores per game, validated to exactly two distinct teams.
pub(crate) struct FinalScores {
    pub games: GameScores,
    /// True when no official final rows existed and scores were
    /// reconstructed by counting goal events.
    pub reconstructed: bool,
}

/// Collect `Final` period-score rows into per-game score pairs, optionally
/// restricted to a game-ID subset. When the log carries no final rows at
/// all, falls back to counting `Goal` rows per team, which degrades the
/// output to best-effort and is flagged.
pub(crate) fn final_score_pairs(log: &EventLog, subset: Option<&BTreeSet<String>>) -> FinalScores {
    let in_subset = |game_id: &str| subset.map_or(true, |ids| ids.contains(game_id));

    let mut raw: BTreeMap<String, Vec<(String, u32)>> = BTreeMap::new();
    for event in log.of_type(EventType::PeriodScore) {
        if event.period != "Final" || !in_subset(&event.game_id) {
            continue;
        }
        raw.entry(event.game_id.clone())
            .or_default()
            .push((event.team.clone(), parse_integer(&event.description)));
    }

    let mut reconstructed = false;
    if raw.is_empty() {
        warn!("no official final-score rows found; reconstructing scores from goal counts");
        reconstructed = true;
        let mut counts: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();
        let mut order: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for event in log.of_type(EventType::Goal) {
            if !in_subset(&event.game_id) {
                continue;
            }
            let game = counts.entry(event.game_id.clone()).or_default();
            if !game.contains_key(&event.team) {
                order
                    .entry(event.game_id.clone())
                    .or_default()
                    .push(event.team.clone());
            }
            *game.entry(event.team.clone()).or_insert(0) += 1;
        }
        for (game_id, teams) in order {
            let counts = &counts[&game_id];
            let sides = teams
                .into_iter()
                .map(|t| {
                    let score = counts[&t];
                    (t, score)
                })
                .collect();
            raw.insert(game_id, sides);
        }
    }

    let mut games = GameScores::new();
    let mut skipped = 0usize;
    for (game_id, rows) in raw {
        // First row per distinct team; a valid game has exactly two sides.
        let mut sides: Vec<(String, u32)> = Vec::new();
        for (team, score) in rows {
            if !sides.iter().any(|(t, _)| *t == team) {
                sides.push((team, score));
            }
        }
        if sides.len() != 2 {
            skipped += 1;
            continue;
        }
        let mut iter = sides.into_iter();
        let (a, b) = (iter.next(), iter.next());
        if let (Some(a), Some(b)) = (a, b) {
            games.insert(game_id, [a, b]);
        }
    }
    if skipped > 0 {
        debug!("skipped {skipped} games without exactly two scored sides");
    }

    FinalScores {
        games,
        reconstructed,
    }
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct TeamAcc {
    gp: u32,
    w: u32,
    l: u32,
    t: u32,
    pts: u32,
    gf: u32,
    ga: u32,
    pim: u32,
    history: Vec<char>,
}

/// Accumulate unranked standings rows over the (optionally subset-restricted)
/// event log. Rows come back in alphabetical team order with `rank` unset;
/// callers apply their own sort and ranking.
pub(crate) fn accumulate(log: &EventLog, subset: Option<&Schedule>) -> Vec<TeamStandingRecord> {
    let subset_ids = subset.map(|s| s.game_ids());
    let scores = final_score_pairs(log, subset_ids.as_ref());

    let mut teams: BTreeMap<String, TeamAcc> = BTreeMap::new();

    // Teams in the subset universe exist even before their first valid game.
    if let Some(schedule) = subset {
        for team in schedule.team_universe() {
            teams.entry(team).or_default();
        }
    }

    // BTreeMap iteration gives ascending game IDs, the chronological order
    // streaks and last-10 windows depend on.
    for sides in scores.games.values() {
        let [(team_a, score_a), (team_b, score_b)] = sides;
        for team in [team_a, team_b] {
            teams.entry(team.clone()).or_default();
        }

        let apply = |acc: &mut TeamAcc, gf: u32, ga: u32| {
            acc.gp += 1;
            acc.gf += gf;
            acc.ga += ga;
            match gf.cmp(&ga) {
                std::cmp::Ordering::Greater => {
                    acc.w += 1;
                    acc.pts += WIN_POINTS;
                    acc.history.push('W');
                }
                std::cmp::Ordering::Less => {
                    acc.l += 1;
                    acc.history.push('L');
                }
                std::cmp::Ordering::Equal => {
                    acc.t += 1;
                    acc.pts += TIE_POINTS;
                    acc.history.push('T');
                }
            }
        };
        if let Some(acc) = teams.get_mut(team_a) {
            apply(acc, *score_a, *score_b);
        }
        if let Some(acc) = teams.get_mut(team_b) {
            apply(acc, *score_b, *score_a);
        }
    }

    // Penalty minutes for known teams, over in-subset events.
    for event in log.of_type(EventType::Penalty) {
        if let Some(ids) = subset_ids.as_ref() {
            if !ids.contains(&event.game_id) {
                continue;
            }
        }
        if let Some(acc) = teams.get_mut(&event.team) {
            acc.pim += penalty_minutes(&event.description);
        }
    }

    teams
        .into_iter()
        .map(|(team, acc)| {
            let win_pct = if acc.gp == 0 {
                0.0
            } else {
                round3(acc.pts as f64 / (acc.gp * 2) as f64)
            };
            TeamStandingRecord {
                rank: 0,
                team,
                gp: acc.gp,
                w: acc.w,
                l: acc.l,
                t: acc.t,
                pts: acc.pts,
                win_pct,
                gf: acc.gf,
                ga: acc.ga,
                diff: acc.gf as i32 - acc.ga as i32,
                pim: acc.pim,
                last10: format_last10(&acc.history),
                streak: format_streak(&acc.history),
            }
        })
        .collect()
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// "W-L-T" counts over the final entries of the result history.
fn format_last10(history: &[char]) -> String {
    let start = history.len().saturating_sub(FORM_WINDOW);
    let recent = &history[start..];
    let count = |r: char| recent.iter().filter(|&&c| c == r).count();
    format!("{}-{}-{}", count('W'), count('L'), count('T'))
}

/// Trailing run of identical results, e.g. "W3". "-" with no games.
fn format_streak(history: &[char]) -> String {
    match history.last() {
        None => "-".to_string(),
        Some(&latest) => {
            let run = history.iter().rev().take_while(|&&c| c == latest).count();
            format!("{latest}{run}")
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Compute ranked standings over the event log, optionally restricted to a
/// schedule subset. Sort order is the league's official tie-break:
/// points, then wins, then goal differential, then goals for.
pub fn compute_standings(log: &EventLog, subset: Option<&Schedule>) -> Vec<TeamStandingRecord> {
    let mut rows = accumulate(log, subset);
    rows.sort_by(|a, b| (b.pts, b.w, b.diff, b.gf).cmp(&(a.pts, a.w, a.diff, a.gf)));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = (i + 1) as u32;
    }
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
