// Special-teams efficiency: scoring rate, power-play and penalty-kill
// percentages per team. A thin consumer of the standings output that
// re-traverses the log once for goals and once for penalties.

use crate::events::{EventLog, EventType};
use crate::stats::standings::{final_score_pairs, TeamStandingRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Efficiency row for one team, in the same order as the standings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamEfficiency {
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "GF/GP")]
    pub goals_for_avg: f64,
    #[serde(rename = "PP%")]
    pub pp_pct: f64,
    #[serde(rename = "PK%")]
    pub pk_pct: f64,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute per-team efficiency metrics.
///
/// PP% is power-play goals scored over opponent penalties taken in the
/// team's games; PK% is the share of the team's own penalties that did
/// not turn into a power-play goal against. Zero denominators yield 0.0
/// rather than dividing.
pub fn compute_efficiency(
    log: &EventLog,
    standings: &[TeamStandingRecord],
) -> Vec<TeamEfficiency> {
    // Which games each team took part in, per the validated score pairs.
    let scores = final_score_pairs(log, None);
    let mut team_games: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (game_id, sides) in &scores.games {
        for (team, _) in sides {
            team_games
                .entry(team.clone())
                .or_default()
                .insert(game_id.clone());
        }
    }

    let empty = BTreeSet::new();

    standings
        .iter()
        .map(|row| {
            let games = team_games.get(&row.team).unwrap_or(&empty);

            let mut pp_goals_for = 0u32;
            let mut pp_goals_against = 0u32;
            for event in log.of_type(EventType::Goal) {
                if !event.strength.to_uppercase().contains("PP") {
                    continue;
                }
                if event.team == row.team {
                    pp_goals_for += 1;
                } else if games.contains(&event.game_id) {
                    pp_goals_against += 1;
                }
            }

            let mut penalties_taken = 0u32;
            let mut opponent_penalties = 0u32;
            for event in log.of_type(EventType::Penalty) {
                if event.team == row.team {
                    penalties_taken += 1;
                } else if games.contains(&event.game_id) {
                    opponent_penalties += 1;
                }
            }

            let goals_for_avg = if row.gp == 0 {
                0.0
            } else {
                round2(row.gf as f64 / row.gp as f64)
            };
            let pp_pct = if opponent_penalties == 0 {
                0.0
            } else {
                round1(100.0 * pp_goals_for as f64 / opponent_penalties as f64)
            };
            let pk_pct = if penalties_taken == 0 {
                0.0
            } else {
                round1(
                    100.0 * (penalties_taken.saturating_sub(pp_goals_against)) as f64
                        / penalties_taken as f64,
                )
            };

            TeamEfficiency {
                team: row.team.clone(),
                goals_for_avg,
                pp_pct,
                pk_pct,
            }
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
