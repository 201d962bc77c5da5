// Game-winning-goal resolution.
//
// The GWG is the goal that put the winner past the loser's final total:
// with the loser finishing on N, the winner's (N+1)-th goal in game
// chronology. Ties have no GWG. The result is keyed by (game ID, full
// goal description) so the player engine can credit scorers by matching
// the exact Goal row it is already processing.

use crate::events::{EventLog, EventType, GameEvent};
use crate::extract::{clock_seconds, period_ordinal};
use crate::stats::standings::final_score_pairs;
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::debug;

/// Resolve the game-winning goal for every decided game in the log.
///
/// Goals are ordered by period, then by countdown clock (a larger clock
/// value is earlier in the period). Games where the winner's recorded
/// goal rows fall short of the final score produce no entry: crediting
/// the wrong scorer is worse than crediting nobody.
pub fn resolve_gwg(log: &EventLog) -> HashSet<(String, String)> {
    let scores = final_score_pairs(log, None);
    if scores.reconstructed {
        debug!("resolving game-winning goals against reconstructed scores");
    }

    let mut winners = HashSet::new();
    let mut short = 0usize;
    for (game_id, [(team_a, score_a), (team_b, score_b)]) in &scores.games {
        if score_a == score_b {
            continue;
        }
        let (winner, loser_final) = if score_a > score_b {
            (team_a, *score_b)
        } else {
            (team_b, *score_a)
        };

        let mut goals: Vec<&GameEvent> = log
            .of_type(EventType::Goal)
            .filter(|e| &e.game_id == game_id && &e.team == winner)
            .collect();
        // Stable sort: goals with equal period and clock keep log order.
        goals.sort_by_key(|e| (period_ordinal(&e.period), Reverse(clock_seconds(&e.time))));

        match goals.get(loser_final as usize) {
            Some(goal) => {
                winners.insert((game_id.clone(), goal.description.clone()));
            }
            None => short += 1,
        }
    }
    if short > 0 {
        debug!("{short} decided games had fewer winner goal rows than the final score");
    }

    winners
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
