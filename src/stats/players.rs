// Player statistics engine.
//
// Builds the scoring leaderboard from Goal, Penalty and RosterAppearance
// rows. Players are keyed by extracted name; a player's team is fixed by
// the first event that attributes them. Games played is the size of a
// distinct game-ID set, never an incremented counter, so a player seen on
// both the roster sheet and the scoresheet of one game counts once.

use crate::events::{EventLog, EventType};
use crate::extract::{
    extract_assists, extract_penalized_player, extract_scorer, penalty_minutes,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStatRecord {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "GP")]
    pub gp: u32,
    #[serde(rename = "G")]
    pub g: u32,
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "Pts")]
    pub pts: u32,
    #[serde(rename = "PIM")]
    pub pim: u32,
    #[serde(rename = "PPG")]
    pub ppg: u32,
    #[serde(rename = "SHG")]
    pub shg: u32,
    #[serde(rename = "GWG")]
    pub gwg: u32,
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct PlayerAcc {
    team: String,
    games: BTreeSet<String>,
    g: u32,
    a: u32,
    pim: u32,
    ppg: u32,
    shg: u32,
    gwg: u32,
}

/// Compute the player leaderboard over the log. `gwg` is the resolved
/// set of (game ID, goal description) game-winners from the GWG engine.
///
/// Roster rows establish presence without stats; goal rows create scorers
/// and assisters on first sight; penalty rows only ever update players
/// already known, since the penalty grammar is too loose to trust for
/// identity creation.
pub fn compute_player_stats(
    log: &EventLog,
    gwg: &HashSet<(String, String)>,
) -> Vec<PlayerStatRecord> {
    let mut players: BTreeMap<String, PlayerAcc> = BTreeMap::new();

    let create = |players: &mut BTreeMap<String, PlayerAcc>, name: &str, team: &str| {
        players.entry(name.to_string()).or_insert_with(|| PlayerAcc {
            team: team.to_string(),
            ..PlayerAcc::default()
        });
    };

    // Roster appearances: presence only.
    for event in log.of_type(EventType::RosterAppearance) {
        let name = event.description.trim();
        if name.is_empty() {
            continue;
        }
        create(&mut players, name, &event.team);
        if let Some(acc) = players.get_mut(name) {
            acc.games.insert(event.game_id.clone());
        }
    }

    // Goals: scorer plus assists.
    for event in log.of_type(EventType::Goal) {
        if let Some(scorer) = extract_scorer(&event.description) {
            create(&mut players, &scorer, &event.team);
            if let Some(acc) = players.get_mut(&scorer) {
                acc.g += 1;
                acc.games.insert(event.game_id.clone());
                let strength = event.strength.to_uppercase();
                if strength.contains("PP") {
                    acc.ppg += 1;
                }
                if strength.contains("SH") {
                    acc.shg += 1;
                }
                if gwg.contains(&(event.game_id.clone(), event.description.clone())) {
                    acc.gwg += 1;
                }
            }
        }
        for assist in extract_assists(&event.description) {
            create(&mut players, &assist, &event.team);
            if let Some(acc) = players.get_mut(&assist) {
                acc.a += 1;
                acc.games.insert(event.game_id.clone());
            }
        }
    }

    // Penalties: update known players only.
    for event in log.of_type(EventType::Penalty) {
        let Some(name) = extract_penalized_player(&event.description) else {
            continue;
        };
        if let Some(acc) = players.get_mut(&name) {
            acc.pim += penalty_minutes(&event.description);
            acc.games.insert(event.game_id.clone());
        }
    }

    let mut rows: Vec<PlayerStatRecord> = players
        .into_iter()
        .map(|(player, acc)| PlayerStatRecord {
            player,
            team: acc.team,
            gp: acc.games.len() as u32,
            g: acc.g,
            a: acc.a,
            pts: acc.g + acc.a,
            pim: acc.pim,
            ppg: acc.ppg,
            shg: acc.shg,
            gwg: acc.gwg,
        })
        .collect();

    // Stable sort: equal-point players stay in alphabetical order.
    rows.sort_by(|a, b| b.pts.cmp(&a.pts));
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
