// Playoff engine: race-to-three series tracking and the playoff-specific
// standings sort.
//
// Playoff pairings are order-agnostic: the same two teams meeting with
// home and away swapped is still one series, keyed by the lexicographic
// team pair. Series points use the league formula (2 per win, 1 per tie);
// first side to three points advances.

use crate::events::EventLog;
use crate::schedule::Schedule;
use crate::stats::standings::{accumulate, final_score_pairs, TeamStandingRecord};
use serde::Serialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One playoff series, teams in lexicographic order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayoffSeriesRecord {
    #[serde(rename = "Pairing")]
    pub pairing: String,
    #[serde(rename = "Team A")]
    pub team_a: String,
    #[serde(rename = "Points A")]
    pub pts_a: u32,
    #[serde(rename = "Team B")]
    pub team_b: String,
    #[serde(rename = "Points B")]
    pub pts_b: u32,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute the ranked playoff standings and per-series points over the
/// playoff slice of the schedule.
///
/// Playoff ranking differs from the regular season: points, then goal
/// differential, then goals for, then fewest penalty minutes.
pub fn compute_playoff_series(
    log: &EventLog,
    playoff_schedule: &Schedule,
) -> (Vec<TeamStandingRecord>, Vec<PlayoffSeriesRecord>) {
    let mut ranked = accumulate(log, Some(playoff_schedule));
    ranked.sort_by(|a, b| {
        (b.pts, b.diff, b.gf)
            .cmp(&(a.pts, a.diff, a.gf))
            .then(a.pim.cmp(&b.pim))
    });
    for (i, row) in ranked.iter_mut().enumerate() {
        row.rank = (i + 1) as u32;
    }

    let ids = playoff_schedule.game_ids();
    let scores = final_score_pairs(log, Some(&ids));

    let mut series: BTreeMap<(String, String), (u32, u32)> = BTreeMap::new();
    for [(team_a, score_a), (team_b, score_b)] in scores.games.values() {
        let (first, second, first_score, second_score) = if team_a <= team_b {
            (team_a, team_b, score_a, score_b)
        } else {
            (team_b, team_a, score_b, score_a)
        };
        let entry = series
            .entry((first.clone(), second.clone()))
            .or_insert((0, 0));
        match first_score.cmp(second_score) {
            std::cmp::Ordering::Greater => entry.0 += 2,
            std::cmp::Ordering::Less => entry.1 += 2,
            std::cmp::Ordering::Equal => {
                entry.0 += 1;
                entry.1 += 1;
            }
        }
    }

    let rows = series
        .into_iter()
        .map(|((team_a, team_b), (pts_a, pts_b))| PlayoffSeriesRecord {
            pairing: format!("{team_a} vs {team_b}"),
            team_a,
            pts_a,
            team_b,
            pts_b,
        })
        .collect();

    (ranked, rows)
}

/// The best-ranked team currently trailing its series. Series level on
/// points have no trailing side and are skipped. None when no series has
/// a trailing team.
pub fn lucky_loser<'a>(
    ranked: &'a [TeamStandingRecord],
    series: &[PlayoffSeriesRecord],
) -> Option<&'a str> {
    let mut best: Option<&TeamStandingRecord> = None;
    for s in series {
        let loser = match s.pts_a.cmp(&s.pts_b) {
            std::cmp::Ordering::Less => &s.team_a,
            std::cmp::Ordering::Greater => &s.team_b,
            std::cmp::Ordering::Equal => continue,
        };
        let Some(row) = ranked.iter().find(|r| &r.team == loser) else {
            continue;
        };
        if best.map_or(true, |b| row.rank < b.rank) {
            best = Some(row);
        }
    }
    best.map(|r| r.team.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventType, GameEvent};

    fn final_score(game_id: &str, team: &str, score: &str) -> GameEvent {
        GameEvent {
            game_id: game_id.into(),
            event_type: EventType::PeriodScore,
            team: team.into(),
            description: score.into(),
            strength: String::new(),
            period: "Final".into(),
            time: "N/A".into(),
        }
    }

    fn penalty(game_id: &str, team: &str, desc: &str) -> GameEvent {
        GameEvent {
            game_id: game_id.into(),
            event_type: EventType::Penalty,
            team: team.into(),
            description: desc.into(),
            strength: String::new(),
            period: "1st".into(),
            time: "10:00".into(),
        }
    }

    fn playoff_schedule(games: &[(&str, &str, &str)]) -> Schedule {
        let mut csv_data = String::from("GameID,Home,Away,GameType\n");
        for (gid, home, away) in games {
            csv_data.push_str(&format!("{gid},{home},{away},Playoffs\n"));
        }
        Schedule::from_reader(csv_data.as_bytes()).unwrap()
    }

    #[test]
    fn home_away_swap_is_one_series() {
        let schedule = playoff_schedule(&[("p1", "A", "B"), ("p2", "B", "A")]);
        let log = EventLog::new(vec![
            final_score("p1", "A", "3"),
            final_score("p1", "B", "1"),
            final_score("p2", "B", "2"),
            final_score("p2", "A", "4"),
        ]);
        let (_, series) = compute_playoff_series(&log, &schedule);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].pairing, "A vs B");
        assert_eq!((series[0].pts_a, series[0].pts_b), (4, 0));
    }

    #[test]
    fn race_to_three_points_with_tie() {
        // A: win (2) + tie (1) = 3 points, series clinched.
        let schedule = playoff_schedule(&[("p1", "A", "B"), ("p2", "A", "B")]);
        let log = EventLog::new(vec![
            final_score("p1", "A", "3"),
            final_score("p1", "B", "1"),
            final_score("p2", "A", "2"),
            final_score("p2", "B", "2"),
        ]);
        let (_, series) = compute_playoff_series(&log, &schedule);
        assert_eq!((series[0].pts_a, series[0].pts_b), (3, 1));
    }

    #[test]
    fn playoff_ranking_breaks_full_tie_on_fewest_pim() {
        // A and B beat different opponents by identical scores; only their
        // penalty minutes differ.
        let schedule = playoff_schedule(&[
            ("p1", "A", "X"),
            ("p2", "B", "Y"),
        ]);
        let log = EventLog::new(vec![
            final_score("p1", "A", "3"),
            final_score("p1", "X", "1"),
            final_score("p2", "B", "3"),
            final_score("p2", "Y", "1"),
            penalty("p1", "A", "#4 Mac Savage: Major - fighting"),
            penalty("p2", "B", "#9 Adam Miller: Minor - tripping"),
        ]);
        let (ranked, _) = compute_playoff_series(&log, &schedule);
        let rank_of = |team: &str| ranked.iter().find(|r| r.team == team).unwrap().rank;
        assert!(rank_of("B") < rank_of("A"), "fewer PIM ranks first");
    }

    #[test]
    fn series_sorted_by_pairing_key() {
        let schedule = playoff_schedule(&[("p1", "C", "D"), ("p2", "A", "B")]);
        let log = EventLog::new(vec![
            final_score("p1", "C", "2"),
            final_score("p1", "D", "1"),
            final_score("p2", "A", "2"),
            final_score("p2", "B", "1"),
        ]);
        let (_, series) = compute_playoff_series(&log, &schedule);
        assert_eq!(series[0].pairing, "A vs B");
        assert_eq!(series[1].pairing, "C vs D");
    }

    #[test]
    fn lucky_loser_is_best_ranked_trailing_team() {
        let schedule = playoff_schedule(&[("p1", "A", "B"), ("p2", "C", "D")]);
        let log = EventLog::new(vec![
            // B loses big, D loses narrowly: D outranks B on differential.
            final_score("p1", "A", "5"),
            final_score("p1", "B", "0"),
            final_score("p2", "C", "2"),
            final_score("p2", "D", "1"),
        ]);
        let (ranked, series) = compute_playoff_series(&log, &schedule);
        assert_eq!(lucky_loser(&ranked, &series), Some("D"));
    }

    #[test]
    fn level_series_has_no_loser() {
        let schedule = playoff_schedule(&[("p1", "A", "B")]);
        let log = EventLog::new(vec![
            final_score("p1", "A", "2"),
            final_score("p1", "B", "2"),
        ]);
        let (ranked, series) = compute_playoff_series(&log, &schedule);
        assert_eq!(lucky_loser(&ranked, &series), None);
    }

    #[test]
    fn regular_season_games_excluded_from_series() {
        let schedule = playoff_schedule(&[("p1", "A", "B")]);
        let log = EventLog::new(vec![
            final_score("p1", "A", "3"),
            final_score("p1", "B", "1"),
            // g9 is not in the playoff schedule at all.
            final_score("g9", "A", "0"),
            final_score("g9", "B", "7"),
        ]);
        let (ranked, series) = compute_playoff_series(&log, &schedule);
        assert_eq!((series[0].pts_a, series[0].pts_b), (2, 0));
        let a = ranked.iter().find(|r| r.team == "A").unwrap();
        assert_eq!(a.gp, 1);
    }
}
