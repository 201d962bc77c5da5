// Event log model: the canonical in-memory form of all scraped game events.
//
// Reads the scraper's game_details.csv. Team identity is normalized exactly
// once, at load. Missing optional columns are backfilled with sentinels so
// upstream schema drift degrades gracefully instead of aborting.

use crate::extract::normalize_team;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Sentinel used where the scraper has no value for a field.
pub const SENTINEL: &str = "N/A";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Kind of event recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PeriodScore,
    Goal,
    Penalty,
    RosterAppearance,
    Official,
}

impl EventType {
    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "PeriodScore" => Some(EventType::PeriodScore),
            "Goal" => Some(EventType::Goal),
            "Penalty" => Some(EventType::Penalty),
            "RosterAppearance" => Some(EventType::RosterAppearance),
            "Official" => Some(EventType::Official),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PeriodScore => "PeriodScore",
            EventType::Goal => "Goal",
            EventType::Penalty => "Penalty",
            EventType::RosterAppearance => "RosterAppearance",
            EventType::Official => "Official",
        }
    }
}

/// One row of the event log.
///
/// `game_id` stays an opaque string: some IDs carry non-numeric leading
/// characters, so it must never be reinterpreted numerically.
#[derive(Debug, Clone)]
pub struct GameEvent {
    pub game_id: String,
    pub event_type: EventType,
    pub team: String,
    pub description: String,
    pub strength: String,
    pub period: String,
    pub time: String,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to read event log {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Raw event row as written by the scraper. Optional columns default so a
/// drifted schema still deserializes; the extra-column map absorbs fields
/// the engine does not consume (e.g. ScrapedAt).
#[derive(Debug, Deserialize)]
struct RawEventRow {
    #[serde(rename = "GameID")]
    game_id: String,
    #[serde(rename = "EventType")]
    event_type: String,
    #[serde(rename = "Team", default)]
    team: Option<String>,
    #[serde(rename = "Description", default)]
    description: Option<String>,
    #[serde(rename = "Strength", default)]
    strength: Option<String>,
    #[serde(rename = "Period", default)]
    period: Option<String>,
    #[serde(rename = "Time", default)]
    time: Option<String>,
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// The full event log with team identity already normalized.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    /// Build a log from already-structured events, applying team
    /// normalization. Normalization is idempotent, so re-wrapping an
    /// existing log's events is harmless.
    pub fn new(mut events: Vec<GameEvent>) -> Self {
        for event in &mut events {
            event.team = if event.team.trim().is_empty() {
                "Unknown".to_string()
            } else {
                normalize_team(&event.team)
            };
        }
        EventLog { events }
    }

    /// Load the event log from a CSV file. Fails only when the source is
    /// missing/unreadable or its header lacks the required key columns.
    pub fn load(path: &Path) -> Result<Self, LogError> {
        let file = std::fs::File::open(path).map_err(|e| LogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(file).map_err(|e| match e {
            LogError::Csv { source, .. } => LogError::Csv {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Load from any reader. Public so tests and callers can feed in-memory
    /// CSV without temp files.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, LogError> {
        let mut reader = csv::Reader::from_reader(rdr);

        let headers = reader
            .headers()
            .map_err(|e| LogError::Csv {
                path: "<reader>".to_string(),
                source: e,
            })?
            .clone();
        let has = |name: &str| headers.iter().any(|h| h == name);

        for required in ["GameID", "EventType"] {
            if !has(required) {
                return Err(LogError::Validation(format!(
                    "event log is missing required column `{required}`"
                )));
            }
        }
        for optional in ["Team", "Description", "Strength", "Period", "Time"] {
            if !has(optional) {
                warn!("event log is missing column `{optional}`; backfilling `{SENTINEL}`");
            }
        }

        let mut events = Vec::new();
        let mut malformed = 0usize;
        let mut unknown_types = 0usize;

        for result in reader.deserialize::<RawEventRow>() {
            let raw = match result {
                Ok(raw) => raw,
                Err(_) => {
                    malformed += 1;
                    continue;
                }
            };
            let Some(event_type) = EventType::parse(&raw.event_type) else {
                unknown_types += 1;
                continue;
            };
            events.push(GameEvent {
                game_id: raw.game_id.trim().to_string(),
                event_type,
                team: raw.team.unwrap_or_else(|| SENTINEL.to_string()),
                description: raw.description.unwrap_or_default().trim().to_string(),
                strength: raw.strength.unwrap_or_default().trim().to_string(),
                period: raw.period.unwrap_or_else(|| SENTINEL.to_string()),
                time: raw.time.unwrap_or_else(|| SENTINEL.to_string()),
            });
        }

        if malformed > 0 {
            warn!("skipped {malformed} malformed event rows");
        }
        if unknown_types > 0 {
            warn!("skipped {unknown_types} rows with unrecognized EventType");
        }

        Ok(EventLog::new(events))
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of one type, in log order.
    pub fn of_type(&self, event_type: EventType) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().filter(move |e| e.event_type == event_type)
    }

    /// Events restricted to a set of game IDs.
    pub fn in_games<'a>(
        &'a self,
        ids: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a GameEvent> {
        self.events.iter().filter(move |e| ids.contains(&e.game_id))
    }

    /// Events attributed to one (normalized) team.
    pub fn for_team<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a GameEvent> {
        self.events.iter().filter(move |e| e.team == team)
    }

    /// Official assignments grouped per game, in log order.
    pub fn officials_by_game(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for event in self.of_type(EventType::Official) {
            map.entry(event.game_id.clone())
                .or_default()
                .push(event.description.clone());
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HEADER: &str = "GameID,EventType,Team,Description,Strength,ScrapedAt,Period,Time";

    #[test]
    fn load_full_schema() {
        let csv_data = format!(
            "{FULL_HEADER}\n\
             951234,PeriodScore,MUFFIN MEN,3,,2026-01-10,Final,N/A\n\
             951234,Goal,muffin men,#4 Mac Savage (#7 Conor Pang),PP,2026-01-10,2nd,10:41\n\
             951234,Official,N/A,Referee: Evan Benwell,,2026-01-10,N/A,N/A"
        );

        let log = EventLog::from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(log.len(), 3);

        // Both spellings of the team collapse to one normalized identity.
        assert_eq!(log.events()[0].team, "Muffin Men");
        assert_eq!(log.events()[1].team, "Muffin Men");
        assert_eq!(log.events()[0].event_type, EventType::PeriodScore);
        assert_eq!(log.events()[1].strength, "PP");
        assert_eq!(log.events()[2].team, "N/A");
    }

    #[test]
    fn missing_optional_column_backfilled() {
        // No Strength, Period or Time columns at all.
        let csv_data = "\
GameID,EventType,Team,Description
951234,Goal,Muffin Men,#4 Mac Savage";

        let log = EventLog::from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].strength, "");
        assert_eq!(log.events()[0].period, SENTINEL);
        assert_eq!(log.events()[0].time, SENTINEL);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let csv_data = "\
EventType,Team,Description
Goal,Muffin Men,#4 Mac Savage";

        let err = EventLog::from_reader(csv_data.as_bytes()).unwrap_err();
        match err {
            LogError::Validation(msg) => assert!(msg.contains("GameID")),
            other => panic!("expected Validation, got: {other}"),
        }
    }

    #[test]
    fn unknown_event_type_skipped() {
        let csv_data = format!(
            "{FULL_HEADER}\n\
             951234,Goal,Muffin Men,#4 Mac Savage,,2026-01-10,2nd,10:41\n\
             951234,Timeout,Muffin Men,bench timeout,,2026-01-10,2nd,09:00"
        );

        let log = EventLog::from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].event_type, EventType::Goal);
    }

    #[test]
    fn empty_team_becomes_unknown() {
        let csv_data = format!(
            "{FULL_HEADER}\n\
             951234,Penalty,,#22 Caden Bower: Minor - tripping,,2026-01-10,1st,08:00"
        );

        let log = EventLog::from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(log.events()[0].team, "Unknown");
    }

    #[test]
    fn game_id_stays_opaque_string() {
        let csv_data = format!(
            "{FULL_HEADER}\n\
             X95123,Goal,Muffin Men,#4 Mac Savage,,2026-01-10,2nd,10:41"
        );

        let log = EventLog::from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(log.events()[0].game_id, "X95123");
    }

    #[test]
    fn filtered_views() {
        let csv_data = format!(
            "{FULL_HEADER}\n\
             g1,Goal,Muffin Men,#4 Mac Savage,,2026-01-10,2nd,10:41\n\
             g1,Penalty,4 Lines,#9 Adam Miller: Minor - slashing,,2026-01-10,2nd,05:00\n\
             g2,Goal,4 Lines,#9 Adam Miller,,2026-01-17,1st,12:00\n\
             g2,Official,N/A,Referee: Brad Kuchar,,2026-01-17,N/A,N/A"
        );
        let log = EventLog::from_reader(csv_data.as_bytes()).unwrap();

        assert_eq!(log.of_type(EventType::Goal).count(), 2);
        assert_eq!(log.for_team("4 Lines").count(), 2);

        let subset: BTreeSet<String> = ["g2".to_string()].into();
        assert_eq!(log.in_games(&subset).count(), 2);

        let officials = log.officials_by_game();
        assert_eq!(officials["g2"], vec!["Referee: Brad Kuchar".to_string()]);
        assert!(!officials.contains_key("g1"));
    }

    #[test]
    fn normalization_applied_once_and_idempotent() {
        let events = vec![GameEvent {
            game_id: "g1".into(),
            event_type: EventType::Goal,
            team: "  DON CHERRY'S ".into(),
            description: "#4 Mac Savage".into(),
            strength: String::new(),
            period: "1st".into(),
            time: "10:00".into(),
        }];
        let log = EventLog::new(events);
        assert_eq!(log.events()[0].team, "Don Cherry's");

        let rewrapped = EventLog::new(log.events().to_vec());
        assert_eq!(rewrapped.events()[0].team, "Don Cherry's");
    }
}
