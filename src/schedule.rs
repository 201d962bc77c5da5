// Schedule manifest: the high-level game index scraped from the league hub.
//
// Besides loading and subset views, this module carries two behaviors the
// manifest owns: preservation of hand-written commissioner notes across
// rebuilds, and head-to-head history derived from the manifest's score
// column.

use crate::extract::{normalize_score, normalize_team, parse_integer};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Schedule classification. Anything the league tags other than "Playoffs"
/// counts as regular season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameType {
    RegularSeason,
    Playoffs,
}

impl GameType {
    fn parse(s: &str) -> Self {
        if s.trim() == "Playoffs" {
            GameType::Playoffs
        } else {
            GameType::RegularSeason
        }
    }
}

/// One manifest row. `notes` belongs to the human enrichment step and is
/// passed through untouched by every engine.
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    pub game_id: String,
    pub home: String,
    pub away: String,
    pub date: String,
    pub facility: String,
    pub game_type: GameType,
    pub score: String,
    pub status: String,
    pub notes: String,
}

impl ScheduleEntry {
    /// Parse the manifest's year-less date ("Wed Feb 25"). The league runs
    /// over the new year: November/December belong to the season's start
    /// year, everything else to the following year.
    pub fn parsed_date(&self, season_start_year: i32) -> Option<NaiveDate> {
        let raw = self.date.trim();
        if raw.is_empty() {
            return None;
        }
        let year = if raw.contains("Nov") || raw.contains("Dec") {
            season_start_year
        } else {
            season_start_year + 1
        };
        let with_year = format!("{raw} {year}");
        NaiveDate::parse_from_str(&with_year, "%a %b %d %Y")
            .or_else(|_| NaiveDate::parse_from_str(&with_year, "%b %d %Y"))
            .ok()
    }
}

/// One prior meeting between two teams, from the queried team's perspective.
#[derive(Debug, Clone)]
pub struct Meeting {
    pub date: String,
    pub score: String,
    pub result: char,
}

/// Head-to-head summary between two teams.
#[derive(Debug, Clone, Default)]
pub struct HeadToHead {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub meetings: Vec<Meeting>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read schedule manifest {path}: {source}")]
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

#[derive(Debug, Deserialize)]
struct RawManifestRow {
    #[serde(rename = "GameID")]
    game_id: String,
    #[serde(rename = "Home")]
    home: String,
    #[serde(rename = "Away")]
    away: String,
    #[serde(rename = "Date", default)]
    date: Option<String>,
    #[serde(rename = "Facility", default)]
    facility: Option<String>,
    #[serde(rename = "GameType", default)]
    game_type: Option<String>,
    #[serde(rename = "Score", default)]
    score: Option<String>,
    #[serde(rename = "Status", default)]
    status: Option<String>,
    #[serde(rename = "Notes", default)]
    notes: Option<String>,
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// The full schedule manifest with team identity normalized at load.
#[derive(Debug, Clone)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn new(mut entries: Vec<ScheduleEntry>) -> Self {
        for entry in &mut entries {
            entry.home = normalize_team(&entry.home);
            entry.away = normalize_team(&entry.away);
            entry.game_id = entry.game_id.trim().to_string();
        }
        Schedule { entries }
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let file = std::fs::File::open(path).map_err(|e| ManifestError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(file).map_err(|e| match e {
            ManifestError::Csv { source, .. } => ManifestError::Csv {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Load from any reader. Public for tests and in-memory callers.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, ManifestError> {
        let mut reader = csv::Reader::from_reader(rdr);

        let headers = reader
            .headers()
            .map_err(|e| ManifestError::Csv {
                path: "<reader>".to_string(),
                source: e,
            })?
            .clone();
        for required in ["GameID", "Home", "Away"] {
            if !headers.iter().any(|h| h == required) {
                return Err(ManifestError::Validation(format!(
                    "schedule manifest is missing required column `{required}`"
                )));
            }
        }

        let mut entries = Vec::new();
        let mut malformed = 0usize;
        for result in reader.deserialize::<RawManifestRow>() {
            match result {
                Ok(raw) => entries.push(ScheduleEntry {
                    game_id: raw.game_id,
                    home: raw.home,
                    away: raw.away,
                    date: raw.date.unwrap_or_default().trim().to_string(),
                    facility: raw.facility.unwrap_or_default().trim().to_string(),
                    game_type: GameType::parse(&raw.game_type.unwrap_or_default()),
                    score: raw.score.unwrap_or_default().trim().to_string(),
                    status: raw.status.unwrap_or_default().trim().to_string(),
                    notes: raw.notes.unwrap_or_default(),
                }),
                Err(_) => malformed += 1,
            }
        }
        if malformed > 0 {
            warn!("skipped {malformed} malformed manifest rows");
        }

        Ok(Schedule::new(entries))
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The subset of games with the given type, as its own schedule.
    pub fn of_type(&self, game_type: GameType) -> Schedule {
        Schedule {
            entries: self
                .entries
                .iter()
                .filter(|e| e.game_type == game_type)
                .cloned()
                .collect(),
        }
    }

    /// All game IDs in this (sub)schedule.
    pub fn game_ids(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.game_id.clone()).collect()
    }

    /// Every team appearing as home or away.
    pub fn team_universe(&self) -> BTreeSet<String> {
        let mut teams = BTreeSet::new();
        for entry in &self.entries {
            teams.insert(entry.home.clone());
            teams.insert(entry.away.clone());
        }
        teams
    }

    /// Rebuild-safe merge: take the freshly scraped manifest but carry over
    /// commissioner notes from the previous manifest, keyed on game ID. An
    /// existing note is never overwritten by a rebuild.
    pub fn merge_preserving_notes(old: &Schedule, new: Schedule) -> Schedule {
        let notes: HashMap<&str, &str> = old
            .entries
            .iter()
            .filter(|e| !e.notes.trim().is_empty())
            .map(|e| (e.game_id.as_str(), e.notes.as_str()))
            .collect();

        let mut merged = new;
        let mut preserved = 0usize;
        for entry in &mut merged.entries {
            if let Some(note) = notes.get(entry.game_id.as_str()) {
                entry.notes = (*note).to_string();
                preserved += 1;
            }
        }
        if preserved > 0 {
            info!("preserved {preserved} commissioner notes across rebuild");
        }
        merged
    }

    /// Head-to-head record between two teams from the manifest's score
    /// column, order-agnostic in home/away. Results are reported from
    /// `team`'s perspective.
    pub fn head_to_head(&self, team: &str, opponent: &str) -> HeadToHead {
        let team = normalize_team(team);
        let opponent = normalize_team(opponent);
        let mut h2h = HeadToHead::default();

        for entry in &self.entries {
            let as_home = entry.home == team && entry.away == opponent;
            let as_away = entry.home == opponent && entry.away == team;
            if !as_home && !as_away {
                continue;
            }

            let score = normalize_score(&entry.score);
            let Some((h, a)) = score.split_once('-') else {
                continue;
            };
            let (home_score, away_score) = (parse_integer(h), parse_integer(a));
            let (mine, theirs) = if as_home {
                (home_score, away_score)
            } else {
                (away_score, home_score)
            };

            let result = match mine.cmp(&theirs) {
                std::cmp::Ordering::Greater => 'W',
                std::cmp::Ordering::Less => 'L',
                std::cmp::Ordering::Equal => 'T',
            };
            match result {
                'W' => h2h.wins += 1,
                'L' => h2h.losses += 1,
                _ => h2h.ties += 1,
            }
            h2h.meetings.push(Meeting {
                date: entry.date.clone(),
                // Always from the queried team's perspective.
                score: format!("{mine}-{theirs}"),
                result,
            });
        }
        h2h
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
