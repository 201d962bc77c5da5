// Deterministic extraction of structured values from free-text event fields.
//
// Boxscore descriptions are irregular officiating shorthand, so each
// event-type grammar gets its own small pattern-matcher instead of one
// monolithic parser. All functions here are pure and total: bad input
// yields a zero/None/empty result, never a panic.

// ---------------------------------------------------------------------------
// Numeric extraction
// ---------------------------------------------------------------------------

/// Return the first maximal run of ASCII digits in `text` as an integer,
/// or 0 if no digits are present or the run overflows.
pub fn parse_integer(text: &str) -> u32 {
    let mut digits = text.chars().skip_while(|c| !c.is_ascii_digit());
    let run: String = digits.by_ref().take_while(|c| c.is_ascii_digit()).collect();
    run.parse().unwrap_or(0)
}

/// Classify a penalty description into minutes.
///
/// Keyword priority is load-bearing: "double minor" must win over "minor"
/// when both appear in the same description.
pub fn penalty_minutes(description: &str) -> u32 {
    let lower = description.to_lowercase();
    if lower.contains("double minor") {
        4
    } else if lower.contains("major") {
        5
    } else if lower.contains("misconduct") {
        10
    } else if lower.contains("minor") {
        2
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Actor-name extraction
// ---------------------------------------------------------------------------

/// The remainder of `text` after the first jersey-number token (`#<digits>`),
/// or None when no such token exists.
fn after_jersey_number(text: &str) -> Option<&str> {
    let hash = text.find('#')?;
    let rest = &text[hash + 1..];
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    Some(&rest[digits..])
}

/// Extract the scorer from a Goal description: the name following the
/// jersey number, terminated by an assist list `(` or a colon.
pub fn extract_scorer(description: &str) -> Option<String> {
    let rest = after_jersey_number(description)?;
    let end = rest.find(['(', ':']).unwrap_or(rest.len());
    let name = rest[..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Extract assist names from the first parenthesized group of a Goal
/// description. Each comma-separated entry is re-parsed with the jersey
/// rule; "Spare" placeholder entries are dropped.
pub fn extract_assists(description: &str) -> Vec<String> {
    let Some(open) = description.find('(') else {
        return Vec::new();
    };
    let Some(close) = description[open + 1..].find(')') else {
        return Vec::new();
    };
    let group = &description[open + 1..open + 1 + close];

    let mut assists = Vec::new();
    for entry in group.split(',') {
        let Some(rest) = after_jersey_number(entry) else {
            continue;
        };
        let name = rest.trim();
        if name.is_empty() || name.to_lowercase().contains("spare") {
            continue;
        }
        assists.push(name.to_string());
    }
    assists
}

/// Extract the penalized player from a Penalty description: the name
/// following the jersey number and preceding a colon. A description
/// without a colon after the jersey token does not match the penalty
/// grammar and yields None.
pub fn extract_penalized_player(description: &str) -> Option<String> {
    let rest = after_jersey_number(description)?;
    let colon = rest.find(':')?;
    let name = rest[..colon].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

// ---------------------------------------------------------------------------
// Identity and score normalization
// ---------------------------------------------------------------------------

/// Normalize a raw team name: trim, title-case each word, and fold the
/// title-casing artifact `'S` back to `'s` (e.g. "DON CHERRY'S" ->
/// "Don Cherry's"). Idempotent: normalize(normalize(x)) == normalize(x).
pub fn normalize_team(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut boundary = true;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if boundary {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(c);
            boundary = true;
        }
    }
    out.replace("'S", "'s")
}

/// Standardize a manifest score string: unify en/em dashes to `-` and
/// strip all spaces ("5 – 1" -> "5-1").
pub fn normalize_score(raw: &str) -> String {
    raw.replace(['\u{2013}', '\u{2014}'], "-").replace(' ', "")
}

// ---------------------------------------------------------------------------
// Intra-game chronology
// ---------------------------------------------------------------------------

/// Order periods for chronological sorting: "1st"/"2nd"/"3rd" by their
/// digit, overtime after regulation, shootout last. Unrecognized text
/// sorts first (treated as earliest).
pub fn period_ordinal(period: &str) -> u32 {
    let n = parse_integer(period);
    if n > 0 {
        return n;
    }
    let upper = period.to_uppercase();
    if upper.contains("SO") {
        5
    } else if upper.contains("OT") {
        4
    } else {
        0
    }
}

/// Parse an "MM:SS" game-clock value into seconds. The clock counts down,
/// so a larger value means earlier in the period. Unparseable input is 0.
pub fn clock_seconds(time: &str) -> u32 {
    match time.split_once(':') {
        Some((m, s)) => parse_integer(m) * 60 + parse_integer(s),
        None => parse_integer(time),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- parse_integer --

    #[test]
    fn parse_integer_first_digit_run() {
        assert_eq!(parse_integer("5"), 5);
        assert_eq!(parse_integer("  12 mins"), 12);
        assert_eq!(parse_integer("abc42def7"), 42);
        assert_eq!(parse_integer(""), 0);
        assert_eq!(parse_integer("no digits here"), 0);
    }

    // -- penalty_minutes priority order --

    #[test]
    fn penalty_minutes_classifier() {
        assert_eq!(penalty_minutes("Double minor - roughing"), 4);
        assert_eq!(penalty_minutes("Major - fighting"), 5);
        assert_eq!(penalty_minutes("Misconduct"), 10);
        assert_eq!(penalty_minutes("Minor - tripping"), 2);
        assert_eq!(penalty_minutes("Warning"), 0);
    }

    #[test]
    fn double_minor_wins_over_minor() {
        // Contains both "double minor" and "minor"; priority says 4.
        assert_eq!(penalty_minutes("Double Minor - high sticking (minor x2)"), 4);
    }

    #[test]
    fn penalty_minutes_case_insensitive() {
        assert_eq!(penalty_minutes("MAJOR - FIGHTING"), 5);
        assert_eq!(penalty_minutes("misconduct - abuse of officials"), 10);
    }

    // -- extract_scorer --

    #[test]
    fn scorer_before_assist_list() {
        assert_eq!(
            extract_scorer("#19 Michael Murphy (#7 Conor Pang, #12 Jack Pirie)"),
            Some("Michael Murphy".to_string())
        );
    }

    #[test]
    fn scorer_unassisted() {
        assert_eq!(
            extract_scorer("#4 Mac Savage"),
            Some("Mac Savage".to_string())
        );
    }

    #[test]
    fn scorer_terminates_at_colon() {
        assert_eq!(
            extract_scorer("#8 Sean Murphy: power play"),
            Some("Sean Murphy".to_string())
        );
    }

    #[test]
    fn scorer_missing_jersey_number() {
        assert_eq!(extract_scorer("Michael Murphy (unassisted)"), None);
        assert_eq!(extract_scorer("# no digits"), None);
        assert_eq!(extract_scorer(""), None);
    }

    // -- extract_assists --

    #[test]
    fn assists_comma_separated() {
        assert_eq!(
            extract_assists("#19 Michael Murphy (#7 Conor Pang, #12 Jack Pirie)"),
            vec!["Conor Pang".to_string(), "Jack Pirie".to_string()]
        );
    }

    #[test]
    fn assists_spare_placeholder_excluded() {
        assert_eq!(
            extract_assists("#19 Michael Murphy (#99 Spare, #7 Conor Pang)"),
            vec!["Conor Pang".to_string()]
        );
    }

    #[test]
    fn assists_none_when_unassisted() {
        assert!(extract_assists("#4 Mac Savage").is_empty());
        assert!(extract_assists("#4 Mac Savage ()").is_empty());
    }

    #[test]
    fn assists_entry_without_jersey_skipped() {
        assert_eq!(
            extract_assists("#4 Mac Savage (unassisted, #7 Conor Pang)"),
            vec!["Conor Pang".to_string()]
        );
    }

    // -- extract_penalized_player --

    #[test]
    fn penalized_player_before_colon() {
        assert_eq!(
            extract_penalized_player("#22 Caden Bower: Double minor - high sticking"),
            Some("Caden Bower".to_string())
        );
    }

    #[test]
    fn penalized_player_requires_colon() {
        // Goal-style description does not match the penalty grammar.
        assert_eq!(extract_penalized_player("#4 Mac Savage (#7 Conor Pang)"), None);
        assert_eq!(extract_penalized_player("Minor - tripping"), None);
    }

    // -- normalize_team --

    #[test]
    fn team_title_cased_and_trimmed() {
        assert_eq!(normalize_team("  muffin men "), "Muffin Men");
        assert_eq!(normalize_team("4 LINES"), "4 Lines");
        assert_eq!(normalize_team("the sahara"), "The Sahara");
    }

    #[test]
    fn team_apostrophe_suffix_corrected() {
        assert_eq!(normalize_team("DON CHERRY'S"), "Don Cherry's");
        assert_eq!(normalize_team("don cherry's"), "Don Cherry's");
    }

    #[test]
    fn team_normalization_idempotent() {
        for raw in ["Don Cherry's", "4 LINES", "flat-earthers", "The Shockers"] {
            let once = normalize_team(raw);
            assert_eq!(normalize_team(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn team_hyphenated_words() {
        assert_eq!(normalize_team("flat-earthers"), "Flat-Earthers");
    }

    // -- normalize_score --

    #[test]
    fn score_dashes_and_spaces_unified() {
        assert_eq!(normalize_score("5 \u{2013} 1"), "5-1");
        assert_eq!(normalize_score("3\u{2014}2"), "3-2");
        assert_eq!(normalize_score("6-4"), "6-4");
        assert_eq!(normalize_score(""), "");
    }

    // -- chronology helpers --

    #[test]
    fn period_ordering() {
        assert_eq!(period_ordinal("1st"), 1);
        assert_eq!(period_ordinal("2nd"), 2);
        assert_eq!(period_ordinal("3rd"), 3);
        assert_eq!(period_ordinal("OT"), 4);
        assert_eq!(period_ordinal("SO"), 5);
        assert_eq!(period_ordinal("N/A"), 0);
    }

    #[test]
    fn clock_counts_down() {
        assert_eq!(clock_seconds("12:34"), 754);
        assert_eq!(clock_seconds("05:00"), 300);
        assert_eq!(clock_seconds("0:07"), 7);
        assert_eq!(clock_seconds("garbage"), 0);
    }
}
