//! Field transforms: pure functions from a selector match set to one cell.

use once_cell::sync::Lazy;
use regex::Regex;

/// A fixed code-to-description table. Lookups are linear; tables are tiny.
pub type CodeTable = &'static [(&'static str, &'static str)];

/// How a scalar field's match set becomes a cell value.
#[derive(Debug, Clone)]
pub enum Transform {
    /// First match, as-is.
    Verbatim,
    /// All matches joined with single spaces, internal whitespace runs
    /// collapsed, trimmed. For free-text and multi-line fields.
    Normalize,
    /// All matches joined with a fixed delimiter.
    Join(&'static str),
    /// First match looked up in a fixed code table; unknown codes map to
    /// empty, never an error.
    Lookup(CodeTable),
    /// "1" when the selector matched at all, "0" otherwise. The matched value
    /// is irrelevant; presence in the tree is the datum.
    Presence,
    /// Literal "true"/"false" map to "1"/"0"; any other text passes through
    /// whitespace normalization.
    TrueFalse,
    /// First run of ASCII digits in the first match (registration numbers).
    Digits,
}

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit pattern compiles"));

impl Transform {
    /// Apply to a non-empty match set. Empty match sets are handled by the
    /// engine (defaults and carry-forward), except for `Presence` which is
    /// meaningful either way.
    pub fn apply(&self, matches: &[String]) -> String {
        match self {
            Transform::Verbatim => matches.first().cloned().unwrap_or_default(),
            Transform::Normalize => normalize(matches),
            Transform::Join(delim) => matches.join(delim),
            Transform::Lookup(table) => matches
                .first()
                .and_then(|code| lookup(table, code))
                .unwrap_or_default(),
            Transform::Presence => {
                if matches.is_empty() {
                    "0".to_string()
                } else {
                    "1".to_string()
                }
            }
            Transform::TrueFalse => match matches.first().map(String::as_str) {
                Some("true") => "1".to_string(),
                Some("false") => "0".to_string(),
                Some(_) => normalize(matches),
                None => String::new(),
            },
            Transform::Digits => matches
                .first()
                .and_then(|s| DIGITS.find(s))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Collapse whitespace runs across all matches into single spaces.
pub fn normalize(matches: &[String]) -> String {
    matches
        .iter()
        .flat_map(|m| m.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

fn lookup(table: CodeTable, code: &str) -> Option<String> {
    table
        .iter()
        .find(|(k, _)| *k == code)
        .map(|(_, v)| v.to_string())
}

/// Split an ISO-like date string (YYYY-MM-DD) into its components, preserving
/// leading zeros as text. Returns (year, month, day).
pub fn decompose_date(date: &str) -> (String, String, String) {
    let date = date.trim();
    if date.len() < 10 || !date.is_ascii() {
        return (String::new(), String::new(), String::new());
    }
    (
        date[0..4].to_string(),
        date[5..7].to_string(),
        date[date.len() - 2..].to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vals(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_collapses_runs_across_matches() {
        let out = Transform::Normalize.apply(&vals(&["  Fine \n leather ", "goods\tand", "bags "]));
        assert_eq!(out, "Fine leather goods and bags");
    }

    #[test]
    fn join_uses_fixed_delimiter() {
        assert_eq!(Transform::Join("/").apply(&vals(&["1", "2", "7"])), "1/2/7");
    }

    #[test]
    fn lookup_maps_unknown_to_empty() {
        const TABLE: CodeTable = &[("1", "Wine"), ("2", "Spirits")];
        assert_eq!(Transform::Lookup(TABLE).apply(&vals(&["2"])), "Spirits");
        assert_eq!(Transform::Lookup(TABLE).apply(&vals(&["9"])), "");
    }

    #[test]
    fn presence_reflects_match_count_only() {
        assert_eq!(Transform::Presence.apply(&vals(&["anything"])), "1");
        assert_eq!(Transform::Presence.apply(&[]), "0");
    }

    #[test]
    fn true_false_maps_literals_and_passes_text() {
        assert_eq!(Transform::TrueFalse.apply(&vals(&["true"])), "1");
        assert_eq!(Transform::TrueFalse.apply(&vals(&["false"])), "0");
        assert_eq!(Transform::TrueFalse.apply(&vals(&[" other  text "])), "other text");
    }

    #[test]
    fn digits_extracts_first_run() {
        assert_eq!(Transform::Digits.apply(&vals(&["TMA0123456 ext"])), "0123456");
        assert_eq!(Transform::Digits.apply(&vals(&["no digits"])), "");
    }

    #[test]
    fn date_decomposition_preserves_leading_zeros() {
        assert_eq!(
            decompose_date("2019-03-07"),
            ("2019".to_string(), "03".to_string(), "07".to_string())
        );
        assert_eq!(decompose_date("bad"), (String::new(), String::new(), String::new()));
    }
}
