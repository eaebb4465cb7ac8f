//! Team resolution against the alias table.
//!
//! Stages run in strict priority order: exact canonical, direct alias,
//! normalized canonical, normalized alias, then an aggressive pass that
//! strips a trailing mascot phrase and reruns the first four stages.
//! Aggressive hits are flagged so the gate can apply policy; everything
//! else is safe unattended. Ambiguous normalized matches resolve only when
//! the known-team set singles out one candidate, otherwise they fail.

use std::sync::OnceLock;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::alias::AliasTable;
use super::normalize::normalize;

/// Trailing mascot phrases stripped during aggressive resolution. Matched
/// longest phrase first, case-insensitively, against whole words.
const MASCOTS: &[&str] = &[
    // Multi-word nicknames
    "Blue Devils",
    "Blue Demons",
    "Blue Raiders",
    "Blue Hens",
    "Tar Heels",
    "Demon Deacons",
    "Fighting Irish",
    "Fighting Illini",
    "Fighting Hawks",
    "Crimson Tide",
    "Nittany Lions",
    "Scarlet Knights",
    "Yellow Jackets",
    "Horned Frogs",
    "Golden Eagles",
    "Golden Bears",
    "Golden Gophers",
    "Golden Flashes",
    "Golden Hurricane",
    "Golden Grizzlies",
    "Red Raiders",
    "Red Storm",
    "Red Wolves",
    "Sun Devils",
    "Wolf Pack",
    "Green Wave",
    "Mean Green",
    "Black Knights",
    "Black Bears",
    "Thundering Herd",
    "Purple Aces",
    "Purple Eagles",
    "Ragin' Cajuns",
    "Runnin' Rebels",
    "Runnin' Utes",
    "Rainbow Warriors",
    "Great Danes",
    "Mountain Hawks",
    "Screaming Eagles",
    "Big Red",
    "Big Green",
    // Single-word nicknames
    "Wildcats",
    "Tigers",
    "Bulldogs",
    "Eagles",
    "Panthers",
    "Aggies",
    "Cougars",
    "Huskies",
    "Spartans",
    "Buckeyes",
    "Wolverines",
    "Hoosiers",
    "Boilermakers",
    "Badgers",
    "Hawkeyes",
    "Cyclones",
    "Cornhuskers",
    "Huskers",
    "Jayhawks",
    "Sooners",
    "Longhorns",
    "Bears",
    "Bruins",
    "Trojans",
    "Ducks",
    "Beavers",
    "Cardinal",
    "Cardinals",
    "Cavaliers",
    "Hokies",
    "Terrapins",
    "Gamecocks",
    "Volunteers",
    "Commodores",
    "Razorbacks",
    "Rebels",
    "Gators",
    "Seminoles",
    "Hurricanes",
    "Orange",
    "Mountaineers",
    "Buffaloes",
    "Utes",
    "Aztecs",
    "Lobos",
    "Rams",
    "Broncos",
    "Falcons",
    "Owls",
    "Knights",
    "Pirates",
    "Flyers",
    "Explorers",
    "Billikens",
    "Bonnies",
    "Minutemen",
    "Colonials",
    "Spiders",
    "Dukes",
    "Musketeers",
    "Bearcats",
    "Bluejays",
    "Friars",
    "Hoyas",
    "Illini",
    "Wolfpack",
    "Zips",
    "Rockets",
    "Chippewas",
    "RedHawks",
    "Redhawks",
    "Bobcats",
    "Bulls",
    "Blazers",
    "Miners",
    "Roadrunners",
    "Hilltoppers",
    "Monarchs",
    "Chanticleers",
    "Warhawks",
    "Jaguars",
    "Catamounts",
    "Retrievers",
    "Seahawks",
    "Mocs",
    "Buccaneers",
    "Paladins",
    "Terriers",
    "Keydets",
    "Salukis",
    "Shockers",
    "Sycamores",
    "Redbirds",
    "Braves",
    "Ramblers",
    "Beacons",
    "Aces",
    "Crusaders",
    "Flames",
    "Norse",
    "Penguins",
    "Vikings",
    "Raiders",
    "Mastodons",
    "Titans",
    "Jackrabbits",
    "Bison",
    "Bisons",
    "Coyotes",
    "Mavericks",
    "Phoenix",
    "Tommies",
    "Pioneers",
    "Kangaroos",
    "Antelopes",
    "Lopes",
    "Lancers",
    "Bearkats",
    "Lumberjacks",
    "Islanders",
    "Cowboys",
    "Demons",
    "Lions",
    "Colonels",
    "Thunderbirds",
    "Vandals",
    "Bengals",
    "Grizzlies",
    "Hornets",
    "Gaels",
    "Jaspers",
    "Peacocks",
    "Saints",
    "Stags",
    "Pride",
    "Dragons",
    "Midshipmen",
    "Crimson",
    "Quakers",
    "Highlanders",
    "Anteaters",
    "Gauchos",
    "Tritons",
    "Matadors",
    "49ers",
    "Waves",
    "Dons",
    "Toreros",
    "Pilots",
    "Racers",
    "Skyhawks",
    "Governors",
    "Leopards",
    "Camels",
    "Hatters",
    "Ospreys",
    "Dolphins",
    "Privateers",
    "Rattlers",
    "Mustangs",
    "Sharks",
    "Hawks",
];

/// How a name landed on its canonical form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Alias,
    Normalized,
    NormalizedAlias,
    Aggressive,
}

impl MatchMethod {
    pub fn label(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::Alias => "alias",
            MatchMethod::Normalized => "normalized",
            MatchMethod::NormalizedAlias => "normalized_alias",
            MatchMethod::Aggressive => "aggressive",
        }
    }
}

/// A successful resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTeam {
    pub canonical: String,
    pub method: MatchMethod,
}

/// Request-scoped resolver over a table snapshot. The known-team set is
/// the ratings store's key space, used only to break normalized-form ties.
pub struct TeamResolver<'a> {
    table: &'a AliasTable,
    known_teams: Option<&'a FxHashSet<String>>,
}

impl<'a> TeamResolver<'a> {
    pub fn new(table: &'a AliasTable) -> Self {
        Self {
            table,
            known_teams: None,
        }
    }

    /// `known_teams` holds lowercase canonical names with ratings rows.
    pub fn with_known_teams(table: &'a AliasTable, known_teams: &'a FxHashSet<String>) -> Self {
        Self {
            table,
            known_teams: Some(known_teams),
        }
    }

    pub fn resolve(&self, raw: &str) -> Option<ResolvedTeam> {
        let name = raw.trim();
        if name.is_empty() {
            return None;
        }
        if let Some((canonical, method)) = self.stages(name) {
            return Some(ResolvedTeam { canonical, method });
        }
        let stripped = strip_trailing_mascot(&normalize(name))?;
        let (canonical, _) = self.stages(&stripped)?;
        Some(ResolvedTeam {
            canonical,
            method: MatchMethod::Aggressive,
        })
    }

    fn stages(&self, name: &str) -> Option<(String, MatchMethod)> {
        if let Some(c) = self.table.canonical(name) {
            return Some((c.to_string(), MatchMethod::Exact));
        }
        if let Some(c) = self.table.from_alias(name) {
            return Some((c.to_string(), MatchMethod::Alias));
        }
        // The normalized stages only apply when normalization moved the
        // name; an unchanged name was already covered above.
        let normalized = normalize(name);
        if normalized == name {
            return None;
        }
        if let Some(c) = self.pick(self.table.from_normalized(&normalized)) {
            return Some((c, MatchMethod::Normalized));
        }
        if let Some(c) = self.pick(self.table.from_normalized_alias(&normalized)) {
            return Some((c, MatchMethod::NormalizedAlias));
        }
        None
    }

    /// A lone candidate wins outright. With several, the known-team set
    /// must single one out; an unresolvable tie fails rather than guess.
    fn pick(&self, candidates: &[String]) -> Option<String> {
        match candidates {
            [] => None,
            [only] => Some(only.clone()),
            many => {
                let known = self.known_teams?;
                let mut hits = many.iter().filter(|c| known.contains(&c.to_lowercase()));
                match (hits.next(), hits.next()) {
                    (Some(one), None) => Some(one.clone()),
                    _ => None,
                }
            }
        }
    }
}

fn mascot_phrases() -> &'static [&'static str] {
    static SORTED: OnceLock<Vec<&'static str>> = OnceLock::new();
    SORTED.get_or_init(|| {
        let mut phrases = MASCOTS.to_vec();
        phrases.sort_by_key(|p| std::cmp::Reverse((p.split_whitespace().count(), p.len())));
        phrases
    })
}

/// Drop a trailing mascot phrase, keeping at least one leading word.
fn strip_trailing_mascot(name: &str) -> Option<String> {
    let words: Vec<&str> = name.split_whitespace().collect();
    for phrase in mascot_phrases() {
        let phrase_words: Vec<&str> = phrase.split_whitespace().collect();
        if words.len() <= phrase_words.len() {
            continue;
        }
        let tail = &words[words.len() - phrase_words.len()..];
        if tail
            .iter()
            .zip(&phrase_words)
            .all(|(word, expected)| word.eq_ignore_ascii_case(expected))
        {
            return Some(words[..words.len() - phrase_words.len()].join(" "));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TeamResolver<'static> {
        TeamResolver::new(AliasTable::builtin())
    }

    #[test]
    fn exact_wins_first() {
        let resolved = resolver().resolve("Duke").unwrap();
        assert_eq!(resolved.canonical, "Duke");
        assert_eq!(resolved.method, MatchMethod::Exact);

        let resolved = resolver().resolve("  michigan st. ").unwrap();
        assert_eq!(resolved.canonical, "Michigan St.");
        assert_eq!(resolved.method, MatchMethod::Exact);
    }

    #[test]
    fn alias_before_normalization() {
        let resolved = resolver().resolve("UConn").unwrap();
        assert_eq!(resolved.canonical, "Connecticut");
        assert_eq!(resolved.method, MatchMethod::Alias);

        let resolved = resolver().resolve("NC State").unwrap();
        assert_eq!(resolved.canonical, "N.C. St.");
        assert_eq!(resolved.method, MatchMethod::Alias);
    }

    #[test]
    fn normalized_forms_match() {
        let resolved = resolver().resolve("Michigan State").unwrap();
        assert_eq!(resolved.canonical, "Michigan St.");
        assert_eq!(resolved.method, MatchMethod::Normalized);

        let resolved = resolver().resolve("University of Connecticut").unwrap();
        assert_eq!(resolved.canonical, "Connecticut");
        assert_eq!(resolved.method, MatchMethod::Normalized);

        let resolved = resolver().resolve("Ohio State").unwrap();
        assert_eq!(resolved.canonical, "Ohio St.");
        assert_eq!(resolved.method, MatchMethod::Normalized);
    }

    #[test]
    fn normalized_alias_is_last_deterministic_stage() {
        // Extra inner whitespace defeats the raw alias key but not the
        // normalized one.
        let resolved = resolver().resolve("Mount  Saint Mary's").unwrap();
        assert_eq!(resolved.canonical, "Mount St. Mary's");
        assert_eq!(resolved.method, MatchMethod::NormalizedAlias);
    }

    #[test]
    fn aggressive_strips_trailing_mascots() {
        let cases = [
            ("Illinois State Redbirds", "Illinois St."),
            ("Duke Blue Devils", "Duke"),
            ("Marquette Golden Eagles", "Marquette"),
            ("Nevada Wolf Pack", "Nevada"),
            ("NC State Wolfpack", "N.C. St."),
            ("Utah State Aggies", "Utah St."),
            ("Alabama Crimson Tide", "Alabama"),
        ];
        for (input, expected) in cases {
            let resolved = resolver().resolve(input).unwrap();
            assert_eq!(resolved.canonical, expected, "input {input:?}");
            assert_eq!(resolved.method, MatchMethod::Aggressive, "input {input:?}");
        }
    }

    #[test]
    fn multi_word_mascots_strip_whole_phrase() {
        assert_eq!(
            strip_trailing_mascot("Marquette Golden Eagles").as_deref(),
            Some("Marquette")
        );
        // Never strips the name down to nothing.
        assert_eq!(strip_trailing_mascot("Wolfpack"), None);
        assert_eq!(strip_trailing_mascot("Blue Devils"), None);
        // A shorter suffix phrase can still fire when a longer one is the
        // whole name.
        assert_eq!(
            strip_trailing_mascot("Golden Eagles").as_deref(),
            Some("Golden")
        );
    }

    #[test]
    fn unknown_names_fail() {
        assert!(resolver().resolve("").is_none());
        assert!(resolver().resolve("   ").is_none());
        assert!(resolver().resolve("Hogwarts").is_none());
        assert!(resolver().resolve("Hogwarts Wizards").is_none());
    }

    #[test]
    fn ambiguous_normalized_match_needs_known_teams() {
        // The same school entered twice with different apostrophes is the
        // classic table flaw: both rows survive exact checks but collide
        // after normalization.
        let mut table = AliasTable::new();
        table.add_canonical("St. Mary's").unwrap();
        table.add_canonical("St. Mary\u{2019}s").unwrap();

        let plain = TeamResolver::new(&table);
        assert!(plain.resolve("Saint Mary's").is_none());

        let mut known = FxHashSet::default();
        known.insert("st. mary's".to_string());
        let tiebroken = TeamResolver::with_known_teams(&table, &known);
        let resolved = tiebroken.resolve("Saint Mary's").unwrap();
        assert_eq!(resolved.canonical, "St. Mary's");
        assert_eq!(resolved.method, MatchMethod::Normalized);
    }
}
