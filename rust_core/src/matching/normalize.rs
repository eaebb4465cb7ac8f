//! Deterministic team-name normalization.
//!
//! A fixed, ordered list of text rewrites that fold the common feed
//! variants ("Michigan State", "Saint Mary's", "University of Connecticut")
//! onto the canonical ratings-table style ("Michigan St.", "St. Mary's",
//! "Connecticut"). The pipeline is idempotent: applying it twice yields the
//! same string as applying it once. Case is preserved; lookups lowercase
//! separately.

const DIRECTIONAL_PREFIXES: [(&str, &str); 5] = [
    ("northern ", "N. "),
    ("southern ", "S. "),
    ("eastern ", "E. "),
    ("western ", "W. "),
    ("central ", "C. "),
];

/// Apply the full rewrite pipeline.
pub fn normalize(name: &str) -> String {
    let cleaned = clean_punctuation(name);
    let mut out = collapse_whitespace(&cleaned);
    out = strip_university(&out);
    out = rewrite_saint_prefix(&out);
    out = rewrite_directional_prefix(&out);
    out = rewrite_carolina_prefix(&out);
    rewrite_state_suffix(&out)
}

/// Fold curly quotes and long dashes onto their ASCII forms.
fn clean_punctuation(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            c => c,
        })
        .collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive prefix strip, safe on multi-byte input.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.is_char_boundary(prefix.len()) && s[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn strip_suffix_ci<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if s.is_char_boundary(split) && s[split..].eq_ignore_ascii_case(suffix) {
        Some(&s[..split])
    } else {
        None
    }
}

fn strip_university(s: &str) -> String {
    let mut out = s;
    if let Some(rest) = strip_prefix_ci(out, "university of ") {
        out = rest;
    }
    if let Some(rest) = strip_suffix_ci(out, " university") {
        out = rest;
    }
    out.to_string()
}

fn rewrite_saint_prefix(s: &str) -> String {
    if let Some(rest) = strip_prefix_ci(s, "saint ") {
        return format!("St. {rest}");
    }
    // "St Mary's" but not "St. Mary's", which is already canonical.
    if let Some(rest) = strip_prefix_ci(s, "st ") {
        return format!("St. {rest}");
    }
    s.to_string()
}

fn rewrite_directional_prefix(s: &str) -> String {
    for (prefix, abbrev) in DIRECTIONAL_PREFIXES {
        if let Some(rest) = strip_prefix_ci(s, prefix) {
            if !rest.is_empty() {
                return format!("{abbrev}{rest}");
            }
        }
    }
    s.to_string()
}

/// "North Carolina State" and friends abbreviate; the flagship schools
/// named exactly "North Carolina" / "South Carolina" stay whole.
fn rewrite_carolina_prefix(s: &str) -> String {
    if let Some(rest) = strip_prefix_ci(s, "north carolina ") {
        if !rest.is_empty() {
            return format!("N.C. {rest}");
        }
    }
    if let Some(rest) = strip_prefix_ci(s, "south carolina ") {
        if !rest.is_empty() {
            return format!("S.C. {rest}");
        }
    }
    s.to_string()
}

fn rewrite_state_suffix(s: &str) -> String {
    if let Some(rest) = strip_suffix_ci(s, " state") {
        return format!("{rest} St.");
    }
    if let Some(rest) = strip_suffix_ci(s, " st") {
        return format!("{rest} St.");
    }
    if s.eq_ignore_ascii_case("state") || s.eq_ignore_ascii_case("st") {
        return "St.".to_string();
    }
    s.to_string()
}
