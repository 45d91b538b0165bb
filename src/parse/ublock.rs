//! uBlock Origin / uBlacklist filter line parsing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::hostname::{clean_domain, is_valid_domain};

/// Rule shapes a domain can be extracted from, tried in order.
/// Covers `*.d/*`, `*://*.d/*`, `*://d/*`, `https?://d/*`, `||d^`,
/// `d/*`, `d*` and bare domains.
static RULE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\*\.([a-zA-Z0-9.-]+)(?:/.*)?(?:\*)?$",
        r"^\*\.([a-zA-Z0-9.-]+)/.*(?:\*)?$",
        r"^\*://\*\.([a-zA-Z0-9.-]+)(?:/.*)?$",
        r"^\*://([a-zA-Z0-9.-]+)(?:/.*)?$",
        r"^https?://([a-zA-Z0-9.-]+)(?:/.*)?$",
        r"^\|\|([a-zA-Z0-9.-]+)(?:/.*)?(?:\^)?$",
        r"^([a-zA-Z0-9.-]+)/.*(?:\*)?$",
        r"^([a-zA-Z0-9.-]+)(?:/.*)?$",
        r"^([a-zA-Z0-9.-]+)\*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("RULE_PATTERNS: hardcoded regex is invalid"))
    .collect()
});

/// Last-resort scan for anything domain-shaped embedded in a rule
static EMBEDDED_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z0-9.-]+\.[a-zA-Z]{2,})")
        .expect("EMBEDDED_DOMAIN: hardcoded regex is invalid")
});

/// Outcome of parsing one uBlock line
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UblockLine {
    Comment,
    Invalid { is_path_rule: bool },
    Domain {
        domain: String,
        is_path_rule: bool,
        is_wildcard: bool,
    },
}

/// Check whether a rule targets a specific path rather than a whole
/// host: any path segment other than a bare `*` counts.
pub fn has_specific_path(rule: &str) -> bool {
    let url_part = if let Some(rest) = rule.strip_prefix("*://") {
        rest
    } else if let Some(rest) = rule.strip_prefix("||") {
        rest.trim_end_matches('^')
    } else {
        rule
    };

    match url_part.split_once('/') {
        Some((_, path)) => !path.is_empty() && path != "*",
        None => false,
    }
}

/// Extract the domain candidate from a uBlock rule, trying the known
/// rule shapes first and falling back to an embedded-domain scan.
pub fn extract_domain_from_rule(rule: &str) -> Option<String> {
    let rule = rule.trim();

    for pattern in RULE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(rule) {
            let candidate = captures.get(1).map(|m| m.as_str()).unwrap_or("");
            if candidate.contains('.')
                && !candidate.starts_with('/')
                && is_valid_domain(candidate)
            {
                return Some(candidate.to_string());
            }
        }
    }

    // `*://*/filename` rules carry no extractable host
    if rule.starts_with("*://*/") {
        return None;
    }

    for captures in EMBEDDED_DOMAIN.captures_iter(rule) {
        let candidate = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        if is_valid_domain(candidate) {
            return Some(candidate.to_string());
        }
    }

    None
}

/// Parse a single uBlock line into a domain, comment or reject
pub(crate) fn parse_line(line: &str, parsing: &ParsingConfig) -> UblockLine {
    let line = line.trim();
    if line.is_empty() || line.starts_with('!') || line.starts_with('#') {
        return UblockLine::Comment;
    }

    // Inline comments: drop everything from the first `#`
    let rule = match line.find('#') {
        Some(pos) => line[..pos].trim(),
        None => line,
    };
    if rule.is_empty() {
        return UblockLine::Comment;
    }

    let is_path_rule = has_specific_path(rule);
    let is_wildcard = rule.starts_with("*.");

    match extract_domain_from_rule(rule).and_then(|d| clean_domain(&d, parsing)) {
        Some(domain) => UblockLine::Domain {
            domain,
            is_path_rule,
            is_wildcard,
        },
        None => UblockLine::Invalid { is_path_rule },
    }
}
