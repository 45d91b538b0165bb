//! Auto-classify rules: explicit per-domain category assignments that
//! override whatever action a data source would apply.

use std::collections::BTreeMap;
use std::fs;

use log::{debug, info, warn};

use crate::config::{AutoClassifyConfig, ParsingConfig};
use crate::fetch::Fetcher;
use crate::hostname::clean_domain;
use crate::parse::parse_classify_rules;
use crate::types::{Action, CategorizedDomains, ClassifyRule};

/// Counters from applying direct rule additions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectApplyStats {
    /// Domains added straight from classify rules
    pub auto_added: usize,
    /// Domains whose skip rule lost to an explicit assignment
    pub skip_overridden: usize,
}

/// Ordered set of auto-classify rules
#[derive(Debug, Default)]
pub struct Classifier {
    rules: Vec<ClassifyRule>,
}

impl Classifier {
    pub fn new(rules: Vec<ClassifyRule>) -> Self {
        Self { rules }
    }

    /// Load rules from the configured sources (files or URLs) plus the
    /// inline rule list. A failing source is logged and skipped.
    pub fn load(config: &AutoClassifyConfig, fetcher: &Fetcher) -> Self {
        if !config.enabled {
            debug!("auto-classify disabled");
            return Self::default();
        }

        let mut rules = Vec::new();

        for rule_line in &config.rules {
            rules.extend(parse_classify_rules(rule_line));
        }

        for source in &config.sources {
            if !source.enabled {
                continue;
            }
            let text = if let Some(ref url) = source.url {
                match fetcher.fetch_text(url) {
                    Ok(text) => text,
                    Err(err) => {
                        warn!("classify source '{}' failed: {}", source.name, err);
                        continue;
                    }
                }
            } else if let Some(ref path) = source.file {
                match fs::read_to_string(path) {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(
                            "classify source '{}' unreadable ({}): {}",
                            source.name,
                            path.display(),
                            err
                        );
                        continue;
                    }
                }
            } else {
                warn!("classify source '{}' has neither url nor file", source.name);
                continue;
            };

            let parsed = parse_classify_rules(&text);
            debug!("classify source '{}': {} rules", source.name, parsed.len());
            rules.extend(parsed);
        }

        info!("loaded {} auto-classify rules", rules.len());
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `*.apex` matches the apex and every subdomain; anything else is
    /// an exact match.
    fn pattern_matches(pattern: &str, domain: &str) -> bool {
        match pattern.strip_prefix("*.") {
            Some(apex) => {
                domain == apex || (domain.ends_with(apex) && {
                    let boundary = domain.len() - apex.len();
                    domain.as_bytes().get(boundary.wrapping_sub(1)) == Some(&b'.')
                })
            }
            None => domain == pattern,
        }
    }

    /// Explicit category for a domain, if any assign rule matches.
    /// First match wins; `skip` rules are not assignments.
    pub fn action_for(&self, domain: &str) -> Option<Action> {
        for rule in &self.rules {
            if let ClassifyRule::Assign { action, pattern } = rule {
                if *action != Action::Skip && Self::pattern_matches(pattern, domain) {
                    return Some(*action);
                }
            }
        }
        None
    }

    /// Whether a skip rule suppresses this domain. Only consulted for
    /// source-supplied domains; explicit assignments override it.
    pub fn should_skip(&self, domain: &str) -> bool {
        self.rules.iter().any(|rule| {
            matches!(
                rule,
                ClassifyRule::Assign {
                    action: Action::Skip,
                    pattern
                } if Self::pattern_matches(pattern, domain)
            )
        })
    }

    /// Add the literal domains named by assign rules to their
    /// categories, and expand replace rules into the rewrite map.
    ///
    /// Wildcard patterns are match rules, not concrete domains, and
    /// are not added. A domain with both a skip rule and an explicit
    /// assignment gets the assignment; the override is counted.
    pub fn apply_direct(
        &self,
        categorized: &mut CategorizedDomains,
        parsing: &ParsingConfig,
    ) -> DirectApplyStats {
        let mut stats = DirectApplyStats::default();

        // Group rules per cleaned literal domain to resolve conflicts
        let mut per_domain: BTreeMap<String, Vec<&ClassifyRule>> = BTreeMap::new();

        for rule in &self.rules {
            match rule {
                ClassifyRule::Assign { pattern, .. } => {
                    if pattern.starts_with("*.") {
                        continue;
                    }
                    if let Some(domain) = clean_domain(pattern, parsing) {
                        per_domain.entry(domain).or_default().push(rule);
                    }
                }
                ClassifyRule::Replace { old, new } => {
                    if let Some(old) = clean_domain(old, parsing) {
                        let key = format!("(.*\\.)?{}$", regex::escape(&old));
                        categorized.replace.insert(key, new.clone());
                        stats.auto_added += 1;
                    }
                }
            }
        }

        for (domain, rules) in per_domain {
            if categorized.contains(&domain) {
                continue;
            }

            let has_skip = rules.iter().any(|r| {
                matches!(r, ClassifyRule::Assign { action: Action::Skip, .. })
            });
            // Last non-skip assignment wins
            let effective = rules.iter().rev().find_map(|r| match r {
                ClassifyRule::Assign { action, .. } if *action != Action::Skip => Some(*action),
                _ => None,
            });

            if let Some(action) = effective {
                if let Some(set) = categorized.set_mut(action) {
                    set.insert(domain.clone());
                    stats.auto_added += 1;
                    if has_skip {
                        stats.skip_overridden += 1;
                        debug!("skip rule for {} overridden by {}", domain, action.as_str());
                    }
                }
            }
        }

        stats
    }
}
