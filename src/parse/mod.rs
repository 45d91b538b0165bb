//! Per-format blocklist parsing.
//!
//! Each source format turns raw text into validated domains plus
//! per-source counters. Parsers are pure over their input; policy
//! decisions (path-rule routing, classification) stay with the caller.

mod classify;
mod csv;
mod ublock;
mod v2ray;

pub use classify::parse_classify_rules;
pub use ublock::{extract_domain_from_rule, has_specific_path};

use std::collections::HashSet;

use crate::config::{CsvConfig, ParsingConfig};
use crate::error::{Result, RulegenError};
use crate::hostname::clean_domain;
use crate::types::SourceFormat;

/// Parse counters accumulated per source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub total_lines: usize,
    pub parsed_domains: usize,
    pub ignored_comments: usize,
    pub invalid_domains: usize,
    pub duplicate_domains: usize,
    /// uBlock rules targeting a specific path
    pub path_rules: usize,
    /// uBlock `*.domain` wildcard rules resolved to their apex
    pub wildcard_rules: usize,
    pub v2ray_with_tags: usize,
    pub csv_rows: usize,
    pub csv_invalid_urls: usize,
}

impl SourceStats {
    /// Fold another source's counters into this one
    pub fn merge(&mut self, other: &SourceStats) {
        self.total_lines += other.total_lines;
        self.parsed_domains += other.parsed_domains;
        self.ignored_comments += other.ignored_comments;
        self.invalid_domains += other.invalid_domains;
        self.duplicate_domains += other.duplicate_domains;
        self.path_rules += other.path_rules;
        self.wildcard_rules += other.wildcard_rules;
        self.v2ray_with_tags += other.v2ray_with_tags;
        self.csv_rows += other.csv_rows;
        self.csv_invalid_urls += other.csv_invalid_urls;
    }
}

/// Everything extracted from one source text
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    /// Whole-host domains, deduplicated in input order
    pub domains: Vec<String>,
    /// Domains whose rules targeted a specific path; the caller routes
    /// these through the path-rule policy
    pub path_domains: Vec<String>,
    /// Raw regex lines passed through without compilation
    pub raw_rules: Vec<String>,
    /// `old -> new` rewrite pairs
    pub replace: Vec<(String, String)>,
    pub stats: SourceStats,
}

impl ParsedSource {
    fn push_domain(&mut self, seen: &mut HashSet<String>, domain: String) {
        if seen.insert(domain.clone()) {
            self.domains.push(domain);
            self.stats.parsed_domains += 1;
        } else {
            self.stats.duplicate_domains += 1;
        }
    }

    fn push_path_domain(&mut self, seen: &mut HashSet<String>, domain: String) {
        if seen.insert(domain.clone()) {
            self.path_domains.push(domain);
            self.stats.parsed_domains += 1;
        } else {
            self.stats.duplicate_domains += 1;
        }
    }
}

/// Parse one source text according to its declared format.
///
/// CSV sources require a [`CsvConfig`]; every other format ignores it.
pub fn parse_source(
    text: &str,
    format: SourceFormat,
    parsing: &ParsingConfig,
    csv_config: Option<&CsvConfig>,
) -> Result<ParsedSource> {
    let mut parsed = ParsedSource::default();
    let mut seen: HashSet<String> = HashSet::new();

    match format {
        SourceFormat::Csv => {
            let csv_config = csv_config.ok_or_else(|| {
                RulegenError::ConfigError("csv format requires a csv config block".to_string())
            })?;
            for domain in csv::parse(text, csv_config, &mut parsed.stats)? {
                parsed.push_domain(&mut seen, domain);
            }
            return Ok(parsed);
        }
        SourceFormat::Classify => {
            return Err(RulegenError::ConfigError(
                "classify sources are loaded through the classifier, not as a domain source"
                    .to_string(),
            ));
        }
        _ => {}
    }

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        parsed.stats.total_lines += 1;

        match format {
            SourceFormat::Domain => match strip_inline_comment(line) {
                None => parsed.stats.ignored_comments += 1,
                Some(content) => match clean_domain(content, parsing) {
                    Some(domain) => parsed.push_domain(&mut seen, domain),
                    None => parsed.stats.invalid_domains += 1,
                },
            },

            SourceFormat::Ublock => match ublock::parse_line(line, parsing) {
                ublock::UblockLine::Comment => parsed.stats.ignored_comments += 1,
                ublock::UblockLine::Invalid { is_path_rule } => {
                    if is_path_rule {
                        parsed.stats.path_rules += 1;
                    } else {
                        parsed.stats.invalid_domains += 1;
                    }
                }
                ublock::UblockLine::Domain {
                    domain,
                    is_path_rule,
                    is_wildcard,
                } => {
                    if is_wildcard {
                        parsed.stats.wildcard_rules += 1;
                    }
                    if is_path_rule {
                        parsed.stats.path_rules += 1;
                        if !parsing.ignore_specific_paths {
                            parsed.push_path_domain(&mut seen, domain);
                        }
                    } else {
                        parsed.push_domain(&mut seen, domain);
                    }
                }
            },

            SourceFormat::V2ray => match v2ray::parse_line(line, parsing) {
                v2ray::V2rayLine::Comment => parsed.stats.ignored_comments += 1,
                v2ray::V2rayLine::Invalid => parsed.stats.invalid_domains += 1,
                v2ray::V2rayLine::Domain { domain, tagged } => {
                    if tagged {
                        parsed.stats.v2ray_with_tags += 1;
                    }
                    parsed.push_domain(&mut seen, domain);
                }
            },

            SourceFormat::Regex => {
                if line.starts_with('#') {
                    parsed.stats.ignored_comments += 1;
                } else {
                    parsed.raw_rules.push(line.to_string());
                    parsed.stats.parsed_domains += 1;
                }
            }

            SourceFormat::Replace => {
                if line.starts_with('#') {
                    parsed.stats.ignored_comments += 1;
                } else if let Some((old, new)) = line.split_once('=') {
                    let (old, new) = (old.trim(), new.trim());
                    if old.is_empty() || new.is_empty() {
                        parsed.stats.invalid_domains += 1;
                    } else {
                        parsed.replace.push((old.to_string(), new.to_string()));
                        parsed.stats.parsed_domains += 1;
                    }
                } else {
                    parsed.stats.invalid_domains += 1;
                }
            }

            SourceFormat::Csv | SourceFormat::Classify => unreachable!("handled above"),
        }
    }

    Ok(parsed)
}

/// Strip a trailing `#` comment. Returns `None` when nothing but the
/// comment remains.
fn strip_inline_comment(line: &str) -> Option<&str> {
    let content = match line.find('#') {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    };
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}
