//! The domain-to-regex compression engine.
//!
//! Takes a validated, deduplicated domain set and synthesizes the
//! smallest set of anchored regex rules that match exactly those
//! domains and their subdomains, without ever losing a TLD and while
//! respecting configurable per-rule size limits.
//!
//! The engine is pure and synchronous: no I/O, no shared state, and
//! identical input plus identical config always produces byte-identical
//! output.

mod batch;
mod factor;
mod partition;
mod synth;
mod tldmerge;

pub use factor::{common_prefix, common_suffix};
pub use partition::{group_by_tld, sort_for_merge, split_base_tld, OTHER_BUCKET};
pub use synth::{synthesize, Pattern, SynthOptions};
pub use tldmerge::tld_group_pattern;

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use batch::{batch_rules, finalize};

/// Compiler tuning knobs. Field defaults match the stock generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Merge domains into shared rules at all; off means one rule per domain
    pub merge_domains: bool,
    /// Upper bound of domains covered by one rule
    pub max_domains_per_rule: usize,
    /// Advisory upper bound of one rule's text length
    pub max_rule_length: usize,
    /// Partition domains by final label before batching
    pub group_by_tld: bool,
    pub enable_prefix_optimization: bool,
    pub enable_suffix_optimization: bool,
    pub min_common_prefix_length: usize,
    pub min_common_suffix_length: usize,
    /// Emit one rule covering the whole set, ignoring batch limits
    pub force_single_regex: bool,
    /// Sort by (tld, base) before merging to cluster mergeable domains
    pub sort_before_merge: bool,
    /// Use the TLD-preserving group builder instead of plain synthesis
    pub enable_advanced_tld_merge: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            merge_domains: true,
            max_domains_per_rule: 256,
            max_rule_length: 65536,
            group_by_tld: true,
            enable_prefix_optimization: true,
            enable_suffix_optimization: true,
            min_common_prefix_length: 3,
            min_common_suffix_length: 3,
            force_single_regex: false,
            sort_before_merge: true,
            enable_advanced_tld_merge: true,
        }
    }
}

/// Immutable per-run counters returned alongside the rule set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompilationStats {
    pub input_domains: usize,
    pub rules_emitted: usize,
    pub tld_groups: usize,
    pub singleton_overruns: usize,
    pub longest_rule_len: usize,
}

/// Result of one compiler invocation
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    /// Anchored rules of shape `(.*\.)?(PATTERN)$`
    pub rules: Vec<String>,
    pub stats: CompilationStats,
}

/// Compile a domain set into a list of anchored regex rules.
///
/// An empty set compiles to an empty list. Input domains are assumed
/// validated and lowercase (see `hostname`); the compiler performs no
/// redundant validation.
pub fn compile(domains: &BTreeSet<String>, config: &CompilerConfig) -> CompileOutput {
    let mut stats = CompilationStats {
        input_domains: domains.len(),
        ..CompilationStats::default()
    };

    if domains.is_empty() {
        return CompileOutput {
            rules: Vec::new(),
            stats,
        };
    }

    let mut ordered: Vec<String> = domains.iter().cloned().collect();
    if config.sort_before_merge {
        sort_for_merge(&mut ordered);
    }

    let rules = if config.force_single_regex {
        vec![single_regex_rule(&ordered, config, &mut stats)]
    } else if !config.merge_domains {
        ordered
            .iter()
            .map(|d| finalize(&regex::escape(d)))
            .collect()
    } else if config.group_by_tld {
        let groups = group_by_tld(&ordered);
        stats.tld_groups = groups.len();
        let mut rules = Vec::new();
        for (tld, group) in &groups {
            let outcome = batch_rules(group, Some(tld.as_str()), config);
            debug!(
                ".{}: {} domains -> {} rules",
                tld,
                group.len(),
                outcome.rules.len()
            );
            stats.singleton_overruns += outcome.singleton_overruns;
            rules.extend(outcome.rules);
        }
        rules
    } else {
        let outcome = batch_rules(&ordered, None, config);
        stats.singleton_overruns += outcome.singleton_overruns;
        outcome.rules
    };

    stats.rules_emitted = rules.len();
    stats.longest_rule_len = rules.iter().map(String::len).max().unwrap_or(0);

    CompileOutput { rules, stats }
}

/// Build the one rule covering every domain in the set
fn single_regex_rule(
    ordered: &[String],
    config: &CompilerConfig,
    stats: &mut CompilationStats,
) -> String {
    if ordered.len() == 1 {
        return finalize(&regex::escape(&ordered[0]));
    }

    if config.enable_advanced_tld_merge {
        let opts = SynthOptions::from_config(config);
        let groups = group_by_tld(ordered);
        stats.tld_groups = groups.len();

        let branches: Vec<String> = groups
            .iter()
            .map(|(tld, group)| {
                if group.len() == 1 {
                    regex::escape(&group[0])
                } else {
                    tld_group_pattern(group, tld, &opts)
                }
            })
            .collect();

        finalize(&branches.join("|"))
    } else {
        let escaped: Vec<String> = ordered.iter().map(|d| regex::escape(d)).collect();
        finalize(&escaped.join("|"))
    }
}
