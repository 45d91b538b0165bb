use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RulegenError;

/// Output category for a collected domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Drop results from matching hosts
    Remove,
    /// Rank matching hosts below everything else
    LowPriority,
    /// Rank matching hosts above everything else
    HighPriority,
    /// Rewrite matching hosts to another domain
    Replace,
    /// Skip the domain when it comes from a data source
    Skip,
}

impl Action {
    /// Category key used in config and output files
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Remove => "remove",
            Action::LowPriority => "low_priority",
            Action::HighPriority => "high_priority",
            Action::Replace => "replace",
            Action::Skip => "skip",
        }
    }
}

impl FromStr for Action {
    type Err = RulegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remove" => Ok(Action::Remove),
            "low_priority" => Ok(Action::LowPriority),
            "high_priority" => Ok(Action::HighPriority),
            "replace" => Ok(Action::Replace),
            "skip" => Ok(Action::Skip),
            other => Err(RulegenError::UnknownAction(other.to_string())),
        }
    }
}

/// Text format of a blocklist source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// One domain per line, `#` comments
    Domain,
    /// uBlock Origin / uBlacklist filter syntax
    Ublock,
    /// v2ray `domain:` / `full:` rules
    V2ray,
    /// CSV with a URL column
    Csv,
    /// Raw regex lines passed through untouched
    Regex,
    /// `old_domain=new_domain` pairs
    Replace,
    /// `action:domain` auto-classify syntax
    Classify,
}

impl FromStr for SourceFormat {
    type Err = RulegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain" => Ok(SourceFormat::Domain),
            "ublock" => Ok(SourceFormat::Ublock),
            "v2ray" => Ok(SourceFormat::V2ray),
            "csv" => Ok(SourceFormat::Csv),
            "regex" => Ok(SourceFormat::Regex),
            "replace" => Ok(SourceFormat::Replace),
            "classify" => Ok(SourceFormat::Classify),
            other => Err(RulegenError::InvalidSourceFormat(other.to_string())),
        }
    }
}

/// How to categorize a uBlock rule that targets a specific path
/// rather than a whole host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRulePolicy {
    /// Keep the source's original action
    KeepAction,
    /// Force the domain into the low-priority category
    LowPriority,
    /// Drop the rule entirely
    Ignore,
    /// `remove` becomes `low_priority`, everything else keeps its action
    Smart,
}

impl PathRulePolicy {
    /// Resolve the final action for a path rule coming from a source
    /// with the given default action. `None` means the rule is dropped.
    pub fn resolve(&self, source_action: Action) -> Option<Action> {
        match self {
            PathRulePolicy::KeepAction => Some(source_action),
            PathRulePolicy::LowPriority => Some(Action::LowPriority),
            PathRulePolicy::Ignore => None,
            PathRulePolicy::Smart => match source_action {
                Action::Remove => Some(Action::LowPriority),
                other => Some(other),
            },
        }
    }
}

/// A single auto-classify rule parsed from `action:domain` syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyRule {
    /// Assign a domain (or `*.domain` wildcard) to a category
    Assign { action: Action, pattern: String },
    /// Rewrite one domain to another
    Replace { old: String, new: String },
}

/// Domains collected per output category, plus the rewrite map.
///
/// Sets are ordered so repeated runs over identical input produce
/// byte-identical output.
#[derive(Debug, Clone, Default)]
pub struct CategorizedDomains {
    pub remove: BTreeSet<String>,
    pub low_priority: BTreeSet<String>,
    pub high_priority: BTreeSet<String>,
    /// `anchored-old-regex -> new domain`
    pub replace: BTreeMap<String, String>,
}

impl CategorizedDomains {
    /// Mutable access to the set backing a category; `Replace` and
    /// `Skip` have no backing set.
    pub fn set_mut(&mut self, action: Action) -> Option<&mut BTreeSet<String>> {
        match action {
            Action::Remove => Some(&mut self.remove),
            Action::LowPriority => Some(&mut self.low_priority),
            Action::HighPriority => Some(&mut self.high_priority),
            Action::Replace | Action::Skip => None,
        }
    }

    /// Whether the domain is already present in any category set
    pub fn contains(&self, domain: &str) -> bool {
        self.remove.contains(domain)
            || self.low_priority.contains(domain)
            || self.high_priority.contains(domain)
    }

    /// Total number of collected domains across category sets
    pub fn domain_count(&self) -> usize {
        self.remove.len() + self.low_priority.len() + self.high_priority.len()
    }
}
