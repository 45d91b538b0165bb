//! Recursive pattern synthesis over base strings.
//!
//! Factoring is modeled as an algebraic tree and rendered to regex text
//! only at the end, so tests can assert structure instead of strings.

use super::factor::{common_prefix, common_suffix};
use super::CompilerConfig;

/// A synthesized regex fragment before rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// A raw string, escaped at render time
    Literal(String),
    /// Common prefix factored out: `esc(prefix)(inner)`
    Prefix(String, Box<Pattern>),
    /// Common suffix factored out: `(inner)esc(suffix)`
    Suffix(Box<Pattern>, String),
    /// Plain alternation: `a|b|c` (unparenthesized)
    Alternation(Vec<Pattern>),
}

impl Pattern {
    /// Render to an unanchored regex fragment. All literals are
    /// escaped here; no other code path escapes.
    pub fn render(&self) -> String {
        match self {
            Pattern::Literal(s) => regex::escape(s),
            Pattern::Prefix(prefix, inner) => {
                format!("{}({})", regex::escape(prefix), inner.render())
            }
            Pattern::Suffix(inner, suffix) => {
                format!("({}){}", inner.render(), regex::escape(suffix))
            }
            Pattern::Alternation(items) => items
                .iter()
                .map(Pattern::render)
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

/// Knobs for the factoring recursion, lifted from the compiler config
#[derive(Debug, Clone, Copy)]
pub struct SynthOptions {
    pub prefix_enabled: bool,
    pub suffix_enabled: bool,
    pub min_prefix_len: usize,
    pub min_suffix_len: usize,
}

impl SynthOptions {
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            prefix_enabled: config.enable_prefix_optimization,
            suffix_enabled: config.enable_suffix_optimization,
            min_prefix_len: config.min_common_prefix_length,
            min_suffix_len: config.min_common_suffix_length,
        }
    }
}

/// Count distinct entries without allocating a set
fn distinct_count(items: &[String]) -> usize {
    let mut sorted: Vec<&String> = items.iter().collect();
    sorted.sort();
    sorted.dedup();
    sorted.len()
}

/// Recursively factor a list of base strings into a minimal pattern.
///
/// Per level: try prefix factoring, then suffix factoring, then fall
/// back to a plain alternation. A factoring attempt is rejected when
/// any residue would be empty — the stripped string would otherwise
/// vanish from the alternation entirely.
pub fn synthesize(items: &[String], opts: &SynthOptions) -> Pattern {
    if items.is_empty() {
        return Pattern::Alternation(Vec::new());
    }
    if items.len() == 1 {
        return Pattern::Literal(items[0].clone());
    }

    if opts.prefix_enabled {
        let prefix = common_prefix(items);
        if prefix.len() >= opts.min_prefix_len {
            let residues: Vec<String> = items
                .iter()
                .filter_map(|s| s.strip_prefix(&prefix))
                .map(str::to_string)
                .collect();
            if residues.len() == items.len()
                && residues.iter().all(|r| !r.is_empty())
                && distinct_count(&residues) >= 2
            {
                return Pattern::Prefix(prefix, Box::new(synthesize(&residues, opts)));
            }
        }
    }

    if opts.suffix_enabled {
        let suffix = common_suffix(items);
        if suffix.len() >= opts.min_suffix_len {
            let residues: Vec<String> = items
                .iter()
                .filter_map(|s| s.strip_suffix(&suffix))
                .map(str::to_string)
                .collect();
            if residues.len() == items.len()
                && residues.iter().all(|r| !r.is_empty())
                && distinct_count(&residues) >= 2
            {
                return Pattern::Suffix(Box::new(synthesize(&residues, opts)), suffix);
            }
        }
    }

    Pattern::Alternation(items.iter().cloned().map(Pattern::Literal).collect())
}
