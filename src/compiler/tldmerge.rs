//! TLD-aware regex building for one group of domains.
//!
//! Every branch produced here ends in the escaped literal TLD. This is
//! the component that keeps `a.pixnet.net` from collapsing into a
//! pattern matching `*.pixnet` — the truncation class of defect.

use super::partition::split_base_tld;
use super::synth::{synthesize, SynthOptions};

/// Build the unanchored fragment covering all domains of one TLD group.
///
/// The caller guarantees the domains share the group's final label;
/// anything that does not (possible only in the catch-all bucket) is
/// kept as a whole-domain literal branch.
pub fn tld_group_pattern(domains: &[String], tld: &str, opts: &SynthOptions) -> String {
    if domains.is_empty() {
        return String::new();
    }
    if domains.len() == 1 {
        return regex::escape(&domains[0]);
    }

    let mut bases: Vec<String> = Vec::new();
    let mut literal_branches: Vec<String> = Vec::new();

    for domain in domains {
        let (base, actual_tld) = split_base_tld(domain);
        if actual_tld == tld {
            bases.push(base.to_string());
        } else {
            // Never force a truncated split on a mismatched domain
            literal_branches.push(regex::escape(domain));
        }
    }

    let mut branches: Vec<String> = Vec::new();
    if !bases.is_empty() {
        branches.push(bases_pattern(&bases, tld, opts));
    }
    branches.extend(literal_branches);

    if branches.len() == 1 {
        branches.into_iter().next().unwrap()
    } else {
        format!("({})", branches.join("|"))
    }
}

/// Pattern for bases that all carry the group TLD
fn bases_pattern(bases: &[String], tld: &str, opts: &SynthOptions) -> String {
    if bases.len() == 1 {
        return format!("{}\\.{}", regex::escape(&bases[0]), regex::escape(tld));
    }

    let simple: Vec<String> = bases.iter().filter(|b| !b.contains('.')).cloned().collect();
    let complex: Vec<String> = bases.iter().filter(|b| b.contains('.')).cloned().collect();

    if complex.is_empty() {
        return format!(
            "({})\\.{}",
            synthesize(&simple, opts).render(),
            regex::escape(tld)
        );
    }
    if simple.is_empty() {
        return complex_pattern(&complex, tld, opts);
    }

    // Mixed: build each side independently and alternate
    let simple_part = if simple.len() == 1 {
        format!("{}\\.{}", regex::escape(&simple[0]), regex::escape(tld))
    } else {
        format!(
            "({})\\.{}",
            synthesize(&simple, opts).render(),
            regex::escape(tld)
        )
    };
    let complex_part = complex_pattern(&complex, tld, opts);
    format!("({}|{})", simple_part, complex_part)
}

/// Pattern for multi-label bases, factoring out a shared trailing label
/// sequence when the structure allows it.
fn complex_pattern(bases: &[String], tld: &str, opts: &SynthOptions) -> String {
    if bases.len() == 1 {
        return format!("{}\\.{}", regex::escape(&bases[0]), regex::escape(tld));
    }

    // Structural attempt: every base must have the same label count and
    // identical labels after the first. Anything else degrades.
    let first_labels: Vec<&str> = bases[0].split('.').collect();
    let shared_tail = &first_labels[1..];
    let label_count = first_labels.len();

    let mut heads: Vec<String> = Vec::with_capacity(bases.len());
    let mut structure_holds = true;

    for base in bases {
        let labels: Vec<&str> = base.split('.').collect();
        if labels.len() != label_count || &labels[1..] != shared_tail {
            structure_holds = false;
            break;
        }
        heads.push(labels[0].to_string());
    }

    if structure_holds {
        let escaped_tail = shared_tail
            .iter()
            .map(|label| regex::escape(label))
            .collect::<Vec<_>>()
            .join("\\.");
        format!(
            "({})\\.{}\\.{}",
            synthesize(&heads, opts).render(),
            escaped_tail,
            regex::escape(tld)
        )
    } else {
        // Mandatory degrade path: plain escaped alternation
        let escaped: Vec<String> = bases.iter().map(|b| regex::escape(b)).collect();
        format!("({})\\.{}", escaped.join("|"), regex::escape(tld))
    }
}
