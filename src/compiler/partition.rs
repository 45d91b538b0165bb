//! Domain partitioning: (base, tld) splitting and TLD grouping.
//!
//! The "TLD" here is simply the final dot-separated label used as a
//! grouping key, not a public suffix: `example.co.uk` groups under `uk`
//! with base `example.co`. The full suffix stays inside the base, so
//! grouping granularity is coarser but coverage is unaffected.

use std::collections::BTreeMap;

/// Bucket for domains with fewer than two labels
pub const OTHER_BUCKET: &str = "other";

/// Split a domain into (base, tld) where tld is the final label.
///
/// Domains without a dot return `(domain, "")`.
pub fn split_base_tld(domain: &str) -> (&str, &str) {
    match domain.rsplit_once('.') {
        Some((base, tld)) => (base, tld),
        None => (domain, ""),
    }
}

/// Sort key that clusters mergeable domains: primary by TLD, secondary
/// by base. Domains without a dot sort by their full text.
fn merge_sort_key(domain: &str) -> (String, String) {
    match domain.rsplit_once('.') {
        Some((base, tld)) => (tld.to_string(), base.to_string()),
        None => (domain.to_string(), String::new()),
    }
}

/// Sort domains by the merge key `(tld, base)`
pub fn sort_for_merge(domains: &mut [String]) {
    domains.sort_by_key(|d| merge_sort_key(d));
}

/// Group domains by their final label, preserving the incoming order
/// within each group. Domains with fewer than two labels land in the
/// `"other"` bucket.
pub fn group_by_tld(domains: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for domain in domains {
        let key = match domain.rsplit_once('.') {
            Some((_, tld)) => tld.to_string(),
            None => OTHER_BUCKET.to_string(),
        };
        groups.entry(key).or_default().push(domain.clone());
    }
    groups
}
