//! Greedy batching of a domain group into size-limited rules.

use log::warn;

use super::synth::{synthesize, SynthOptions};
use super::tldmerge::tld_group_pattern;
use super::CompilerConfig;

/// Anchor an unanchored fragment into a finished rule
pub(crate) fn finalize(pattern: &str) -> String {
    format!("(.*\\.)?({})$", pattern)
}

/// Rules produced for one group plus the advisory overrun count
#[derive(Debug, Default)]
pub(crate) struct BatchOutcome {
    pub rules: Vec<String>,
    pub singleton_overruns: usize,
}

/// Build the rule string covering one batch
fn rule_for_batch(
    batch: &[String],
    tld: Option<&str>,
    config: &CompilerConfig,
    opts: &SynthOptions,
) -> String {
    if batch.len() == 1 {
        return finalize(&regex::escape(&batch[0]));
    }
    match tld {
        Some(tld) if config.enable_advanced_tld_merge => {
            finalize(&tld_group_pattern(batch, tld, opts))
        }
        _ => finalize(&synthesize(batch, opts).render()),
    }
}

/// Greedily partition `domains` into rules respecting the configured
/// count and length limits.
///
/// Single pass: each domain is tentatively appended and the batch rule
/// re-synthesized; on a limit breach the previous batch is flushed and
/// the rejected domain opens a new one. A lone domain whose minimal
/// rule already exceeds the length limit is still emitted whole — the
/// limit is advisory, coverage is not negotiable.
pub(crate) fn batch_rules(
    domains: &[String],
    tld: Option<&str>,
    config: &CompilerConfig,
) -> BatchOutcome {
    let opts = SynthOptions::from_config(config);
    let mut outcome = BatchOutcome::default();

    let mut current: Vec<String> = Vec::new();
    // Rule text for `current`, kept from the last accepted append
    let mut current_rule: Option<String> = None;

    for domain in domains {
        let mut test = current.clone();
        test.push(domain.clone());
        let test_rule = rule_for_batch(&test, tld, config, &opts);

        let breaches =
            test.len() > config.max_domains_per_rule || test_rule.len() > config.max_rule_length;

        if breaches && !current.is_empty() {
            flush(&mut outcome, &mut current, &mut current_rule, config);
            current.push(domain.clone());
            current_rule = Some(rule_for_batch(&current, tld, config, &opts));
        } else {
            current = test;
            current_rule = Some(test_rule);
        }
    }

    if !current.is_empty() {
        flush(&mut outcome, &mut current, &mut current_rule, config);
    }

    outcome
}

fn flush(
    outcome: &mut BatchOutcome,
    current: &mut Vec<String>,
    current_rule: &mut Option<String>,
    config: &CompilerConfig,
) {
    let rule = current_rule
        .take()
        .expect("flush called with a non-empty batch but no rule");
    if current.len() == 1 && rule.len() > config.max_rule_length {
        warn!(
            "single-domain rule for {} exceeds max_rule_length ({} > {}), emitting anyway",
            current[0],
            rule.len(),
            config.max_rule_length
        );
        outcome.singleton_overruns += 1;
    }
    outcome.rules.push(rule);
    current.clear();
}
