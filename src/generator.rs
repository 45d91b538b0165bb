//! End-to-end rule generation: collect domains from every configured
//! source, classify, compile per category, and serialize.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::classify::Classifier;
use crate::compiler::{compile, CompilationStats};
use crate::config::{GeneratorConfig, SourceConfig};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::output::{write_rules, GeneratedRules};
use crate::parse::{parse_source, ParsedSource, SourceStats};
use crate::types::{Action, CategorizedDomains};

/// Ingestion counters aggregated over all sources
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub sources_processed: usize,
    pub sources_failed: usize,
    pub parse: SourceStats,
    /// Domains suppressed by skip rules
    pub skipped_from_sources: usize,
    /// Domains rerouted by an explicit classify assignment
    pub auto_classified: usize,
    pub path_kept_action: usize,
    pub path_to_low_priority: usize,
    pub path_ignored: usize,
    /// Domains added straight from classify rules
    pub auto_added: usize,
    pub skip_overridden: usize,
}

/// Everything a generation run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    pub rules: GeneratedRules,
    pub ingest: IngestStats,
    /// Compiler stats per category
    pub compile_stats: BTreeMap<String, CompilationStats>,
    /// Paths written, empty until `run` serializes
    pub written: Vec<PathBuf>,
}

/// Raw regex lines routed straight into a category's output
#[derive(Debug, Default)]
struct RawRules {
    remove: Vec<String>,
    low_priority: Vec<String>,
    high_priority: Vec<String>,
}

impl RawRules {
    fn push(&mut self, action: Action, rule: String) {
        match action {
            Action::Remove => self.remove.push(rule),
            Action::LowPriority => self.low_priority.push(rule),
            Action::HighPriority => self.high_priority.push(rule),
            Action::Replace | Action::Skip => {}
        }
    }
}

#[derive(Debug, Default)]
struct CollectOutcome {
    categorized: CategorizedDomains,
    raw: RawRules,
    stats: IngestStats,
}

/// The generator facade: owns the config and the HTTP fetcher
pub struct Generator {
    config: GeneratorConfig,
    fetcher: Fetcher,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let fetcher = Fetcher::new(&config.request);
        Self { config, fetcher }
    }

    /// Force single-regex output regardless of the config file
    pub fn with_force_single_regex(mut self, force: bool) -> Self {
        if force {
            self.config.optimization.force_single_regex = true;
        }
        self
    }

    /// Override the output directory
    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output.directory = dir.into();
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate rules and write them out
    pub fn run(&self) -> Result<RunSummary> {
        let mut summary = self.generate()?;
        summary.written = write_rules(&summary.rules, &self.config.output)?;
        self.log_summary(&summary);
        Ok(summary)
    }

    /// Generate rules without touching the filesystem output
    pub fn generate(&self) -> Result<RunSummary> {
        let classifier = Classifier::load(&self.config.auto_classify, &self.fetcher);

        let mut outcome = self.collect(&classifier)?;

        let direct = classifier.apply_direct(&mut outcome.categorized, &self.config.parsing);
        outcome.stats.auto_added = direct.auto_added;
        outcome.stats.skip_overridden = direct.skip_overridden;

        let mut compile_stats = BTreeMap::new();
        let rules = self.build_rules(&outcome, &mut compile_stats);

        Ok(RunSummary {
            rules,
            ingest: outcome.stats,
            compile_stats,
            written: Vec::new(),
        })
    }

    /// Fetch and parse every enabled source, routing each domain to
    /// its category. Classify rules outrank the source action; skip
    /// rules suppress source domains unless an assignment overrides.
    fn collect(&self, classifier: &Classifier) -> Result<CollectOutcome> {
        let mut outcome = CollectOutcome::default();

        for source in &self.config.sources {
            if !source.enabled {
                continue;
            }

            let text = match self.load_source_text(source) {
                Some(text) => text,
                None => {
                    outcome.stats.sources_failed += 1;
                    continue;
                }
            };

            let parsed = match parse_source(
                &text,
                source.format,
                &self.config.parsing,
                source.csv.as_ref(),
            ) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!("source '{}' not parseable: {}", source.name, err);
                    outcome.stats.sources_failed += 1;
                    continue;
                }
            };

            info!(
                "source '{}': {} domains, {} path rules, {} invalid",
                source.name,
                parsed.stats.parsed_domains,
                parsed.stats.path_rules,
                parsed.stats.invalid_domains
            );

            self.route_parsed(source, parsed, classifier, &mut outcome);
            outcome.stats.sources_processed += 1;
        }

        Ok(outcome)
    }

    fn load_source_text(&self, source: &SourceConfig) -> Option<String> {
        if let Some(ref url) = source.url {
            match self.fetcher.fetch_text(url) {
                Ok(text) => Some(text),
                Err(err) => {
                    warn!("source '{}' unavailable: {}", source.name, err);
                    None
                }
            }
        } else if let Some(ref path) = source.file {
            match fs::read_to_string(path) {
                Ok(text) => Some(text),
                Err(err) => {
                    warn!(
                        "source '{}' unreadable ({}): {}",
                        source.name,
                        path.display(),
                        err
                    );
                    None
                }
            }
        } else {
            warn!("source '{}' has neither url nor file", source.name);
            None
        }
    }

    fn route_parsed(
        &self,
        source: &SourceConfig,
        parsed: ParsedSource,
        classifier: &Classifier,
        outcome: &mut CollectOutcome,
    ) {
        outcome.stats.parse.merge(&parsed.stats);

        for domain in parsed.domains {
            if classifier.should_skip(&domain) {
                outcome.stats.skipped_from_sources += 1;
                continue;
            }
            let action = match classifier.action_for(&domain) {
                Some(action) => {
                    outcome.stats.auto_classified += 1;
                    action
                }
                None => source.action,
            };
            if let Some(set) = outcome.categorized.set_mut(action) {
                set.insert(domain);
            }
        }

        // Path-rule domains go through the path policy unless an
        // explicit classify assignment claims them first
        let policy = self.config.parsing.specific_path_action;
        for domain in parsed.path_domains {
            if classifier.should_skip(&domain) {
                outcome.stats.skipped_from_sources += 1;
                continue;
            }
            let action = if let Some(action) = classifier.action_for(&domain) {
                outcome.stats.auto_classified += 1;
                Some(action)
            } else {
                policy.resolve(source.action)
            };
            match action {
                Some(Action::LowPriority) if source.action != Action::LowPriority => {
                    outcome.stats.path_to_low_priority += 1;
                    outcome
                        .categorized
                        .set_mut(Action::LowPriority)
                        .expect("low_priority has a backing set")
                        .insert(domain);
                }
                Some(action) => {
                    outcome.stats.path_kept_action += 1;
                    if let Some(set) = outcome.categorized.set_mut(action) {
                        set.insert(domain);
                    }
                }
                None => outcome.stats.path_ignored += 1,
            }
        }

        for rule in parsed.raw_rules {
            outcome.raw.push(source.action, rule);
        }

        // Replace pairs keep their left side verbatim: it may already
        // be a regex the caller wrote by hand
        for (old, new) in parsed.replace {
            outcome.categorized.replace.insert(old, new);
        }
    }

    /// Compile each category set, merge in fixed and raw rules, and
    /// sort/deduplicate everything for stable output.
    fn build_rules(
        &self,
        outcome: &CollectOutcome,
        compile_stats: &mut BTreeMap<String, CompilationStats>,
    ) -> GeneratedRules {
        let mut rules = GeneratedRules::default();

        // Config-level rewrite rules first, collected ones override
        rules.replace = self.config.replace_rules.clone();
        rules
            .replace
            .extend(outcome.categorized.replace.clone());
        rules
            .domain_counts
            .insert("replace".to_string(), rules.replace.len());

        let categories: [(&str, &BTreeSet<String>, &[String], &[String]); 3] = [
            (
                "remove",
                &outcome.categorized.remove,
                &self.config.fixed_remove,
                &outcome.raw.remove,
            ),
            (
                "low_priority",
                &outcome.categorized.low_priority,
                &self.config.fixed_low_priority,
                &outcome.raw.low_priority,
            ),
            (
                "high_priority",
                &outcome.categorized.high_priority,
                &self.config.fixed_high_priority,
                &outcome.raw.high_priority,
            ),
        ];

        for (category, domains, fixed, raw) in categories {
            let output = compile(domains, &self.config.optimization);
            info!(
                "{}: {} domains -> {} rules",
                category, output.stats.input_domains, output.stats.rules_emitted
            );

            // Dedup and sort for byte-stable output
            let mut merged: BTreeSet<String> = BTreeSet::new();
            merged.extend(fixed.iter().cloned());
            merged.extend(raw.iter().cloned());
            merged.extend(output.rules.iter().cloned());
            let merged: Vec<String> = merged.into_iter().collect();

            rules
                .domain_counts
                .insert(category.to_string(), domains.len() + fixed.len());
            compile_stats.insert(category.to_string(), output.stats);

            match category {
                "remove" => rules.remove = merged,
                "low_priority" => rules.low_priority = merged,
                "high_priority" => rules.high_priority = merged,
                _ => unreachable!(),
            }
        }

        rules
    }

    fn log_summary(&self, summary: &RunSummary) {
        let ingest = &summary.ingest;
        info!(
            "sources: {} processed, {} failed",
            ingest.sources_processed, ingest.sources_failed
        );
        info!(
            "lines: {} total, {} domains parsed, {} comments, {} invalid, {} duplicates",
            ingest.parse.total_lines,
            ingest.parse.parsed_domains,
            ingest.parse.ignored_comments,
            ingest.parse.invalid_domains,
            ingest.parse.duplicate_domains
        );
        if ingest.auto_classified > 0 || ingest.auto_added > 0 {
            info!(
                "classify: {} rerouted, {} added directly, {} skips overridden, {} skipped",
                ingest.auto_classified,
                ingest.auto_added,
                ingest.skip_overridden,
                ingest.skipped_from_sources
            );
        }
        if ingest.path_kept_action + ingest.path_to_low_priority + ingest.path_ignored > 0 {
            info!(
                "path rules: {} kept action, {} to low priority, {} ignored",
                ingest.path_kept_action, ingest.path_to_low_priority, ingest.path_ignored
            );
        }

        let total_rules = summary.rules.total_rules();
        let total_domains = summary.rules.total_domains();
        if total_domains > 0 && total_rules > 0 {
            info!(
                "compression: {} domains -> {} rules ({:.1}%)",
                total_domains,
                total_rules,
                (total_rules as f64 / total_domains as f64) * 100.0
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AutoClassifyConfig, OutputConfig, OutputMode};
    use crate::types::SourceFormat;
    use std::io::Write;

    fn test_config(sources: Vec<SourceConfig>, out_subdir: &str) -> GeneratorConfig {
        GeneratorConfig {
            sources,
            auto_classify: AutoClassifyConfig {
                enabled: false,
                ..AutoClassifyConfig::default()
            },
            output: OutputConfig {
                mode: OutputMode::SingleFile,
                directory: std::env::temp_dir()
                    .join("hostname_rulegen_gen_test")
                    .join(out_subdir),
                ..OutputConfig::default()
            },
            ..GeneratorConfig::default()
        }
    }

    fn file_source(name: &str, path: &std::path::Path, format: SourceFormat) -> SourceConfig {
        SourceConfig {
            name: name.to_string(),
            url: None,
            file: Some(path.to_path_buf()),
            action: Action::Remove,
            format,
            csv: None,
            enabled: true,
        }
    }

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("hostname_rulegen_gen_test");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_generate_from_file_source() {
        let path = write_temp("domains.txt", "spam-a.example.com\nspam-b.example.com\n");
        let config = test_config(vec![file_source("t", &path, SourceFormat::Domain)], "basic");
        let generator = Generator::new(config);
        let summary = generator.generate().unwrap();

        assert_eq!(summary.ingest.sources_processed, 1);
        assert_eq!(summary.ingest.parse.parsed_domains, 2);
        assert!(!summary.rules.remove.is_empty());
        assert_eq!(summary.rules.domain_counts["remove"], 2);
        assert_eq!(summary.compile_stats["remove"].input_domains, 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_generate_missing_file_is_not_fatal() {
        let config = test_config(
            vec![file_source(
                "gone",
                std::path::Path::new("/nonexistent/list.txt"),
                SourceFormat::Domain,
            )],
            "missing",
        );
        let generator = Generator::new(config);
        let summary = generator.generate().unwrap();
        assert_eq!(summary.ingest.sources_failed, 1);
        assert!(summary.rules.remove.is_empty());
    }

    #[test]
    fn test_classify_rules_override_source_action() {
        let path = write_temp(
            "classified.txt",
            "spam.example.com\nkeepme.example.com\nhoistme.example.com\n",
        );
        let mut config = test_config(vec![file_source("t", &path, SourceFormat::Domain)], "classify");
        config.auto_classify = AutoClassifyConfig {
            enabled: true,
            sources: Vec::new(),
            rules: vec![
                "skip:keepme.example.com".to_string(),
                "high_priority:hoistme.example.com".to_string(),
            ],
        };
        let generator = Generator::new(config);
        let summary = generator.generate().unwrap();

        assert_eq!(summary.ingest.skipped_from_sources, 1);
        assert_eq!(summary.ingest.auto_classified, 1);
        assert_eq!(summary.compile_stats["remove"].input_domains, 1);
        assert_eq!(summary.compile_stats["high_priority"].input_domains, 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_fixed_rules_appended() {
        let path = write_temp("fixed.txt", "spam.example.com\n");
        let mut config = test_config(vec![file_source("t", &path, SourceFormat::Domain)], "fixed");
        config.fixed_remove = vec!["(.*\\.)?(handwritten\\.example\\.net)$".to_string()];
        let generator = Generator::new(config);
        let summary = generator.generate().unwrap();

        assert!(summary
            .rules
            .remove
            .contains(&"(.*\\.)?(handwritten\\.example\\.net)$".to_string()));
        assert_eq!(summary.rules.domain_counts["remove"], 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_path_rules_smart_policy() {
        let path = write_temp(
            "ublock.txt",
            "whole.example.com\npartial.example.com/some/path\n",
        );
        let config = test_config(vec![file_source("t", &path, SourceFormat::Ublock)], "paths");
        let generator = Generator::new(config);
        let summary = generator.generate().unwrap();

        // Smart policy: path rule from a remove source becomes low priority
        assert_eq!(summary.ingest.path_to_low_priority, 1);
        assert_eq!(summary.compile_stats["remove"].input_domains, 1);
        assert_eq!(summary.compile_stats["low_priority"].input_domains, 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_replace_source_flows_to_rewrite_map() {
        let path = write_temp("replace.txt", "old.example.com=new.example.com\n");
        let mut source = file_source("t", &path, SourceFormat::Replace);
        source.action = Action::Replace;
        let config = test_config(vec![source], "replace");
        let generator = Generator::new(config);
        let summary = generator.generate().unwrap();

        assert_eq!(
            summary.rules.replace.get("old.example.com"),
            Some(&"new.example.com".to_string())
        );

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_run_writes_output() {
        let path = write_temp("run.txt", "spam.example.com\n");
        let config = test_config(vec![file_source("t", &path, SourceFormat::Domain)], "run_out");
        let out_dir = config.output.directory.clone();
        let generator = Generator::new(config);
        let summary = generator.run().unwrap();

        assert_eq!(summary.written.len(), 1);
        assert!(summary.written[0].exists());
        let text = fs::read_to_string(&summary.written[0]).unwrap();
        assert!(text.contains("hostnames:"));

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir_all(out_dir);
    }
}
