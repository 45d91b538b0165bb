//! YAML rule serialization.
//!
//! Two layouts: one file per category referenced from a small main
//! config, or everything nested under a single `hostnames:` mapping.
//! Empty categories still produce their files so downstream configs
//! can reference them unconditionally.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::config::{OutputConfig, OutputMode};
use crate::error::{Result, RulegenError};

/// Final rule payload per category, sorted and deduplicated
#[derive(Debug, Clone, Default)]
pub struct GeneratedRules {
    /// `old-regex -> new domain` rewrite map
    pub replace: BTreeMap<String, String>,
    pub remove: Vec<String>,
    pub low_priority: Vec<String>,
    pub high_priority: Vec<String>,
    /// Domains behind each category, for file headers and summaries
    pub domain_counts: BTreeMap<String, usize>,
}

impl GeneratedRules {
    pub fn total_rules(&self) -> usize {
        self.replace.len() + self.remove.len() + self.low_priority.len() + self.high_priority.len()
    }

    pub fn total_domains(&self) -> usize {
        self.domain_counts.values().sum()
    }

    fn domain_count(&self, category: &str) -> usize {
        self.domain_counts.get(category).copied().unwrap_or(0)
    }
}

#[derive(Serialize)]
struct SingleFileDoc<'a> {
    hostnames: HostnamesBody<'a>,
}

#[derive(Serialize)]
struct HostnamesBody<'a> {
    replace: &'a BTreeMap<String, String>,
    remove: &'a [String],
    low_priority: &'a [String],
    high_priority: &'a [String],
}

#[derive(Serialize)]
struct MainConfigDoc<'a> {
    hostnames: BTreeMap<&'a str, &'a str>,
}

/// Write the rules using the configured layout, returning the paths
/// that were written.
pub fn write_rules(rules: &GeneratedRules, config: &OutputConfig) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.directory).map_err(|e| {
        RulegenError::OutputError(format!(
            "cannot create output directory '{}': {}",
            config.directory.display(),
            e
        ))
    })?;

    match config.mode {
        OutputMode::SeparateFiles => write_separate_files(rules, config),
        OutputMode::SingleFile => write_single_file(rules, config),
    }
}

fn header(category: &str, rule_count: usize, domain_count: usize) -> String {
    format!(
        "# SearXNG {} rules\n# Total rules: {}, Total domains: {}\n\n",
        category, rule_count, domain_count
    )
}

fn write_separate_files(rules: &GeneratedRules, config: &OutputConfig) -> Result<Vec<PathBuf>> {
    let files = &config.files;
    let mut written = Vec::new();
    let mut main_entries: BTreeMap<&str, &str> = BTreeMap::new();

    // (category, file name, serialized body, rule count)
    let docs: [(&str, &str, String, usize); 4] = [
        (
            "replace",
            files.replace.as_str(),
            serde_yaml::to_string(&rules.replace)?,
            rules.replace.len(),
        ),
        (
            "remove",
            files.remove.as_str(),
            serde_yaml::to_string(&rules.remove)?,
            rules.remove.len(),
        ),
        (
            "low_priority",
            files.low_priority.as_str(),
            serde_yaml::to_string(&rules.low_priority)?,
            rules.low_priority.len(),
        ),
        (
            "high_priority",
            files.high_priority.as_str(),
            serde_yaml::to_string(&rules.high_priority)?,
            rules.high_priority.len(),
        ),
    ];

    for (category, filename, body, rule_count) in docs {
        let path = config.directory.join(filename);
        let content = format!(
            "{}{}",
            header(category, rule_count, rules.domain_count(category)),
            body
        );
        fs::write(&path, content)?;
        info!("wrote {} {} rules to {}", rule_count, category, path.display());
        main_entries.insert(category, filename);
        written.push(path);
    }

    let main_doc = MainConfigDoc {
        hostnames: main_entries,
    };
    let main_path = config.directory.join(&files.main_config);
    let content = format!(
        "# SearXNG hostnames configuration\n# This file references external rule files\n\n{}",
        serde_yaml::to_string(&main_doc)?
    );
    fs::write(&main_path, content)?;
    info!("wrote main config to {}", main_path.display());
    written.push(main_path);

    Ok(written)
}

fn write_single_file(rules: &GeneratedRules, config: &OutputConfig) -> Result<Vec<PathBuf>> {
    let doc = SingleFileDoc {
        hostnames: HostnamesBody {
            replace: &rules.replace,
            remove: &rules.remove,
            low_priority: &rules.low_priority,
            high_priority: &rules.high_priority,
        },
    };

    let path = config.directory.join("hostnames.yml");
    let content = format!(
        "# SearXNG hostnames configuration\n# Total rules: {}, Total domains: {}\n\n{}",
        rules.total_rules(),
        rules.total_domains(),
        serde_yaml::to_string(&doc)?
    );
    fs::write(&path, content)?;
    info!(
        "wrote {} rules to {}",
        rules.total_rules(),
        path.display()
    );

    Ok(vec![path])
}
