//! End-to-end pipeline tests: file sources in, YAML rule files out.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use hostname_rulegen_r::{
    Action, AutoClassifyConfig, Generator, GeneratorConfig, OutputConfig, OutputMode,
    SourceConfig, SourceFormat,
};
use regex::Regex;

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("hostname_rulegen_pipeline").join(name);
    let _ = fs::create_dir_all(&dir);
    dir
}

fn write_file(dir: &PathBuf, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    path
}

fn file_source(name: &str, path: PathBuf, action: Action, format: SourceFormat) -> SourceConfig {
    SourceConfig {
        name: name.to_string(),
        url: None,
        file: Some(path),
        action,
        format,
        csv: None,
        enabled: true,
    }
}

fn rule_matches(rule: &str, domain: &str) -> bool {
    Regex::new(&format!("^{}", rule.replace("(.*\\.)?", "(?:.*\\.)?")))
        .unwrap()
        .is_match(domain)
}

#[test]
fn test_separate_files_pipeline() {
    let dir = test_dir("separate");
    let blocklist = write_file(
        &dir,
        "farms.txt",
        "*://contentfarm-a.example.com/*\n*://contentfarm-b.example.com/*\n||cloner.example.net^\n",
    );
    let whitelist = write_file(&dir, "good.txt", "docs.example.org\nwiki.example.org\n");

    let out_dir = dir.join("rules");
    let config = GeneratorConfig {
        sources: vec![
            file_source("farms", blocklist, Action::Remove, SourceFormat::Ublock),
            file_source("good", whitelist, Action::HighPriority, SourceFormat::Domain),
        ],
        auto_classify: AutoClassifyConfig {
            enabled: false,
            ..AutoClassifyConfig::default()
        },
        output: OutputConfig {
            mode: OutputMode::SeparateFiles,
            directory: out_dir.clone(),
            ..OutputConfig::default()
        },
        ..GeneratorConfig::default()
    };

    let summary = Generator::new(config).run().unwrap();
    assert_eq!(summary.written.len(), 5);

    // The remove file parses back into rules covering the blocklist
    let remove_text = fs::read_to_string(out_dir.join("remove-hosts.yml")).unwrap();
    let yaml_body: String = remove_text
        .lines()
        .filter(|l| !l.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let remove_rules: Vec<String> = serde_yaml::from_str(&yaml_body).unwrap();
    assert!(!remove_rules.is_empty());

    for domain in [
        "contentfarm-a.example.com",
        "contentfarm-b.example.com",
        "cloner.example.net",
        "sub.cloner.example.net",
    ] {
        assert!(
            remove_rules.iter().any(|r| rule_matches(r, domain)),
            "{} not covered by remove rules",
            domain
        );
    }
    assert!(!remove_rules
        .iter()
        .any(|r| rule_matches(r, "docs.example.org")));

    // High-priority rules live in their own file
    let high_text = fs::read_to_string(out_dir.join("high-priority-hosts.yml")).unwrap();
    let yaml_body: String = high_text
        .lines()
        .filter(|l| !l.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let high_rules: Vec<String> = serde_yaml::from_str(&yaml_body).unwrap();
    assert!(high_rules.iter().any(|r| rule_matches(r, "docs.example.org")));

    // The main config references every category file
    let main_text = fs::read_to_string(out_dir.join("hostnames-config.yml")).unwrap();
    for file in [
        "remove-hosts.yml",
        "low-priority-hosts.yml",
        "high-priority-hosts.yml",
        "rewrite-hosts.yml",
    ] {
        assert!(main_text.contains(file), "main config missing {}", file);
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_single_file_pipeline_with_classify_and_replace() {
    let dir = test_dir("single");
    let blocklist = write_file(
        &dir,
        "mixed.txt",
        "spamfarm.example.com\nrescued.example.com\n",
    );

    let out_dir = dir.join("rules");
    let config = GeneratorConfig {
        sources: vec![file_source(
            "mixed",
            blocklist,
            Action::Remove,
            SourceFormat::Domain,
        )],
        auto_classify: AutoClassifyConfig {
            enabled: true,
            sources: Vec::new(),
            rules: vec![
                "high_priority:rescued.example.com".to_string(),
                "replace:mobile.example.com=www.example.com".to_string(),
            ],
        },
        output: OutputConfig {
            mode: OutputMode::SingleFile,
            directory: out_dir.clone(),
            ..OutputConfig::default()
        },
        ..GeneratorConfig::default()
    };

    let summary = Generator::new(config).run().unwrap();
    assert_eq!(summary.written.len(), 1);

    let text = fs::read_to_string(&summary.written[0]).unwrap();
    let yaml_body: String = text
        .lines()
        .filter(|l| !l.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    #[derive(serde::Deserialize)]
    struct Doc {
        hostnames: Body,
    }
    #[derive(serde::Deserialize)]
    struct Body {
        replace: BTreeMap<String, String>,
        remove: Vec<String>,
        low_priority: Vec<String>,
        high_priority: Vec<String>,
    }

    let doc: Doc = serde_yaml::from_str(&yaml_body).unwrap();

    // The classify rule pulled the rescued domain out of remove
    assert!(doc
        .hostnames
        .remove
        .iter()
        .any(|r| rule_matches(r, "spamfarm.example.com")));
    assert!(!doc
        .hostnames
        .remove
        .iter()
        .any(|r| rule_matches(r, "rescued.example.com")));
    assert!(doc
        .hostnames
        .high_priority
        .iter()
        .any(|r| rule_matches(r, "rescued.example.com")));
    assert!(doc.hostnames.low_priority.is_empty());

    // The replace rule became an anchored rewrite entry
    assert_eq!(
        doc.hostnames.replace.get("(.*\\.)?mobile\\.example\\.com$"),
        Some(&"www.example.com".to_string())
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_path_rule_policies_end_to_end() {
    let dir = test_dir("paths");
    let blocklist = write_file(
        &dir,
        "paths.txt",
        "wholehost.example.com\npathonly.example.com/bad/section\n",
    );

    let out_dir = dir.join("rules");
    let mut config = GeneratorConfig {
        sources: vec![file_source(
            "paths",
            blocklist,
            Action::Remove,
            SourceFormat::Ublock,
        )],
        auto_classify: AutoClassifyConfig {
            enabled: false,
            ..AutoClassifyConfig::default()
        },
        output: OutputConfig {
            mode: OutputMode::SingleFile,
            directory: out_dir,
            ..OutputConfig::default()
        },
        ..GeneratorConfig::default()
    };
    // Smart policy is the default: remove-source path rules demote
    let summary = Generator::new(config.clone()).generate().unwrap();
    assert!(summary
        .rules
        .remove
        .iter()
        .any(|r| rule_matches(r, "wholehost.example.com")));
    assert!(summary
        .rules
        .low_priority
        .iter()
        .any(|r| rule_matches(r, "pathonly.example.com")));

    // Dropping path rules entirely
    config.parsing.ignore_specific_paths = true;
    let summary = Generator::new(config).generate().unwrap();
    assert!(!summary
        .rules
        .low_priority
        .iter()
        .any(|r| rule_matches(r, "pathonly.example.com")));

    let _ = fs::remove_dir_all(&dir);
}
