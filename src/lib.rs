//! Hostname Rulegen - a blocklist-to-regex rule compiler for search-engine host filters
//!
//! This library ingests domain blocklists in several text formats and
//! compiles them into regex hostname rules for the SearXNG `hostnames`
//! plugin (or any filter applying `^(?:.*\.)?PATTERN$` to hostnames):
//!
//! - Fetching blocklist sources over HTTP with retry
//! - Parsing uBlock/uBlacklist, v2ray, CSV, plain-domain, regex and
//!   replace rule formats
//! - Auto-classify rules overriding per-source actions
//! - A TLD-preserving domain-to-regex compression engine
//! - YAML rule output in separate-files or single-file layout
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use hostname_rulegen_r::{compile, CompilerConfig};
//!
//! let domains: BTreeSet<String> = ["www.example.com", "shop.example.com", "example.com"]
//!     .into_iter()
//!     .map(String::from)
//!     .collect();
//!
//! let output = compile(&domains, &CompilerConfig::default());
//!
//! // Every rule is anchored and keeps the full TLD
//! for rule in &output.rules {
//!     assert!(rule.starts_with("(.*\\.)?("));
//!     assert!(rule.ends_with(")$"));
//! }
//! assert_eq!(output.stats.input_domains, 3);
//! ```
//!
//! # Source Formats
//!
//! | Format | Example line | Extracted |
//! |--------|--------------|-----------|
//! | `domain` | `spam.example.com` | the domain |
//! | `ublock` | `*://*.spamfarm.net/*` | `spamfarm.net` |
//! | `v2ray` | `domain:example.com:@ads` | `example.com` |
//! | `csv` | `My Blog,https://blog.example.com/` | `blog.example.com` |
//! | `regex` | `(.*\.)?spam\.example\.com$` | passed through |
//! | `replace` | `old.example.com=new.example.com` | rewrite pair |
//! | `classify` | `high_priority:docs.example.org` | classify rule |
//!
//! # Output Categories
//!
//! Each collected domain lands in one of `remove`, `low_priority` or
//! `high_priority`; `replace` rules form a rewrite map. Classify rules
//! override source actions, and `skip` rules suppress source-supplied
//! domains without affecting explicit assignments.

pub mod classify;
pub mod compiler;
pub mod config;
pub mod error;
pub mod fetch;
pub mod generator;
pub mod hostname;
pub mod output;
pub mod parse;
pub mod types;

// Re-export commonly used items
pub use classify::{Classifier, DirectApplyStats};
pub use compiler::{
    compile, CompilationStats, CompileOutput, CompilerConfig, Pattern, SynthOptions,
};
pub use config::{
    AutoClassifyConfig, ClassifySourceConfig, CsvConfig, GeneratorConfig, OutputConfig,
    OutputFiles, OutputMode, ParsingConfig, RequestConfig, SourceConfig,
};
pub use error::{FetchErrorKind, Result, RulegenError};
pub use fetch::Fetcher;
pub use generator::{Generator, IngestStats, RunSummary};
pub use hostname::{clean_domain, extract_hostname_from_url, is_valid_domain};
pub use output::{write_rules, GeneratedRules};
pub use parse::{parse_classify_rules, parse_source, ParsedSource, SourceStats};
pub use types::{Action, CategorizedDomains, ClassifyRule, PathRulePolicy, SourceFormat};
