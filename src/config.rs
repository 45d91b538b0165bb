//! Generator configuration.
//!
//! The whole tree is serde-derived and loads from YAML or JSON (picked
//! by file extension). Every field has a default mirroring the stock
//! rule-set, so an empty config file is a valid config.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compiler::CompilerConfig;
use crate::error::{Result, RulegenError};
use crate::types::{Action, PathRulePolicy, SourceFormat};

fn default_true() -> bool {
    true
}

fn default_action() -> Action {
    Action::Remove
}

fn default_format() -> SourceFormat {
    SourceFormat::Domain
}

/// One blocklist source, remote (`url`) or local (`file`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_action")]
    pub action: Action,
    #[serde(default = "default_format")]
    pub format: SourceFormat,
    /// Required when `format` is `csv`
    #[serde(default)]
    pub csv: Option<CsvConfig>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl SourceConfig {
    /// Remote source pointing at a URL
    pub fn remote(name: &str, url: &str, action: Action, format: SourceFormat) -> Self {
        Self {
            name: name.to_string(),
            url: Some(url.to_string()),
            file: None,
            action,
            format,
            csv: None,
            enabled: true,
        }
    }
}

fn default_delimiter() -> char {
    ','
}

/// Column selection for CSV sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Column name, resolved against the header row
    #[serde(default)]
    pub column: Option<String>,
    /// Zero-based column index, used when no name is given
    #[serde(default)]
    pub column_index: Option<usize>,
    #[serde(default = "default_true")]
    pub has_header: bool,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            column: None,
            column_index: None,
            has_header: true,
            delimiter: ',',
        }
    }
}

/// Line parsing behavior shared by all source formats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Drop uBlock rules that target a specific path outright
    pub ignore_specific_paths: bool,
    /// What to do with path rules that are not dropped
    pub specific_path_action: PathRulePolicy,
    /// Reject IPv4 literals
    pub ignore_ip: bool,
    /// Reject localhost and friends
    pub ignore_localhost: bool,
    /// Keep `www.` prefixes instead of stripping them
    pub preserve_www_prefix: bool,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            ignore_specific_paths: false,
            specific_path_action: PathRulePolicy::Smart,
            ignore_ip: true,
            ignore_localhost: true,
            preserve_www_prefix: true,
        }
    }
}

/// Auto-classify rule sources and inline rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoClassifyConfig {
    pub enabled: bool,
    pub sources: Vec<ClassifySourceConfig>,
    /// Inline `action:domain` rules applied after all sources
    pub rules: Vec<String>,
}

impl Default for AutoClassifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sources: Vec::new(),
            rules: Vec::new(),
        }
    }
}

/// One auto-classify rule source, remote or local
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifySourceConfig {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    1
}

/// HTTP request behavior for remote sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

/// Output layout mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// One YAML file per category plus a referencing main config
    SeparateFiles,
    /// A single `hostnames.yml` with every category nested
    SingleFile,
}

/// Per-category output file names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFiles {
    pub replace: String,
    pub remove: String,
    pub low_priority: String,
    pub high_priority: String,
    pub main_config: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            replace: "rewrite-hosts.yml".to_string(),
            remove: "remove-hosts.yml".to_string(),
            low_priority: "low-priority-hosts.yml".to_string(),
            high_priority: "high-priority-hosts.yml".to_string(),
            main_config: "hostnames-config.yml".to_string(),
        }
    }
}

/// Where and how rules are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    pub directory: PathBuf,
    pub files: OutputFiles,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::SeparateFiles,
            directory: PathBuf::from("./rules"),
            files: OutputFiles::default(),
        }
    }
}

/// Top-level generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub sources: Vec<SourceConfig>,
    pub auto_classify: AutoClassifyConfig,
    /// Pre-anchored `old-regex -> new domain` rewrite rules
    pub replace_rules: BTreeMap<String, String>,
    /// Rules appended verbatim to the remove category
    pub fixed_remove: Vec<String>,
    pub fixed_low_priority: Vec<String>,
    pub fixed_high_priority: Vec<String>,
    pub parsing: ParsingConfig,
    pub optimization: CompilerConfig,
    pub request: RequestConfig,
    pub output: OutputConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            auto_classify: AutoClassifyConfig::default(),
            replace_rules: BTreeMap::new(),
            fixed_remove: Vec::new(),
            fixed_low_priority: Vec::new(),
            fixed_high_priority: Vec::new(),
            parsing: ParsingConfig::default(),
            optimization: CompilerConfig::default(),
            request: RequestConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Stock blocklist sources used when the config does not name any
fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::remote(
            "Content Farm Terminator - Content Farm Filters",
            "https://danny0838.github.io/content-farm-terminator/files/blocklist-ublacklist/content-farms.txt",
            Action::Remove,
            SourceFormat::Ublock,
        ),
        SourceConfig::remote(
            "Content Farm Terminator - Nearly Content Farm Filters",
            "https://danny0838.github.io/content-farm-terminator/files/blocklist-ublacklist/nearly-content-farms.txt",
            Action::Remove,
            SourceFormat::Ublock,
        ),
        SourceConfig::remote(
            "Content Farm Terminator - Bad Cloners",
            "https://danny0838.github.io/content-farm-terminator/files/blocklist-ublacklist/bad-cloners.txt",
            Action::Remove,
            SourceFormat::Ublock,
        ),
        SourceConfig::remote(
            "Paxxs - Google Blocklist",
            "https://raw.githubusercontent.com/Paxxs/Google-Blocklist/refs/heads/develop/uBlacklist_subscription.txt",
            Action::Remove,
            SourceFormat::Ublock,
        ),
        SourceConfig::remote(
            "cobaltdisco - Google Chinese Results Blocklist",
            "https://raw.githubusercontent.com/cobaltdisco/Google-Chinese-Results-Blocklist/refs/heads/master/uBlacklist_subscription.txt",
            Action::Remove,
            SourceFormat::Ublock,
        ),
        SourceConfig::remote(
            "obgnail - Chinese Internet is Dead",
            "https://raw.githubusercontent.com/obgnail/chinese-internet-is-dead/master/blocklist.txt",
            Action::Remove,
            SourceFormat::Ublock,
        ),
        SourceConfig {
            csv: Some(CsvConfig {
                column: Some("Address".to_string()),
                ..CsvConfig::default()
            }),
            ..SourceConfig::remote(
                "timqian - Chinese Independent Blogs",
                "https://raw.githubusercontent.com/timqian/chinese-independent-blogs/refs/heads/master/blogs-original.csv",
                Action::HighPriority,
                SourceFormat::Csv,
            )
        },
        SourceConfig::remote(
            "bcaso - Computer Science Whitelist",
            "https://raw.githubusercontent.com/bcaso/Computer-Science-Whitelist/refs/heads/main/whitelists/domain_name.txt",
            Action::HighPriority,
            SourceFormat::Ublock,
        ),
    ]
}

impl GeneratorConfig {
    /// Load a config from a YAML or JSON file, picked by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            RulegenError::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("json") => Ok(serde_json::from_str(&text)?),
            _ => Ok(serde_yaml::from_str(&text)?),
        }
    }

    /// Load from an optional path, falling back to the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
