//! CSV source parsing: one URL-bearing column per file.
//!
//! Hand-rolled splitting on the configured delimiter — the consumed
//! blocklist CSVs are plain single-table files without quoted fields.

use log::warn;

use super::SourceStats;
use crate::config::CsvConfig;
use crate::error::{Result, RulegenError};
use crate::hostname::extract_hostname_from_url;

/// Parse CSV text and extract hostnames from the configured column
pub(crate) fn parse(
    text: &str,
    config: &CsvConfig,
    stats: &mut SourceStats,
) -> Result<Vec<String>> {
    let mut domains = Vec::new();
    let mut column_index = config.column_index;
    let mut saw_header = false;

    for (line_num, line) in text.lines().enumerate() {
        let line_num = line_num + 1; // 1-based line numbers
        if line.trim().is_empty() {
            continue;
        }
        stats.total_lines += 1;

        let cells: Vec<&str> = line.split(config.delimiter).map(str::trim).collect();

        // Resolve a named column against the header row
        if config.has_header && !saw_header {
            saw_header = true;
            if let Some(ref name) = config.column {
                column_index = cells.iter().position(|c| c == name);
                if column_index.is_none() {
                    return Err(RulegenError::ParseErrorAtLine {
                        line: line_num,
                        message: format!(
                            "column '{}' not found in header: {}",
                            name,
                            cells.join(", ")
                        ),
                    });
                }
            }
            continue;
        }

        let index = match column_index {
            Some(i) => i,
            None => {
                return Err(RulegenError::ConfigError(
                    "csv config needs a column name or column_index".to_string(),
                ))
            }
        };

        stats.csv_rows += 1;

        let value = match cells.get(index) {
            Some(v) if !v.is_empty() => *v,
            _ => {
                stats.invalid_domains += 1;
                continue;
            }
        };

        match extract_hostname_from_url(value) {
            Some(domain) => {
                domains.push(domain);
                stats.parsed_domains += 1;
            }
            None => {
                stats.csv_invalid_urls += 1;
                if stats.csv_invalid_urls <= 3 {
                    warn!("line {}: cannot extract a hostname from '{}'", line_num, value);
                }
            }
        }
    }

    Ok(domains)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_named(column: &str) -> CsvConfig {
        CsvConfig {
            column: Some(column.to_string()),
            ..CsvConfig::default()
        }
    }

    #[test]
    fn test_named_column() {
        let text = "\
Name,Address,Feed
My Blog,https://blog.example.com/,rss
Other,https://other.example.org/page,atom
";
        let mut stats = SourceStats::default();
        let domains = parse(text, &config_named("Address"), &mut stats).unwrap();
        assert_eq!(domains, vec!["blog.example.com", "other.example.org"]);
        assert_eq!(stats.csv_rows, 2);
        assert_eq!(stats.parsed_domains, 2);
    }

    #[test]
    fn test_missing_named_column() {
        let text = "Name,URL\nBlog,https://blog.example.com/\n";
        let mut stats = SourceStats::default();
        let result = parse(text, &config_named("Address"), &mut stats);
        assert!(result.is_err());
    }

    #[test]
    fn test_column_index_without_header() {
        let config = CsvConfig {
            column: None,
            column_index: Some(1),
            has_header: false,
            delimiter: ',',
        };
        let text = "blog,example.com/page\nsite,https://www.site.org/\n";
        let mut stats = SourceStats::default();
        let domains = parse(text, &config, &mut stats).unwrap();
        assert_eq!(domains, vec!["example.com", "www.site.org"]);
    }

    #[test]
    fn test_invalid_urls_counted() {
        let text = "Address\nnot a url at all\nhttps://good.example.com/\n";
        let mut stats = SourceStats::default();
        let domains = parse(text, &config_named("Address"), &mut stats).unwrap();
        assert_eq!(domains, vec!["good.example.com"]);
        assert_eq!(stats.csv_invalid_urls, 1);
    }

    #[test]
    fn test_custom_delimiter() {
        let config = CsvConfig {
            column: None,
            column_index: Some(0),
            has_header: false,
            delimiter: ';',
        };
        let text = "https://a.example.com/;tag\n";
        let mut stats = SourceStats::default();
        let domains = parse(text, &config, &mut stats).unwrap();
        assert_eq!(domains, vec!["a.example.com"]);
    }

    #[test]
    fn test_no_column_selection_is_error() {
        let config = CsvConfig {
            column: None,
            column_index: None,
            has_header: false,
            delimiter: ',',
        };
        let mut stats = SourceStats::default();
        assert!(parse("a,b\n", &config, &mut stats).is_err());
    }
}
