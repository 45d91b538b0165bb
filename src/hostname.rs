//! Hostname validation and cleanup.
//!
//! Every domain that enters a category set goes through [`clean_domain`];
//! the compiler assumes its input is already valid and lowercase.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::config::ParsingConfig;

/// Maximum total hostname length
const MAX_DOMAIN_LEN: usize = 255;

/// Maximum length of a single label
const MAX_LABEL_LEN: usize = 63;

/// Dotted-quad IPv4 literal
static IP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$")
        .expect("IP_PATTERN: hardcoded regex is invalid")
});

/// A single hostname label: alphanumeric with interior hyphens
static LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?$")
        .expect("LABEL_PATTERN: hardcoded regex is invalid")
});

/// Hostnames that never belong in a blocklist
const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0"];

/// Check whether a string is an IPv4 literal
pub fn is_ip_address(s: &str) -> bool {
    IP_PATTERN.is_match(s)
}

/// Validate a hostname: at least two labels, each label alphanumeric
/// with interior hyphens and at most 63 chars, total at most 255 chars,
/// final label at least 2 chars.
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > MAX_DOMAIN_LEN {
        return false;
    }
    if !domain.contains('.') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.iter().any(|l| l.is_empty()) {
        return false;
    }

    for label in &labels {
        if label.len() > MAX_LABEL_LEN || !LABEL_PATTERN.is_match(label) {
            return false;
        }
    }

    // Final label doubles as the grouping TLD and must be at least 2 chars
    labels.last().map(|l| l.len() >= 2).unwrap_or(false)
}

/// Clean a raw domain string into a validated lowercase hostname.
///
/// Keeps the original label structure (`www.` prefixes survive); strips
/// scheme, port and path; rejects IP literals and local hosts according
/// to the parsing config. Returns `None` when nothing valid remains.
pub fn clean_domain(raw: &str, parsing: &ParsingConfig) -> Option<String> {
    let mut domain = raw.trim().to_string();
    if domain.is_empty() {
        return None;
    }

    // Strip scheme via full URL parsing
    if domain.starts_with("http://") || domain.starts_with("https://") {
        let parsed = Url::parse(&domain).ok()?;
        domain = parsed.host_str()?.to_string();
    }

    // Strip an explicit port
    if let Some((host, port)) = domain.split_once(':') {
        if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
            domain = host.to_string();
        }
    }

    // Strip any trailing path
    if let Some((host, _)) = domain.split_once('/') {
        domain = host.to_string();
    }

    if !parsing.preserve_www_prefix {
        if let Some(stripped) = domain.strip_prefix("www.") {
            domain = stripped.to_string();
        }
    }

    let domain = domain.trim();

    if parsing.ignore_ip && is_ip_address(domain) {
        return None;
    }
    if parsing.ignore_localhost && LOCAL_HOSTS.contains(&domain) {
        return None;
    }

    if is_valid_domain(domain) {
        Some(domain.to_lowercase())
    } else {
        None
    }
}

/// Extract a validated hostname from a URL string.
///
/// Schemeless values that look like hostnames get an `http://` prefix
/// before parsing. Returns `None` for anything that does not yield a
/// valid hostname.
pub fn extract_hostname_from_url(url_str: &str) -> Option<String> {
    let url_str = url_str.trim();
    if url_str.is_empty() {
        return None;
    }

    let candidate;
    let url_str = if url_str.starts_with("http://")
        || url_str.starts_with("https://")
        || url_str.starts_with("ftp://")
    {
        url_str
    } else if url_str.contains('.') && !url_str.starts_with('/') {
        candidate = format!("http://{}", url_str);
        &candidate
    } else {
        return None;
    };

    let parsed = Url::parse(url_str).ok()?;
    let hostname = parsed.host_str()?;

    if is_valid_domain(hostname) {
        Some(hostname.to_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_domains() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("www.example.com"));
        assert!(is_valid_domain("a-b.example.co.uk"));
        assert!(is_valid_domain("xn--fiqs8s.cn"));
    }

    #[test]
    fn test_invalid_domains() {
        assert!(!is_valid_domain(""));
        assert!(!is_valid_domain("localhost"));
        assert!(!is_valid_domain("example."));
        assert!(!is_valid_domain(".example.com"));
        assert!(!is_valid_domain("exa mple.com"));
        assert!(!is_valid_domain("-bad.example.com"));
        assert!(!is_valid_domain("bad-.example.com"));
        // Final label shorter than 2 chars
        assert!(!is_valid_domain("example.c"));
    }

    #[test]
    fn test_label_length_limit() {
        let long_label = "a".repeat(64);
        assert!(!is_valid_domain(&format!("{}.com", long_label)));
        let ok_label = "a".repeat(63);
        assert!(is_valid_domain(&format!("{}.com", ok_label)));
    }

    #[test]
    fn test_total_length_limit() {
        let label = "a".repeat(60);
        let long = format!("{0}.{0}.{0}.{0}.{0}.com", label);
        assert!(long.len() > 255);
        assert!(!is_valid_domain(&long));
    }

    #[test]
    fn test_is_ip_address() {
        assert!(is_ip_address("192.168.1.1"));
        assert!(is_ip_address("255.255.255.255"));
        assert!(!is_ip_address("256.1.1.1"));
        assert!(!is_ip_address("example.com"));
    }

    #[test]
    fn test_clean_domain_strips_scheme_port_path() {
        let parsing = ParsingConfig::default();
        assert_eq!(
            clean_domain("https://Example.COM/some/path", &parsing),
            Some("example.com".to_string())
        );
        assert_eq!(
            clean_domain("example.com:8080", &parsing),
            Some("example.com".to_string())
        );
        assert_eq!(
            clean_domain("example.com/path", &parsing),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_clean_domain_preserves_www() {
        let parsing = ParsingConfig::default();
        assert_eq!(
            clean_domain("www.example.com", &parsing),
            Some("www.example.com".to_string())
        );
    }

    #[test]
    fn test_clean_domain_strips_www_when_configured() {
        let parsing = ParsingConfig {
            preserve_www_prefix: false,
            ..ParsingConfig::default()
        };
        assert_eq!(
            clean_domain("www.example.com", &parsing),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_clean_domain_rejects_ip_and_localhost() {
        let parsing = ParsingConfig::default();
        assert_eq!(clean_domain("192.168.1.1", &parsing), None);
        assert_eq!(clean_domain("localhost", &parsing), None);
        assert_eq!(clean_domain("0.0.0.0", &parsing), None);
    }

    #[test]
    fn test_clean_domain_allows_ip_when_configured() {
        let parsing = ParsingConfig {
            ignore_ip: false,
            ..ParsingConfig::default()
        };
        // IPs pass the filter but still fail hostname validation
        // (numeric final label), so the result stays None.
        assert_eq!(clean_domain("192.168.1.1", &parsing), None);
    }

    #[test]
    fn test_extract_hostname_from_url() {
        assert_eq!(
            extract_hostname_from_url("https://blog.example.com/post/1"),
            Some("blog.example.com".to_string())
        );
        assert_eq!(
            extract_hostname_from_url("example.com/page"),
            Some("example.com".to_string())
        );
        assert_eq!(
            extract_hostname_from_url("example.com:8443/page"),
            Some("example.com".to_string())
        );
        assert_eq!(extract_hostname_from_url("/relative/path"), None);
        assert_eq!(extract_hostname_from_url("no-dots"), None);
        assert_eq!(extract_hostname_from_url(""), None);
    }
}
