//! v2ray-style domain rule parsing (`domain:` / `full:` prefixes).

use crate::config::ParsingConfig;
use crate::hostname::clean_domain;

/// Outcome of parsing one v2ray line
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum V2rayLine {
    Comment,
    Invalid,
    Domain { domain: String, tagged: bool },
}

/// Parse a single v2ray rule line.
///
/// Supported shapes:
/// - `domain:example.com` — domain and all subdomains
/// - `full:www.example.com` — exact host, `www.` kept
/// - `domain:example.com:@ads` — tagged rule, tag recorded in stats
pub(crate) fn parse_line(line: &str, parsing: &ParsingConfig) -> V2rayLine {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return V2rayLine::Comment;
    }

    // Inline comments
    let rule = match line.find('#') {
        Some(pos) => line[..pos].trim(),
        None => line,
    };
    if rule.is_empty() {
        return V2rayLine::Comment;
    }

    let mut parts = rule.split(':');
    let prefix = match parts.next() {
        Some(p) => p.trim().to_lowercase(),
        None => return V2rayLine::Invalid,
    };
    if prefix != "domain" && prefix != "full" {
        return V2rayLine::Invalid;
    }

    let domain_part = match parts.next() {
        Some(d) if !d.trim().is_empty() => d.trim(),
        _ => return V2rayLine::Invalid,
    };

    // Anything after the domain is tag material (`:@cn`, `:@ads`)
    let tagged = parts.any(|t| !t.trim().is_empty());

    match clean_domain(domain_part, parsing) {
        Some(domain) => V2rayLine::Domain { domain, tagged },
        None => V2rayLine::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsing() -> ParsingConfig {
        ParsingConfig::default()
    }

    #[test]
    fn test_domain_prefix() {
        assert_eq!(
            parse_line("domain:example.com", &parsing()),
            V2rayLine::Domain {
                domain: "example.com".to_string(),
                tagged: false,
            }
        );
    }

    #[test]
    fn test_full_prefix_keeps_www() {
        assert_eq!(
            parse_line("full:www.example.com", &parsing()),
            V2rayLine::Domain {
                domain: "www.example.com".to_string(),
                tagged: false,
            }
        );
    }

    #[test]
    fn test_tagged_rule() {
        assert_eq!(
            parse_line("domain:example.com:@ads", &parsing()),
            V2rayLine::Domain {
                domain: "example.com".to_string(),
                tagged: true,
            }
        );
    }

    #[test]
    fn test_case_insensitive_prefix() {
        assert_eq!(
            parse_line("DOMAIN:example.com", &parsing()),
            V2rayLine::Domain {
                domain: "example.com".to_string(),
                tagged: false,
            }
        );
    }

    #[test]
    fn test_comments_and_empty() {
        assert_eq!(parse_line("# comment", &parsing()), V2rayLine::Comment);
        assert_eq!(parse_line("", &parsing()), V2rayLine::Comment);
        assert_eq!(
            parse_line("domain:example.com # note", &parsing()),
            V2rayLine::Domain {
                domain: "example.com".to_string(),
                tagged: false,
            }
        );
    }

    #[test]
    fn test_invalid_lines() {
        assert_eq!(parse_line("example.com", &parsing()), V2rayLine::Invalid);
        assert_eq!(
            parse_line("keyword:example", &parsing()),
            V2rayLine::Invalid
        );
        assert_eq!(parse_line("domain:", &parsing()), V2rayLine::Invalid);
        assert_eq!(parse_line("domain:localhost", &parsing()), V2rayLine::Invalid);
    }
}
