//! `action:domain` auto-classify rule parsing.

use log::warn;

use crate::types::{Action, ClassifyRule};

/// Parse auto-classify rule text: one `action:domain` or
/// `replace:old=new` rule per line, `#` comments.
pub fn parse_classify_rules(text: &str) -> Vec<ClassifyRule> {
    text.lines().filter_map(parse_classify_line).collect()
}

fn parse_classify_line(line: &str) -> Option<ClassifyRule> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (action_str, content) = line.split_once(':')?;
    let action_str = action_str.trim();
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    if action_str == "replace" {
        return match content.split_once('=') {
            Some((old, new)) if !old.trim().is_empty() && !new.trim().is_empty() => {
                Some(ClassifyRule::Replace {
                    old: old.trim().to_string(),
                    new: new.trim().to_string(),
                })
            }
            _ => {
                warn!("invalid replace rule '{}' (expected replace:old=new)", line);
                None
            }
        };
    }

    match action_str.parse::<Action>() {
        Ok(Action::Replace) => None, // unreachable: handled above
        Ok(action) => Some(ClassifyRule::Assign {
            action,
            pattern: content.to_lowercase(),
        }),
        Err(_) => {
            warn!("unknown action in classify rule '{}'", line);
            None
        }
    }
}
