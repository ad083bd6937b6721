//! Keyword shortcut matching.

use database::{keyword, KeywordRule};

/// Find the first rule with an alternative equal to `text`.
///
/// Comparison ignores case and surrounding whitespace. Callers pass only
/// enabled rules.
pub fn match_keyword<'a>(rules: &'a [KeywordRule], text: &str) -> Option<&'a KeywordRule> {
    let wanted = text.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    rules
        .iter()
        .find(|rule| keyword::alternatives(&rule.pattern).iter().any(|alt| *alt == wanted))
}
