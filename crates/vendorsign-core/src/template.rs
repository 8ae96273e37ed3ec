//! `{{PLACEHOLDER}}` substitution for the legal agreement templates.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z0-9_]+)\}\}").expect("valid placeholder regex"));

pub const EFFECTIVE_DATE: &str = "EFFECTIVE_DATE";
pub const VENDOR_NAME: &str = "VENDOR_NAME";
pub const VENDOR_ADDRESS: &str = "VENDOR_ADDRESS";
pub const VENDOR_REGISTRATION: &str = "VENDOR_REGISTRATION";
pub const COMMISSION_RATE: &str = "COMMISSION_RATE";
pub const PARTNERSHIP_LEVEL: &str = "PARTNERSHIP_LEVEL";

/// Every placeholder a template may reference.
pub const KNOWN_PLACEHOLDERS: [&str; 6] = [
    EFFECTIVE_DATE,
    VENDOR_NAME,
    VENDOR_ADDRESS,
    VENDOR_REGISTRATION,
    COMMISSION_RATE,
    PARTNERSHIP_LEVEL,
];

/// Rendered in place of a placeholder that has no (or a blank) value.
pub const MISSING_VALUE: &str = "N/A";

/// Replaces every `{{NAME}}` token in `template` with `values[NAME]`.
///
/// Missing or blank values render as [`MISSING_VALUE`], so the output never
/// contains a raw token for a well-formed placeholder.
#[must_use]
pub fn substitute(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            values
                .get(&caps[1])
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or(MISSING_VALUE)
                .to_string()
        })
        .into_owned()
}

/// Names of the placeholders used in `template`, sorted and de-duplicated.
#[must_use]
pub fn placeholders_in(template: &str) -> BTreeSet<String> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// True when `text` still contains a `{{NAME}}` token.
#[must_use]
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER_RE.is_match(text)
}
