//! Merge fields left in generated documents for the send pipeline.
//!
//! The generator emits these tokens verbatim and never resolves them. The
//! send pipeline substitutes them per recipient at dispatch time.

use serde::{Deserialize, Serialize};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("Invalid merge-field regex pattern")
});

/// Tokens every send pipeline must resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeField {
    CompanyName,
    CompanyAddress,
    UnsubscribeLink,
    BookingLink,
    ReviewLink,
    WebsiteLink,
}

impl MergeField {
    pub const ALL: [MergeField; 6] = [
        MergeField::CompanyName,
        MergeField::CompanyAddress,
        MergeField::UnsubscribeLink,
        MergeField::BookingLink,
        MergeField::ReviewLink,
        MergeField::WebsiteLink,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MergeField::CompanyName => "company_name",
            MergeField::CompanyAddress => "company_address",
            MergeField::UnsubscribeLink => "unsubscribe_link",
            MergeField::BookingLink => "booking_link",
            MergeField::ReviewLink => "review_link",
            MergeField::WebsiteLink => "website_link",
        }
    }

    /// The literal placeholder, e.g. `{{company_name}}`.
    pub fn token(self) -> &'static str {
        match self {
            MergeField::CompanyName => "{{company_name}}",
            MergeField::CompanyAddress => "{{company_address}}",
            MergeField::UnsubscribeLink => "{{unsubscribe_link}}",
            MergeField::BookingLink => "{{booking_link}}",
            MergeField::ReviewLink => "{{review_link}}",
            MergeField::WebsiteLink => "{{website_link}}",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for MergeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Names of every `{{token}}` in `html`, unique, in order of first appearance.
pub fn find_tokens(html: &str) -> Vec<String> {
    let mut seen: Vec<String> = vec![];
    for caps in TOKEN_PATTERN.captures_iter(html) {
        let name = &caps[1];
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Known merge fields still present in `html`.
///
/// Anything returned here must be resolved by the send pipeline before
/// dispatch.
pub fn unresolved_fields(html: &str) -> Vec<MergeField> {
    find_tokens(html)
        .iter()
        .filter_map(|name| MergeField::from_name(name))
        .collect()
}

/// Tokens in `html` the send pipeline contract does not cover.
pub fn unknown_tokens(html: &str) -> Vec<String> {
    find_tokens(html)
        .into_iter()
        .filter(|name| MergeField::from_name(name).is_none())
        .collect()
}
