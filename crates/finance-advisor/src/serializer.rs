//! Profile Serializer
//!
//! Canonical text form of a [`FinancialProfile`]: four-space indented JSON
//! with a fixed key order. The same profile always yields byte-identical
//! text, so it can be cached once per analysis and reused by every
//! follow-up prompt in the session.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::{AdvisorError, Result};
use crate::model::FinancialProfile;

/// Serialized profile text, ready for prompt substitution
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileText(String);

impl ProfileText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ProfileText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render a profile as canonical text
///
/// Raw inputs only: no totals, ratios or other derived values are added.
/// Profiles that fail validation are rejected, since an amount the JSON
/// number cannot carry exactly would otherwise reach the model altered.
pub fn serialize_profile(profile: &FinancialProfile) -> Result<ProfileText> {
    profile.validate()?;

    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    profile.serialize(&mut serializer)?;

    let json = String::from_utf8(buf).map_err(|e| AdvisorError::Serialization(e.to_string()))?;
    Ok(ProfileText(escape_delimiters(&json)))
}

/// `<`, `>` and backticks can only occur inside JSON string values here, so
/// rewriting them as unicode escapes keeps the document equivalent while free
/// text can no longer close the tags or fences that frame it in a prompt.
fn escape_delimiters(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '`' => out.push_str("\\u0060"),
            other => out.push(other),
        }
    }
    out
}
