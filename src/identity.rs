//! Commits and contributor identities.
//!
//! Every backend reduces its native commit record to a [`RawCommit`]; the
//! aggregator then derives an [`IdentityKey`] from each one. Derivation is
//! pure and total: a usable email wins, otherwise the name is used.
//!
//! Only the commit *author* is considered. Whether committers should count as
//! contributors as well is an open product question.

use serde::Serialize;
use std::fmt;

/// A backend-neutral commit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub name: String,
    /// Absent when the backend does not expose an email for the author
    pub email: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl RawCommit {
    pub fn new(name: &str, email: Option<&str>, timestamp: i64) -> Self {
        Self {
            name: name.to_string(),
            email: email.map(String::from),
            timestamp,
        }
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey::derive(&self.name, self.email.as_deref())
    }
}

/// Canonical deduplication key for a contributor.
///
/// Email keys and name keys live in separate namespaces, so a name that
/// happens to look like an email never collides with a real email.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum IdentityKey {
    Email(String),
    Name(String),
}

impl IdentityKey {
    /// Builds the key from a raw author name and email.
    ///
    /// The email is trimmed and lowercased. An email that is blank or has no
    /// `@` with text on both sides is treated as absent and the lowercased,
    /// trimmed name is used instead.
    pub fn derive(name: &str, email: Option<&str>) -> Self {
        match email.map(str::trim).filter(|e| is_usable_email(e)) {
            Some(email) => IdentityKey::Email(email.to_lowercase()),
            None => IdentityKey::Name(name.trim().to_lowercase()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IdentityKey::Email(value) | IdentityKey::Name(value) => value,
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_usable_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

/// Splits a `Name <email>` author string.
///
/// Strings without angle brackets are taken as a bare name.
pub fn split_raw_author(raw: &str) -> (String, Option<String>) {
    match (raw.find('<'), raw.rfind('>')) {
        (Some(start), Some(end)) if start < end => {
            let name = raw[..start].trim().to_string();
            let email = raw[start + 1..end].trim();
            let email = (!email.is_empty()).then(|| email.to_string());
            (name, email)
        }
        _ => (raw.trim().to_string(), None),
    }
}
