use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("activation code cannot be empty")]
    EmptyCode,

    #[error("activation code is not valid")]
    InvalidCode,
}

//
// ─── ACTIVATION CODE ───────────────────────────────────────────────────────────
//

/// A trimmed, non-empty activation code.
///
/// Also used as the suffix that scopes persisted quiz state per user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActivationCode(String);

impl ActivationCode {
    /// Parses user input into a code.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::EmptyCode` if the input is blank.
    pub fn parse(input: &str) -> Result<Self, AccessError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AccessError::EmptyCode);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ActivationCode {
    type Error = AccessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ActivationCode::parse(&value)
    }
}

impl From<ActivationCode> for String {
    fn from(value: ActivationCode) -> Self {
        value.0
    }
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// Static allow-list gating session entry.
///
/// This is an access convenience, not a security boundary: the list ships with
/// the client. An empty list means the gate is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed: BTreeSet<String>,
}

impl AccessPolicy {
    /// A policy that lets everyone in without a code.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    /// A policy accepting exactly the given codes (blank entries are ignored).
    #[must_use]
    pub fn allow_list<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_owned())
            .filter(|c| !c.is_empty())
            .collect();
        Self { allowed }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }

    #[must_use]
    pub fn permits(&self, code: &ActivationCode) -> bool {
        self.is_open() || self.allowed.contains(code.as_str())
    }

    /// Parses `input` and checks it against the allow-list.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::EmptyCode` for blank input and
    /// `AccessError::InvalidCode` for codes not on the list.
    pub fn verify(&self, input: &str) -> Result<ActivationCode, AccessError> {
        let code = ActivationCode::parse(input)?;
        if self.permits(&code) {
            Ok(code)
        } else {
            Err(AccessError::InvalidCode)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_listed_codes_only() {
        let policy = AccessPolicy::allow_list(["VIP2024", " TEAM-7 ", ""]);

        assert_eq!(policy.verify(" VIP2024 ").unwrap().as_str(), "VIP2024");
        assert!(policy.verify("TEAM-7").is_ok());
        assert_eq!(policy.verify("nope").unwrap_err(), AccessError::InvalidCode);
        assert_eq!(policy.verify("  ").unwrap_err(), AccessError::EmptyCode);
    }

    #[test]
    fn open_policy_permits_any_code() {
        let policy = AccessPolicy::open();
        assert!(policy.is_open());
        assert!(policy.verify("anything").is_ok());
    }
}
