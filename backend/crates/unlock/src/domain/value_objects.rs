//! Domain Value Objects
//!
//! Immutable value types for the unlock domain. The raw `unlock_requirement`
//! string stored with a resource only has meaning together with its method;
//! [`UnlockRequirement::parse`] is the single place that meaning is decided.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{UnlockError, UnlockResult};
use kernel::id::CreatorId;

/// Verification strategy gating a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnlockMethod {
    /// Visitor types a secret code (case-insensitive)
    ManualCode,
    /// Visitor opens an external link
    TaskVerification,
    /// Visitor waits out a countdown
    TimeDelay,
}

impl UnlockMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UnlockMethod::ManualCode => "MANUAL_CODE",
            UnlockMethod::TaskVerification => "TASK_VERIFICATION",
            UnlockMethod::TimeDelay => "TIME_DELAY",
        }
    }
}

impl fmt::Display for UnlockMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnlockMethod {
    type Err = UnlockError;

    fn from_str(s: &str) -> UnlockResult<Self> {
        match s {
            "MANUAL_CODE" => Ok(UnlockMethod::ManualCode),
            "TASK_VERIFICATION" => Ok(UnlockMethod::TaskVerification),
            "TIME_DELAY" => Ok(UnlockMethod::TimeDelay),
            other => Err(UnlockError::DataIntegrity(format!(
                "unknown unlock method '{}'",
                other
            ))),
        }
    }
}

/// Kind of file behind a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Pdf,
    Zip,
    Image,
    Doc,
    Link,
}

impl FileType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "PDF",
            FileType::Zip => "ZIP",
            FileType::Image => "IMAGE",
            FileType::Doc => "DOC",
            FileType::Link => "LINK",
        }
    }
}

impl FromStr for FileType {
    type Err = UnlockError;

    fn from_str(s: &str) -> UnlockResult<Self> {
        match s {
            "PDF" => Ok(FileType::Pdf),
            "ZIP" => Ok(FileType::Zip),
            "IMAGE" => Ok(FileType::Image),
            "DOC" => Ok(FileType::Doc),
            "LINK" => Ok(FileType::Link),
            other => Err(UnlockError::DataIntegrity(format!(
                "unknown file type '{}'",
                other
            ))),
        }
    }
}

/// Canonical form of a code: surrounding whitespace removed, uppercased
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalized secret code for `MANUAL_CODE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCode(String);

impl AccessCode {
    pub fn new(raw: &str) -> UnlockResult<Self> {
        let code = normalize_code(raw);
        if code.is_empty() {
            return Err(UnlockError::DataIntegrity("access code is empty".into()));
        }
        Ok(Self(code))
    }

    /// Compare visitor input against the code, in constant time
    pub fn matches(&self, input: &str) -> bool {
        platform::crypto::constant_time_eq(normalize_code(input).as_bytes(), self.0.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// External page a `TASK_VERIFICATION` visitor must open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUrl(String);

impl TaskUrl {
    pub fn new(raw: &str) -> UnlockResult<Self> {
        let url = raw.trim();
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(|| {
                UnlockError::DataIntegrity(format!("task link '{}' is not an http(s) URL", url))
            })?;
        if rest.is_empty() || rest.starts_with('/') || url.chars().any(char::is_whitespace) {
            return Err(UnlockError::DataIntegrity(format!(
                "task link '{}' has no host",
                url
            )));
        }
        Ok(Self(url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Countdown length for `TIME_DELAY`, always at least one second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelaySeconds(u32);

impl DelaySeconds {
    pub fn new(raw: &str) -> UnlockResult<Self> {
        let seconds: u32 = raw.trim().parse().map_err(|_| {
            UnlockError::DataIntegrity(format!("delay '{}' is not a whole number of seconds", raw))
        })?;
        if seconds == 0 {
            return Err(UnlockError::DataIntegrity("delay must be at least one second".into()));
        }
        Ok(Self(seconds))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Method-specific unlock parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockRequirement {
    Code(AccessCode),
    Task(TaskUrl),
    Delay(DelaySeconds),
}

impl UnlockRequirement {
    /// Interpret a raw requirement string for the given method
    ///
    /// Fails with `DataIntegrity` when the string does not fit the method.
    pub fn parse(method: UnlockMethod, raw: &str) -> UnlockResult<Self> {
        match method {
            UnlockMethod::ManualCode => AccessCode::new(raw).map(UnlockRequirement::Code),
            UnlockMethod::TaskVerification => TaskUrl::new(raw).map(UnlockRequirement::Task),
            UnlockMethod::TimeDelay => DelaySeconds::new(raw).map(UnlockRequirement::Delay),
        }
    }

    pub fn method(&self) -> UnlockMethod {
        match self {
            UnlockRequirement::Code(_) => UnlockMethod::ManualCode,
            UnlockRequirement::Task(_) => UnlockMethod::TaskVerification,
            UnlockRequirement::Delay(_) => UnlockMethod::TimeDelay,
        }
    }

    /// Canonical string for storage
    pub fn to_raw(&self) -> String {
        match self {
            UnlockRequirement::Code(code) => code.as_str().to_string(),
            UnlockRequirement::Task(url) => url.as_str().to_string(),
            UnlockRequirement::Delay(delay) => delay.get().to_string(),
        }
    }
}

/// Where a resource's file (or preview) lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReference {
    /// Object path inside the private bucket; needs a signed URL
    Internal(String),
    /// Fully-qualified URL, served as-is
    External(String),
}

impl FileReference {
    pub fn parse(raw: &str) -> UnlockResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(UnlockError::DataIntegrity("file reference is empty".into()));
        }
        if has_url_scheme(raw) {
            Ok(FileReference::External(raw.to_string()))
        } else {
            Ok(FileReference::Internal(raw.trim_start_matches('/').to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileReference::Internal(path) => path,
            FileReference::External(url) => url,
        }
    }

    pub fn internal_path(&self) -> Option<&str> {
        match self {
            FileReference::Internal(path) => Some(path),
            FileReference::External(_) => None,
        }
    }

    /// Whether the reference stays inside the creator's storage folder
    ///
    /// Uploads live under `{creator_id}/...`. External URLs never touch the
    /// bucket and always pass.
    pub fn is_owned_by(&self, creator_id: CreatorId) -> bool {
        let Some(path) = self.internal_path() else {
            return true;
        };
        let mut segments = path.split('/');
        segments.next() == Some(creator_id.to_string().as_str())
            && segments.all(|s| !s.is_empty() && s != "." && s != "..")
    }
}

/// `scheme://...` with an RFC 3986 scheme
fn has_url_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_string_roundtrip() {
        for method in [
            UnlockMethod::ManualCode,
            UnlockMethod::TaskVerification,
            UnlockMethod::TimeDelay,
        ] {
            assert_eq!(method.as_str().parse::<UnlockMethod>().unwrap(), method);
        }
        assert!(matches!(
            "SOCIAL_SHARE".parse::<UnlockMethod>(),
            Err(UnlockError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_method_serde_matches_db_strings() {
        let json = serde_json::to_string(&UnlockMethod::TaskVerification).unwrap();
        assert_eq!(json, "\"TASK_VERIFICATION\"");
        let method: UnlockMethod = serde_json::from_str("\"TIME_DELAY\"").unwrap();
        assert_eq!(method, UnlockMethod::TimeDelay);
    }

    #[test]
    fn test_access_code_normalization() {
        let code = AccessCode::new(" react2024 ").unwrap();
        assert_eq!(code.as_str(), "REACT2024");
        assert!(code.matches("REACT2024"));
        assert!(code.matches("react2024 "));
        assert!(code.matches("\tReAcT2024\n"));
        assert!(!code.matches("REACT2025"));
        assert!(!code.matches("REACT 2024"));
        assert!(AccessCode::new("   ").is_err());
    }

    #[test]
    fn test_task_url() {
        assert!(TaskUrl::new("https://youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
        assert!(TaskUrl::new("http://example.com").is_ok());
        assert!(TaskUrl::new("youtube.com/watch").is_err());
        assert!(TaskUrl::new("javascript:alert(1)").is_err());
        assert!(TaskUrl::new("https://").is_err());
        assert!(TaskUrl::new("https://exa mple.com").is_err());
    }

    #[test]
    fn test_delay_seconds() {
        assert_eq!(DelaySeconds::new("30").unwrap().get(), 30);
        assert_eq!(DelaySeconds::new(" 5 ").unwrap().get(), 5);
        assert!(DelaySeconds::new("abc").is_err());
        assert!(DelaySeconds::new("0").is_err());
        assert!(DelaySeconds::new("-3").is_err());
        assert!(DelaySeconds::new("2.5").is_err());
        assert!(DelaySeconds::new("99999999999").is_err());
    }

    #[test]
    fn test_file_reference_ownership() {
        let creator: CreatorId = "00000000-0000-0000-0000-0000000000c1".parse().unwrap();
        let own = |raw: &str| FileReference::parse(raw).unwrap().is_owned_by(creator);

        assert!(own("00000000-0000-0000-0000-0000000000c1/resources/r1/file.pdf"));
        assert!(own("/00000000-0000-0000-0000-0000000000c1/previews/p.jpg"));
        assert!(own("https://drive.example.com/file.pdf"));

        assert!(!own("00000000-0000-0000-0000-0000000000c2/resources/r1/secret.pdf"));
        assert!(!own("00000000-0000-0000-0000-0000000000c1"));
        assert!(!own("00000000-0000-0000-0000-0000000000c1/../c2/secret.pdf"));
        assert!(!own("00000000-0000-0000-0000-0000000000c1//secret.pdf"));
        assert!(!own("resources/secret.pdf"));
    }

    #[test]
    fn test_requirement_interpretation_follows_method() {
        let req = UnlockRequirement::parse(UnlockMethod::TimeDelay, "30").unwrap();
        assert_eq!(req.method(), UnlockMethod::TimeDelay);
        assert_eq!(req.to_raw(), "30");

        // "30" is a valid code too, but only because the method says so
        let req = UnlockRequirement::parse(UnlockMethod::ManualCode, "30").unwrap();
        assert_eq!(req.method(), UnlockMethod::ManualCode);

        assert!(UnlockRequirement::parse(UnlockMethod::TimeDelay, "REACT2024").is_err());
        assert!(UnlockRequirement::parse(UnlockMethod::TaskVerification, "30").is_err());
    }

    #[test]
    fn test_file_reference_classification() {
        assert_eq!(
            FileReference::parse("c1/resources/r1/file.pdf").unwrap(),
            FileReference::Internal("c1/resources/r1/file.pdf".into())
        );
        assert_eq!(
            FileReference::parse("https://example.com/files/react-arch.pdf").unwrap(),
            FileReference::External("https://example.com/files/react-arch.pdf".into())
        );
        assert_eq!(
            FileReference::parse("s3+https://bucket/key").unwrap(),
            FileReference::External("s3+https://bucket/key".into())
        );
        assert_eq!(
            FileReference::parse("/leading/slash.zip").unwrap(),
            FileReference::Internal("leading/slash.zip".into())
        );
        assert!(matches!(
            FileReference::parse("1abc://x").unwrap(),
            FileReference::Internal(_)
        ));
        assert!(FileReference::parse("  ").is_err());
    }
}
